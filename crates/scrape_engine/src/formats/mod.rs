mod json;
mod passthrough;
mod tabular;

use std::path::Path;

use scrape_core::{MetaOverrides, RawDocument, DEFAULT_NAME_SEP};
use serde_json::Value;

use crate::error::HandlerError;

pub(crate) use json::JsonFormat;
pub(crate) use passthrough::PassThroughFormat;
pub(crate) use tabular::CsvFormat;

/// Settings shared by every handler variant; each format reads what it needs.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Tabular field delimiter.
    pub csv_delimiter: u8,
    /// Separator between filename segments.
    pub name_sep: String,
    /// Fallbacks for metadata a tabular filename does not carry.
    pub meta_overrides: MetaOverrides,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            csv_delimiter: b',',
            name_sep: DEFAULT_NAME_SEP.to_string(),
            meta_overrides: MetaOverrides::default(),
        }
    }
}

/// Format-specific half of a file handler.
pub(crate) trait Format: Send + Sync {
    /// Parses the file at `path` into a raw document.
    fn read_raw(&self, path: &Path, options: &FormatOptions) -> Result<RawDocument, HandlerError>;

    /// Serializes `explicit` data when given, otherwise what this format persists of `raw`.
    fn encode(
        &self,
        raw: &RawDocument,
        explicit: Option<&Value>,
        options: &FormatOptions,
    ) -> Result<Vec<u8>, HandlerError>;
}
