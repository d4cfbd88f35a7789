use std::path::Path;

use scrape_core::RawDocument;
use serde_json::Value;

use super::{Format, FormatOptions};
use crate::error::HandlerError;

/// Placeholder variant for direct-to-output presentation; neither reads nor persists.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct PassThroughFormat;

impl Format for PassThroughFormat {
    fn read_raw(&self, path: &Path, _options: &FormatOptions) -> Result<RawDocument, HandlerError> {
        Err(HandlerError::Configuration(format!(
            "the pass-through handler does not implement raw() (file {})",
            path.display()
        )))
    }

    fn encode(
        &self,
        _raw: &RawDocument,
        _explicit: Option<&Value>,
        _options: &FormatOptions,
    ) -> Result<Vec<u8>, HandlerError> {
        Err(HandlerError::Configuration(
            "the pass-through handler does not implement write()".to_string(),
        ))
    }
}
