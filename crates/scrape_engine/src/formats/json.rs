use std::fs;
use std::path::Path;

use scrape_core::RawDocument;
use serde_json::Value;

use super::{Format, FormatOptions};
use crate::error::HandlerError;

/// Envelope-native structured text: the document already carries all metadata.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct JsonFormat;

impl Format for JsonFormat {
    fn read_raw(&self, path: &Path, _options: &FormatOptions) -> Result<RawDocument, HandlerError> {
        let bytes = fs::read(path).map_err(HandlerError::io(path))?;
        let context = path.display().to_string();
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| HandlerError::validation(&context, e))?;
        RawDocument::from_value(value)
            .ok_or_else(|| HandlerError::validation(context, "expected a JSON object at top level"))
    }

    fn encode(
        &self,
        raw: &RawDocument,
        explicit: Option<&Value>,
        _options: &FormatOptions,
    ) -> Result<Vec<u8>, HandlerError> {
        let encoded = match explicit {
            Some(value) => serde_json::to_vec_pretty(value),
            None => serde_json::to_vec_pretty(raw),
        };
        encoded.map_err(|e| HandlerError::validation("json encoding", e))
    }
}
