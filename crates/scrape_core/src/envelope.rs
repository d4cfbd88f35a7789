use chrono::Local;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::raw::RawDocument;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Current local time as an ISO-8601 string with second precision.
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("{context}: envelope does not match the expected schema: {source}")]
    Validation {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{context}: envelope could not be serialized: {source}")]
    Serialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Provenance of a scrape run: every envelope field except the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub script: String,
    pub script_version: String,
    pub args: Vec<String>,
    pub url: String,
    pub timestamp: String,
}

/// Versioned container for one scrape run's output.
///
/// Fields serialize in declaration order and `data` is always emitted, as
/// `null` when the envelope carries metadata only. Values are immutable once
/// built; the `with_*` methods consume and return a new envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    script: String,
    script_version: String,
    args: Vec<String>,
    url: String,
    #[serde(default = "now_timestamp")]
    timestamp: String,
    data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn new<I, S>(
        script: impl Into<String>,
        script_version: impl Into<String>,
        args: I,
        url: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: script.into(),
            script_version: script_version.into(),
            args: args.into_iter().map(Into::into).collect(),
            url: url.into(),
            timestamp: now_timestamp(),
            data: None,
        }
    }

    pub fn from_provenance(provenance: Provenance, data: Option<T>) -> Self {
        Self {
            script: provenance.script,
            script_version: provenance.script_version,
            args: provenance.args,
            url: provenance.url,
            timestamp: provenance.timestamp,
            data,
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn script_version(&self) -> &str {
        &self.script_version
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn meta(&self) -> Provenance {
        Provenance {
            script: self.script.clone(),
            script_version: self.script_version.clone(),
            args: self.args.clone(),
            url: self.url.clone(),
            timestamp: self.timestamp.clone(),
        }
    }

    /// Source URL without query string or fragment, for runs spanning several pages.
    ///
    /// A root URL keeps the form it was given in: no trailing slash is added.
    pub fn base_url(url: &str) -> String {
        let head = url.split(&['?', '#'][..]).next().unwrap_or(url);
        match Url::parse(url) {
            Ok(mut parsed) => {
                parsed.set_query(None);
                parsed.set_fragment(None);
                let mut base = parsed.to_string();
                if base.ends_with('/') && !head.ends_with('/') {
                    base.pop();
                }
                base
            }
            Err(_) => head.to_string(),
        }
    }
}

impl<T: Serialize> Envelope<T> {
    /// Two-space indented JSON in stable field order.
    pub fn to_json_pretty(&self) -> Result<String, EnvelopeError> {
        serde_json::to_string_pretty(self).map_err(|source| EnvelopeError::Serialize {
            context: self.script.clone(),
            source,
        })
    }

    pub fn to_raw(&self) -> Result<RawDocument, EnvelopeError> {
        let value = serde_json::to_value(self).map_err(|source| EnvelopeError::Serialize {
            context: self.script.clone(),
            source,
        })?;
        // A struct always serializes to an object.
        Ok(RawDocument::from_value(value).unwrap_or_default())
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Strictly validates `text`; `context` names the source in error messages.
    pub fn from_json(text: &str, context: &str) -> Result<Self, EnvelopeError> {
        serde_json::from_str(text).map_err(|source| EnvelopeError::Validation {
            context: context.to_string(),
            source,
        })
    }

    pub fn from_raw(raw: RawDocument, context: &str) -> Result<Self, EnvelopeError> {
        serde_json::from_value(raw.into_value()).map_err(|source| EnvelopeError::Validation {
            context: context.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_has_second_precision() {
        let ts = now_timestamp();
        assert_eq!(ts.len(), "2024-01-01T00:00:00".len());
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn base_url_drops_query_and_fragment() {
        assert_eq!(
            Envelope::<()>::base_url("https://github.com/topics/gdpr?page=3#top"),
            "https://github.com/topics/gdpr"
        );
        assert_eq!(Envelope::<()>::base_url("not a url?x=1"), "not a url");
    }

    #[test]
    fn base_url_leaves_root_urls_without_a_slash() {
        assert_eq!(
            Envelope::<()>::base_url("https://github.com?x=1"),
            "https://github.com"
        );
        assert_eq!(
            Envelope::<()>::base_url("https://github.com/#top"),
            "https://github.com/"
        );
    }

    #[test]
    fn builder_keeps_provenance() {
        let env: Envelope<Vec<u32>> = Envelope::new("s", "1.0", ["a", "b"], "https://x")
            .with_timestamp("2024-01-01T00:00:00")
            .with_data(vec![1]);
        let meta = env.meta();
        assert_eq!(meta.script, "s");
        assert_eq!(meta.args, vec!["a", "b"]);
        assert_eq!(meta.timestamp, "2024-01-01T00:00:00");
        assert_eq!(env.data(), Some(&vec![1]));
    }
}
