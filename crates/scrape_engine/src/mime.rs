use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::HandlerError;
use crate::formats::{CsvFormat, Format, JsonFormat, PassThroughFormat};

/// Closed set of handler variants, keyed by their mime token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mime {
    /// Direct-to-output presentation; nothing is persisted.
    Out,
    Json,
    Csv,
}

impl Mime {
    /// Registry order; lookups stop at the first match.
    pub const ALL: [Mime; 3] = [Mime::Out, Mime::Json, Mime::Csv];

    pub fn token(self) -> &'static str {
        match self {
            Mime::Out => "out",
            Mime::Json => "json",
            Mime::Csv => "csv",
        }
    }

    pub fn from_token(token: &str) -> Option<Mime> {
        Mime::ALL.into_iter().find(|mime| mime.token() == token)
    }

    pub(crate) fn format(self) -> &'static dyn Format {
        match self {
            Mime::Out => &PassThroughFormat,
            Mime::Json => &JsonFormat,
            Mime::Csv => &CsvFormat,
        }
    }
}

impl fmt::Display for Mime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Mime {
    type Err = HandlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mime::from_token(s).ok_or_else(|| HandlerError::UnsupportedFormat {
            filename: s.to_string(),
        })
    }
}

/// Picks the handler variant for `filename` by a naive suffix check.
///
/// Any name ending in a registered token matches, with or without a dot in
/// front (`notjson` resolves to [`Mime::Json`]). Compressed files such as
/// `.json.gz` are not recognised.
pub fn guess_mime(filename: impl AsRef<Path>) -> Result<Mime, HandlerError> {
    let name = filename.as_ref().to_string_lossy();
    Mime::ALL
        .into_iter()
        .find(|mime| name.ends_with(mime.token()))
        .ok_or_else(|| HandlerError::UnsupportedFormat {
            filename: name.into_owned(),
        })
}
