//! Filename <-> metadata rules for auto-named artifacts.
//!
//! Auto-named files follow `{stamp}_{topic}_{arg1}_{arg2}....{ext}`. Reading
//! metadata back out of such a name is a best-effort heuristic: a topic that
//! itself contains the separator cannot be told apart from trailing args, so
//! everything after the stamp comes back as the topic.

use std::path::Path;

use serde_json::Value;

use crate::raw::RawDocument;

pub const DEFAULT_NAME_SEP: &str = "_";

/// Values used when the filename does not yield a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaOverrides {
    pub topic: Option<String>,
    pub stamp: Option<String>,
    pub script_version: Option<String>,
    pub url: Option<String>,
}

/// Partial provenance recovered from a filename.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferredMeta {
    pub topic: String,
    pub script_version: String,
    pub url: String,
    pub timestamp: String,
}

impl InferredMeta {
    pub fn into_raw(self) -> RawDocument {
        let mut raw = RawDocument::new();
        raw.insert("topic", Value::String(self.topic));
        raw.insert("script_version", Value::String(self.script_version));
        raw.insert("url", Value::String(self.url));
        raw.insert("timestamp", Value::String(self.timestamp));
        raw
    }
}

fn effective_sep(sep: &str) -> &str {
    if sep.is_empty() {
        DEFAULT_NAME_SEP
    } else {
        sep
    }
}

/// Splits a file name at its first dot: `a.json.gz` -> (`a`, `.json.gz`).
pub fn split_suffixes(file_name: &str) -> (&str, &str) {
    match file_name.find('.') {
        Some(idx) => file_name.split_at(idx),
        None => (file_name, ""),
    }
}

/// Infers stamp and topic from `filename`; never fails.
///
/// Only the file name is considered and every extension is discarded. The
/// first `sep`-delimited segment is the stamp, the rest (rejoined) the topic.
/// Overrides only fill fields the name leaves empty.
pub fn guess_meta(filename: &Path, overrides: &MetaOverrides, sep: &str) -> InferredMeta {
    let sep = effective_sep(sep);
    let name = filename
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (stem, _) = split_suffixes(&name);

    let mut parts = stem.split(sep);
    let stamp = parts.next().unwrap_or_default().to_string();
    let topic = parts.collect::<Vec<_>>().join(sep);

    let pick = |found: String, fallback: &Option<String>| {
        if found.is_empty() {
            fallback.clone().unwrap_or_default()
        } else {
            found
        }
    };

    InferredMeta {
        topic: pick(topic, &overrides.topic),
        script_version: overrides.script_version.clone().unwrap_or_default(),
        url: overrides.url.clone().unwrap_or_default(),
        timestamp: pick(stamp, &overrides.stamp),
    }
}

/// Builds `{stamp}{sep}{topic}{sep}{args...}.{ext}`.
///
/// The args segment is left out entirely when there are no args, so that
/// [`guess_meta`] returns the topic unchanged.
///
/// Segments are made filesystem-safe first: path separators, `:` and the
/// other characters Windows forbids become `-`, and so do dots, which would
/// otherwise be read back as extensions.
pub fn compose_name(stamp: &str, topic: &str, args: &[String], sep: &str, ext: &str) -> String {
    let sep = effective_sep(sep);
    let mut name = format!("{}{sep}{}", sanitize_segment(stamp), sanitize_segment(topic));
    for arg in args {
        name.push_str(sep);
        name.push_str(&sanitize_segment(arg));
    }
    format!("{name}.{ext}")
}

fn sanitize_segment(input: &str) -> String {
    input
        .chars()
        .map(|c| if c == '.' || is_forbidden(c) { '-' } else { c })
        .collect()
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

/// Swaps the leading extension of `file_name` for `token`, keeping later suffixes.
///
/// `20241125_gdpr.csv` -> `20241125_gdpr.json`, `a.csv.gz` -> `a.json.gz`.
pub fn rename_for_mime(file_name: &str, token: &str) -> String {
    let (base, suffixes) = split_suffixes(file_name);
    let rest: Vec<&str> = suffixes.split('.').skip(2).collect();
    let mut renamed = format!("{base}.{token}");
    for suffix in rest {
        renamed.push('.');
        renamed.push_str(suffix);
    }
    renamed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn stamp_and_topic_come_from_the_name() {
        let meta = guess_meta(
            &PathBuf::from("/data/out/20241125_gdpr.csv"),
            &MetaOverrides::default(),
            "_",
        );
        assert_eq!(meta.timestamp, "20241125");
        assert_eq!(meta.topic, "gdpr");
        assert_eq!(meta.script_version, "");
        assert_eq!(meta.url, "");
    }

    #[test]
    fn topic_keeps_separator_when_ambiguous() {
        let meta = guess_meta(
            Path::new("20240101_github.topic_gdpr_max_pages_3.json"),
            &MetaOverrides::default(),
            "_",
        );
        assert_eq!(meta.timestamp, "20240101");
        // Cut at the first dot, so the script id's dot truncates the topic.
        assert_eq!(meta.topic, "github");

        let meta = guess_meta(
            Path::new("20240101_my_topic.json"),
            &MetaOverrides::default(),
            "_",
        );
        assert_eq!(meta.topic, "my_topic");
    }

    #[test]
    fn overrides_fill_only_missing_fields() {
        let overrides = MetaOverrides {
            topic: Some("fallback".into()),
            stamp: Some("ignored".into()),
            script_version: Some("1.2".into()),
            url: Some("https://example.com".into()),
        };
        let meta = guess_meta(Path::new("20240101.csv"), &overrides, "_");
        assert_eq!(meta.timestamp, "20240101");
        assert_eq!(meta.topic, "fallback");
        assert_eq!(meta.script_version, "1.2");
        assert_eq!(meta.url, "https://example.com");
    }

    #[test]
    fn custom_separator() {
        let meta = guess_meta(Path::new("2024-a-b.csv"), &MetaOverrides::default(), "-");
        assert_eq!(meta.timestamp, "2024");
        assert_eq!(meta.topic, "a-b");
    }

    #[test]
    fn compose_then_guess_recovers_stamp_and_topic() {
        let name = compose_name("20240101", "example", &[], "_", "json");
        assert_eq!(name, "20240101_example.json");
        let meta = guess_meta(Path::new(&name), &MetaOverrides::default(), "_");
        assert_eq!(meta.timestamp, "20240101");
        assert_eq!(meta.topic, "example");
    }

    #[test]
    fn compose_joins_args() {
        let args = vec!["gdpr".to_string(), "max_pages".to_string(), "3".to_string()];
        assert_eq!(
            compose_name("20240101", "topic", &args, "_", "csv"),
            "20240101_topic_gdpr_max_pages_3.csv"
        );
    }

    #[test]
    fn compose_sanitizes_segments() {
        let args = vec!["https://github.com/topics".to_string()];
        assert_eq!(
            compose_name("2024-11-25T12:00:00", "github.topic", &args, "_", "json"),
            "2024-11-25T12-00-00_github-topic_https---github-com-topics.json"
        );
    }

    #[test]
    fn rename_replaces_only_leading_extension() {
        assert_eq!(rename_for_mime("20241125_gdpr.csv", "json"), "20241125_gdpr.json");
        assert_eq!(rename_for_mime("a.csv.gz", "json"), "a.json.gz");
        assert_eq!(rename_for_mime("noext", "csv"), "noext.csv");
    }

    #[test]
    fn split_suffixes_at_first_dot() {
        assert_eq!(split_suffixes("a.json.gz"), ("a", ".json.gz"));
        assert_eq!(split_suffixes("plain"), ("plain", ""));
    }
}
