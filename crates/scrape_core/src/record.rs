use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;

pub const GITHUB_TOPIC_SCRIPT: &str = "github.topic";
pub const GITHUB_TOPIC_SCRIPT_VERSION: &str = "0.0";
pub const GITHUB_BASE_URL: &str = "https://github.com";

/// One repository listed on a GitHub topic page.
///
/// `description` and `lang` must be present in a document but may be `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubTopicRecord {
    /// The scraped topic.
    pub topic: String,
    pub user: String,
    pub name: String,
    /// Full project url.
    pub url: String,
    /// Hero banner source, when the page has one.
    #[serde(default)]
    pub img: Option<String>,
    pub stars: u64,
    #[serde(deserialize_with = "Option::deserialize")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Approximate time of the last update, as published.
    pub last_update: String,
    #[serde(deserialize_with = "Option::deserialize")]
    pub lang: Option<String>,
}

pub type GithubTopicEnvelope = Envelope<Vec<GithubTopicRecord>>;

impl GithubTopicRecord {
    /// Envelope for one topic run; `args` follow the `[topic, "max_pages", n]` convention.
    pub fn envelope(
        topic: &str,
        max_pages: u32,
        page_url: &str,
        records: Vec<GithubTopicRecord>,
    ) -> GithubTopicEnvelope {
        let args = [topic.to_string(), "max_pages".to_string(), max_pages.to_string()];
        Envelope::new(
            GITHUB_TOPIC_SCRIPT,
            GITHUB_TOPIC_SCRIPT_VERSION,
            args,
            Envelope::<()>::base_url(page_url),
        )
        .with_data(records)
    }
}
