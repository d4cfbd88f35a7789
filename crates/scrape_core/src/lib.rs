//! Scrape core: the versioned envelope model and pure naming rules.
mod envelope;
mod naming;
mod raw;
mod record;

pub use envelope::{now_timestamp, Envelope, EnvelopeError, Provenance};
pub use naming::{
    compose_name, guess_meta, rename_for_mime, split_suffixes, InferredMeta, MetaOverrides,
    DEFAULT_NAME_SEP,
};
pub use raw::{RawDocument, DATA_KEY};
pub use record::{
    GithubTopicEnvelope, GithubTopicRecord, GITHUB_BASE_URL, GITHUB_TOPIC_SCRIPT,
    GITHUB_TOPIC_SCRIPT_VERSION,
};
