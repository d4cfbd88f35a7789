use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_info};
use scrape_core::{Envelope, RawDocument};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::HandlerError;
use crate::formats::FormatOptions;
use crate::mime::{guess_mime, Mime};
use crate::naming::{auto_name, NameOptions};
use crate::persist::AtomicFileWriter;

/// Arguments to [`FileHandler::write`].
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Data to write instead of the handler's own content.
    pub data: Option<Value>,
    /// Explicit target; auto-naming is skipped when set.
    pub fname: Option<PathBuf>,
    pub naming: NameOptions,
}

/// An open scrape artifact in one of the registered formats.
///
/// The raw document is read eagerly at construction and cached; `meta` and
/// `read` are views over it.
#[derive(Debug, Clone)]
pub struct FileHandler {
    mime: Mime,
    filepath: Option<PathBuf>,
    raw: RawDocument,
    options: FormatOptions,
}

impl FileHandler {
    /// Reads `filepath` when given, otherwise wraps `data`. Having neither is
    /// a configuration error; an empty document counts as no data.
    pub fn new(
        mime: Mime,
        filepath: Option<PathBuf>,
        data: Option<RawDocument>,
        options: FormatOptions,
    ) -> Result<Self, HandlerError> {
        let raw = match (&filepath, data) {
            (Some(path), _) => mime.format().read_raw(path, &options)?,
            (None, Some(raw)) if !raw.is_empty() => raw,
            (None, _) => {
                return Err(HandlerError::Configuration(format!(
                    "missing filepath or raw data for {mime} handler instantiation"
                )))
            }
        };
        if let Some(path) = &filepath {
            engine_debug!("Read {} handler from {:?}", mime, path);
        }
        Ok(Self {
            mime,
            filepath,
            raw,
            options,
        })
    }

    pub fn from_file(mime: Mime, filepath: impl Into<PathBuf>) -> Result<Self, HandlerError> {
        Self::new(mime, Some(filepath.into()), None, FormatOptions::default())
    }

    pub fn from_file_with(
        mime: Mime,
        filepath: impl Into<PathBuf>,
        options: FormatOptions,
    ) -> Result<Self, HandlerError> {
        Self::new(mime, Some(filepath.into()), None, options)
    }

    /// Wraps an already materialized document without touching disk.
    pub fn from_obj(mime: Mime, raw: RawDocument) -> Result<Self, HandlerError> {
        Self::new(mime, None, Some(raw), FormatOptions::default())
    }

    pub fn from_obj_with(
        mime: Mime,
        raw: RawDocument,
        options: FormatOptions,
    ) -> Result<Self, HandlerError> {
        Self::new(mime, None, Some(raw), options)
    }

    /// Wraps a typed envelope.
    pub fn from_envelope<T: serde::Serialize>(
        mime: Mime,
        envelope: &Envelope<T>,
    ) -> Result<Self, HandlerError> {
        Self::from_obj(mime, envelope.to_raw()?)
    }

    /// Opens `filepath` with the variant the mime registry picks for it.
    pub fn open(filepath: impl AsRef<Path>) -> Result<Self, HandlerError> {
        Self::open_with(filepath, FormatOptions::default())
    }

    pub fn open_with(
        filepath: impl AsRef<Path>,
        options: FormatOptions,
    ) -> Result<Self, HandlerError> {
        let path = filepath.as_ref();
        let mime = guess_mime(path)?;
        Self::from_file_with(mime, path, options)
    }

    pub fn mime(&self) -> Mime {
        self.mime
    }

    pub fn filepath(&self) -> Option<&Path> {
        self.filepath.as_deref()
    }

    /// Associates a source path, e.g. so a converted copy can be named after it.
    pub fn set_filepath(&mut self, filepath: Option<PathBuf>) {
        self.filepath = filepath;
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Raw document. With `cache` the stored copy is returned; without it
    /// the file is read again (when there is one) and the cache refreshed.
    pub fn raw(&mut self, cache: bool) -> Result<&RawDocument, HandlerError> {
        if !cache {
            if let Some(path) = &self.filepath {
                self.raw = self.mime.format().read_raw(path, &self.options)?;
            }
        }
        Ok(&self.raw)
    }

    /// Payload portion of the raw document.
    pub fn read(&self) -> Option<&Value> {
        self.raw.data()
    }

    /// Everything but the payload.
    pub fn meta(&self) -> RawDocument {
        self.raw.meta()
    }

    /// Validates the raw document against `Envelope<T>`.
    pub fn envelope<T: DeserializeOwned>(&self) -> Result<Envelope<T>, HandlerError> {
        let context = match &self.filepath {
            Some(path) => path.display().to_string(),
            None => format!("in-memory {} document", self.mime),
        };
        Ok(Envelope::from_raw(self.raw.clone(), &context)?)
    }

    pub fn auto_name(&self, options: &NameOptions) -> Result<PathBuf, HandlerError> {
        auto_name(self.mime, &self.raw.meta(), self.filepath(), options)
    }

    /// Serializes the handler content, or `options.data`, and returns the path written.
    pub fn write(&self, options: &WriteOptions) -> Result<PathBuf, HandlerError> {
        let bytes = self
            .mime
            .format()
            .encode(&self.raw, options.data.as_ref(), &self.options)?;
        let target = match &options.fname {
            Some(fname) => fname.clone(),
            None => self.auto_name(&options.naming)?,
        };
        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                HandlerError::Configuration(format!(
                    "write target {} has no file name",
                    target.display()
                ))
            })?;

        let written = AtomicFileWriter::for_target(&target).write(&file_name, &bytes)?;
        engine_info!("Wrote {} bytes of {} to {:?}", bytes.len(), self.mime, written);
        Ok(written)
    }
}
