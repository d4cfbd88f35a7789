use std::path::{Path, PathBuf};

use engine_logging::{engine_error, engine_info};

use crate::error::HandlerError;
use crate::formats::FormatOptions;
use crate::handler::{FileHandler, WriteOptions};
use crate::mime::{guess_mime, Mime};
use crate::naming::{NameMode, NameOptions};

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Output directory; defaults to each source file's directory.
    pub dir: Option<PathBuf>,
    pub overwrite: bool,
    pub format: FormatOptions,
}

/// Result of converting one source file.
#[derive(Debug)]
pub struct ConversionOutcome {
    pub source: PathBuf,
    pub result: Result<PathBuf, HandlerError>,
}

/// Per-item outcomes of a batch conversion, in input order.
#[derive(Debug, Default)]
pub struct ConversionReport {
    pub outcomes: Vec<ConversionOutcome>,
}

impl ConversionReport {
    pub fn succeeded(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(output) => Some((o.source.as_path(), output.as_path())),
            Err(_) => None,
        })
    }

    pub fn failed(&self) -> impl Iterator<Item = (&Path, &HandlerError)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(_) => None,
            Err(err) => Some((o.source.as_path(), err)),
        })
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Re-encodes `source` as `target`, keeping its metadata and payload.
///
/// The output is named after the source file with its leading extension
/// replaced by the target token.
pub fn convert_file(
    source: &Path,
    target: Mime,
    options: &ConvertOptions,
) -> Result<PathBuf, HandlerError> {
    let mime = guess_mime(source)?;
    let mut reader = FileHandler::from_file_with(mime, source, options.format.clone())?;
    let raw = reader.raw(true)?.clone();

    let mut writer = FileHandler::from_obj_with(target, raw, options.format.clone())?;
    writer.set_filepath(Some(source.to_path_buf()));
    writer.write(&WriteOptions {
        naming: NameOptions {
            dir: options.dir.clone(),
            mode: NameMode::FromFilepath,
            overwrite: options.overwrite,
            name_sep: options.format.name_sep.clone(),
            ..Default::default()
        },
        ..Default::default()
    })
}

/// Converts every source independently; one failure does not stop the rest.
pub fn convert_files<P: AsRef<Path>>(
    sources: &[P],
    target: Mime,
    options: &ConvertOptions,
) -> ConversionReport {
    let outcomes = sources
        .iter()
        .map(|source| {
            let source = source.as_ref();
            let result = convert_file(source, target, options);
            match &result {
                Ok(output) => engine_info!("Converted {:?} to {:?}", source, output),
                Err(err) => engine_error!("Failed to convert {:?} to {}: {}", source, target, err),
            }
            ConversionOutcome {
                source: source.to_path_buf(),
                result,
            }
        })
        .collect();
    ConversionReport { outcomes }
}
