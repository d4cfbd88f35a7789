use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use engine_logging::engine_debug;
use scrape_core::{compose_name, rename_for_mime, split_suffixes, RawDocument, DEFAULT_NAME_SEP};
use uuid::Uuid;

use crate::error::HandlerError;
use crate::mime::Mime;

/// Where an auto-generated name comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMode {
    /// `{stamp}_{topic}_{args}` built from the handler's metadata.
    FromMeta,
    /// The source file's name with its leading extension swapped.
    #[default]
    FromFilepath,
    /// A fresh v4 uuid; no collision check.
    Uuid,
}

#[derive(Debug, Clone)]
pub struct NameOptions {
    /// Output directory. Defaults to the source file's directory in
    /// [`NameMode::FromFilepath`], the current directory otherwise.
    pub dir: Option<PathBuf>,
    pub topic: Option<String>,
    pub args: Vec<String>,
    pub stamp: Option<String>,
    pub mode: NameMode,
    pub overwrite: bool,
    pub name_sep: String,
}

impl Default for NameOptions {
    fn default() -> Self {
        Self {
            dir: None,
            topic: None,
            args: Vec::new(),
            stamp: None,
            mode: NameMode::default(),
            overwrite: false,
            name_sep: DEFAULT_NAME_SEP.to_string(),
        }
    }
}

/// Resolves the output path for a handler of variant `mime`.
pub(crate) fn auto_name(
    mime: Mime,
    meta: &RawDocument,
    filepath: Option<&Path>,
    options: &NameOptions,
) -> Result<PathBuf, HandlerError> {
    let current_dir = || PathBuf::from(".");
    let candidate = match options.mode {
        NameMode::Uuid => {
            let dir = options.dir.clone().unwrap_or_else(current_dir);
            return Ok(dir.join(format!("{}.{}", Uuid::new_v4(), mime.token())));
        }
        NameMode::FromMeta => {
            if meta.is_empty() {
                return Err(HandlerError::Configuration(
                    "cannot derive a name from metadata: no metadata is associated with the handler"
                        .to_string(),
                ));
            }
            let stamp = options
                .stamp
                .clone()
                .or_else(|| meta.get_str("timestamp").map(str::to_string))
                .unwrap_or_else(|| Local::now().format("%Y-%m-%dT%H:%M:%S%.3f").to_string());
            let topic = options
                .topic
                .as_deref()
                .or_else(|| meta.get_str("script"))
                .or_else(|| meta.get_str("topic"))
                .unwrap_or("noscript");
            let args = if options.args.is_empty() {
                meta.get_str_list("args")
            } else {
                options.args.clone()
            };
            let name = compose_name(&stamp, topic, &args, &options.name_sep, mime.token());
            options.dir.clone().unwrap_or_else(current_dir).join(name)
        }
        NameMode::FromFilepath => {
            let source = filepath.ok_or_else(|| {
                HandlerError::Configuration(
                    "cannot derive a name from the source file: the handler has no filepath"
                        .to_string(),
                )
            })?;
            let file_name = source.file_name().ok_or_else(|| {
                HandlerError::Configuration(format!(
                    "cannot derive a name from {}: it has no file name",
                    source.display()
                ))
            })?;
            let renamed = rename_for_mime(&file_name.to_string_lossy(), mime.token());
            let dir = options.dir.clone().unwrap_or_else(|| {
                source
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(current_dir)
            });
            dir.join(renamed)
        }
    };

    if options.overwrite {
        return Ok(candidate);
    }
    disambiguate(candidate)
}

/// Appends ` {n}` before the suffixes when `{base}{suffixes}` or an indexed
/// sibling already exists. Advisory: nothing stops another writer from taking
/// the name between this check and the write.
fn disambiguate(candidate: PathBuf) -> Result<PathBuf, HandlerError> {
    let Some(file_name) = candidate.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return Ok(candidate);
    };
    let dir = candidate
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let (base, suffixes) = split_suffixes(&file_name);

    let taken = count_indexed(&dir, base, suffixes)?;
    if taken == 0 {
        return Ok(candidate);
    }

    let mut index = taken;
    loop {
        let next = dir.join(format!("{base} {index}{suffixes}"));
        if !next.exists() {
            engine_debug!("{file_name} is taken; using {:?}", next);
            return Ok(next);
        }
        index += 1;
    }
}

/// Counts entries named `{base}{suffixes}` or `{base} {digits}{suffixes}`.
fn count_indexed(dir: &Path, base: &str, suffixes: &str) -> Result<usize, HandlerError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(HandlerError::io(dir)(err)),
    };
    let count = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.strip_prefix(base)
                .and_then(|rest| rest.strip_suffix(suffixes))
                .is_some_and(|index| {
                    index.is_empty()
                        || index
                            .strip_prefix(' ')
                            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
                })
        })
        .count();
    Ok(count)
}
