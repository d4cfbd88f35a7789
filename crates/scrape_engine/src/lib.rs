//! Scrape engine: mime dispatch, file handlers and format conversion.
mod convert;
mod error;
mod formats;
mod handler;
mod mime;
mod naming;
mod persist;

pub use convert::{convert_file, convert_files, ConversionOutcome, ConversionReport, ConvertOptions};
pub use error::HandlerError;
pub use formats::FormatOptions;
pub use handler::{FileHandler, WriteOptions};
pub use mime::{guess_mime, Mime};
pub use naming::{NameMode, NameOptions};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
