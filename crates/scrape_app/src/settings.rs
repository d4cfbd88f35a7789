use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};
use scrape_engine::{ConvertOptions, FormatOptions};
use serde::{Deserialize, Serialize};

pub(crate) const SETTINGS_FILENAME: &str = "scrape_app.ron";

/// Conversion defaults read from `scrape_app.ron`; every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppSettings {
    pub output_dir: Option<PathBuf>,
    pub overwrite: bool,
    pub name_sep: String,
    pub csv_delimiter: char,
}

impl Default for AppSettings {
    fn default() -> Self {
        let format = FormatOptions::default();
        Self {
            output_dir: None,
            overwrite: false,
            name_sep: format.name_sep,
            csv_delimiter: char::from(format.csv_delimiter),
        }
    }
}

impl AppSettings {
    pub(crate) fn convert_options(&self) -> ConvertOptions {
        let mut format = FormatOptions {
            name_sep: self.name_sep.clone(),
            ..FormatOptions::default()
        };
        if self.csv_delimiter.is_ascii() {
            format.csv_delimiter = self.csv_delimiter as u8;
        } else {
            engine_warn!(
                "Ignoring non-ASCII csv delimiter {:?}; using {:?}",
                self.csv_delimiter,
                char::from(format.csv_delimiter)
            );
        }
        ConvertOptions {
            dir: self.output_dir.clone(),
            overwrite: self.overwrite,
            format,
        }
    }
}

/// Loads settings from `dir`, falling back to defaults when the file is
/// missing or unreadable.
pub(crate) fn load_settings(dir: &Path) -> AppSettings {
    let path = dir.join(SETTINGS_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return AppSettings::default();
        }
        Err(err) => {
            engine_warn!("Failed to read settings from {:?}: {}", path, err);
            return AppSettings::default();
        }
    };

    match ron::from_str(&content) {
        Ok(settings) => {
            engine_info!("Loaded settings from {:?}", path);
            settings
        }
        Err(err) => {
            engine_warn!("Failed to parse settings from {:?}: {}", path, err);
            AppSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        assert_eq!(load_settings(temp.path()), AppSettings::default());
    }

    #[test]
    fn partial_file_overrides_given_fields() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(SETTINGS_FILENAME),
            "(overwrite: true, csv_delimiter: ';')",
        )
        .unwrap();
        let settings = load_settings(temp.path());
        assert!(settings.overwrite);
        assert_eq!(settings.csv_delimiter, ';');
        assert_eq!(settings.name_sep, "_");

        let options = settings.convert_options();
        assert!(options.overwrite);
        assert_eq!(options.format.csv_delimiter, b';');
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(SETTINGS_FILENAME), "(overwrite: maybe").unwrap();
        assert_eq!(load_settings(temp.path()), AppSettings::default());
    }

    #[test]
    fn non_ascii_delimiter_is_ignored() {
        let settings = AppSettings {
            csv_delimiter: '§',
            ..AppSettings::default()
        };
        assert_eq!(settings.convert_options().format.csv_delimiter, b',');
    }
}
