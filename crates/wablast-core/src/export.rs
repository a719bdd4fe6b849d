//! Failed-contact export
//!
//! Writes the contacts a run could not deliver to as CSV, so they can be
//! fed straight back into a later run.

use chrono::Local;
use std::path::{Path, PathBuf};

use crate::types::Contact;
use crate::StoreError;

/// Write `contacts` to a CSV file under `dir`
///
/// When `filename` is not given, a timestamped name like
/// `failed_2026-08-05_1430.csv` is used. The output directory is created if
/// it does not exist. Returns the path written.
pub fn export_failed(
    contacts: &[Contact],
    dir: &Path,
    filename: Option<&str>,
) -> Result<PathBuf, StoreError> {
    std::fs::create_dir_all(dir)?;

    let filename = match filename {
        Some(name) => name.to_string(),
        None => format!("failed_{}.csv", Local::now().format("%Y-%m-%d_%H%M")),
    };
    let path = dir.join(filename);

    let mut writer = csv::Writer::from_path(&path)?;
    for contact in contacts {
        writer.serialize(contact)?;
    }
    writer.flush()?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_named_csv_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        let failed = vec![
            Contact::new("Alice", "8801711111111"),
            Contact::new("Bob", "8801822222222"),
        ];

        let path = export_failed(&failed, dir.path(), Some("retry.csv")).unwrap();
        assert_eq!(path, dir.path().join("retry.csv"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("name,phone\n"));
        assert!(content.contains("Alice,8801711111111"));
        assert!(content.contains("Bob,8801822222222"));
    }

    #[test]
    fn default_filename_is_timestamped() {
        let dir = tempfile::tempdir().unwrap();
        let failed = vec![Contact::new("Alice", "8801711111111")];

        let path = export_failed(&failed, dir.path(), None).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("failed_"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn creates_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("failed");

        export_failed(&[], &nested, Some("empty.csv")).unwrap();
        assert!(nested.join("empty.csv").exists());
    }
}
