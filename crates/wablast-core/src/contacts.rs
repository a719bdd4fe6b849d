//! Contact ingestion: file parsing and phone normalization
//!
//! Two accepted formats: CSV with `name` and `phone` headers, and plain text
//! with one contact per line (`name - phone`, or a bare phone with the name
//! defaulting to "Customer"). Records that fail phone normalization are
//! skipped with a warning; file-level problems are fatal.

use std::path::Path;
use tracing::warn;

use crate::types::Contact;
use crate::IngestionError;

/// Name used when a text line carries only a phone number
const DEFAULT_NAME: &str = "Customer";

/// Normalize a raw phone number to the Bangladeshi international form
///
/// Strips every non-digit, then prefixes according to how the number was
/// written: `017…` and `17…` become `88017…`, `88…` is completed to `880…`,
/// and an already-international `8801…` passes through unchanged. The result
/// always starts with `880` and has at least 11 digits.
///
/// Normalization is pure and idempotent.
pub fn normalize_phone(raw: &str) -> Result<String, IngestionError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    let phone = if digits.starts_with("01") {
        format!("88{}", digits)
    } else if digits.starts_with('1') {
        format!("880{}", digits)
    } else if digits.starts_with("8801") {
        digits
    } else if digits.starts_with("88") {
        if digits.starts_with("880") {
            digits
        } else {
            format!("880{}", &digits[2..])
        }
    } else {
        return Err(IngestionError::InvalidPhoneFormat(raw.to_string()));
    };

    if !phone.starts_with("880") || phone.len() < 11 {
        return Err(IngestionError::InvalidPhoneFormat(raw.to_string()));
    }

    Ok(phone)
}

/// Load and validate contacts from a `.csv` or `.txt` file
///
/// Returns only the contacts whose phone numbers normalized; everything else
/// is logged and dropped here, so the pipeline never sees an invalid number.
pub fn load_contacts(path: &Path) -> Result<Vec<Contact>, IngestionError> {
    if !path.exists() {
        return Err(IngestionError::FileNotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let raw = match ext.as_deref() {
        Some("csv") => read_csv(path)?,
        Some("txt") => read_txt(path)?,
        _ => return Err(IngestionError::UnsupportedFormat(path.to_path_buf())),
    };

    let mut contacts = Vec::with_capacity(raw.len());
    for (name, phone) in raw {
        match normalize_phone(&phone) {
            Ok(normalized) => contacts.push(Contact::new(name, normalized)),
            Err(e) => warn!("Skipping invalid number {}: {}", phone, e),
        }
    }

    Ok(contacts)
}

fn read_csv(path: &Path) -> Result<Vec<(String, String)>, IngestionError> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    let name_idx = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("name"));
    let phone_idx = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("phone"));

    let (Some(name_idx), Some(phone_idx)) = (name_idx, phone_idx) else {
        return Err(IngestionError::MissingColumns("name, phone".to_string()));
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping malformed CSV row: {}", e);
                continue;
            }
        };

        let name = record
            .get(name_idx)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_NAME);
        let phone = record.get(phone_idx).map(str::trim).unwrap_or_default();

        rows.push((name.to_string(), phone.to_string()));
    }

    Ok(rows)
}

fn read_txt(path: &Path) -> Result<Vec<(String, String)>, IngestionError> {
    let content = std::fs::read_to_string(path)?;

    let mut rows = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (name, phone) = match line.split_once('-') {
            Some((name, phone)) => (name.trim().to_string(), phone.trim().to_string()),
            None => (DEFAULT_NAME.to_string(), line.to_string()),
        };
        rows.push((name, phone));
    }

    Ok(rows)
}
