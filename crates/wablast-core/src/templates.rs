//! Named message templates
//!
//! A template is a plain-text file in the store directory; the filename
//! (minus `.txt`) is the template's name. Rendering substitutes `{name}`
//! with the recipient's name and nothing else.

use std::path::PathBuf;
use tracing::warn;

use crate::StoreError;

/// Placeholder substituted with the contact name at render time
pub const NAME_PLACEHOLDER: &str = "{name}";

const TEMPLATE_EXT: &str = "txt";

/// Render a template body for one recipient
///
/// Deterministic: the same `(body, name)` pair always produces the same
/// message, and a body without the placeholder comes back unchanged.
pub fn render(body: &str, name: &str) -> String {
    body.replace(NAME_PLACEHOLDER, name)
}

/// Directory-backed store of named templates
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// List stored template names, sorted
    ///
    /// A missing store directory is an empty store, not an error.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable template entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Load a template body by name
    pub fn load(&self, name: &str) -> Result<String, StoreError> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(StoreError::TemplateNotFound(name.to_string()));
        }
        Ok(std::fs::read_to_string(&path)?.trim().to_string())
    }

    /// Create or overwrite a template
    pub fn save(&self, name: &str, body: &str) -> Result<PathBuf, StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name);
        std::fs::write(&path, body)?;
        Ok(path)
    }

    /// Remove a template by name
    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(StoreError::TemplateNotFound(name.to_string()));
        }
        std::fs::remove_file(&path)?;
        Ok(())
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, TEMPLATE_EXT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_placeholder() {
        assert_eq!(render("Hi {name}!", "Alice"), "Hi Alice!");
        assert_eq!(render("{name} and {name}", "Bob"), "Bob and Bob");
    }

    #[test]
    fn render_without_placeholder_is_unchanged() {
        assert_eq!(render("Monthly offer inside.", "Alice"), "Monthly offer inside.");
        assert_eq!(render("Monthly offer inside.", "Bob"), "Monthly offer inside.");
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());

        store.save("promo", "Hi {name}, new stock arrived.").unwrap();
        let body = store.load("promo").unwrap();
        assert_eq!(body, "Hi {name}, new stock arrived.");
    }

    #[test]
    fn load_trims_trailing_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());

        store.save("promo", "Hi {name}\n\n").unwrap();
        assert_eq!(store.load("promo").unwrap(), "Hi {name}");
    }

    #[test]
    fn list_is_sorted_and_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());

        store.save("zeta", "z").unwrap();
        store.save("alpha", "a").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignore me").unwrap();

        assert_eq!(store.list().unwrap(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn missing_store_directory_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path().join("nope"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn load_and_delete_missing_template_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());

        assert!(matches!(
            store.load("ghost"),
            Err(StoreError::TemplateNotFound(_))
        ));
        assert!(matches!(
            store.delete("ghost"),
            Err(StoreError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn delete_removes_template() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path());

        store.save("promo", "body").unwrap();
        store.delete("promo").unwrap();
        assert!(store.list().unwrap().is_empty());
    }
}
