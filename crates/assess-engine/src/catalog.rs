/// Catalog store: the static, ordered collection of assessment records.
///
/// Loaded once at startup and read-only afterwards. A record's position in the catalog
/// is its candidate identifier throughout the pipeline.
use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::error::CatalogError;
use crate::model::AssessmentRecord;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<AssessmentRecord>,
}

impl Catalog {
    /// Build a catalog from records, keeping the first occurrence of each URL.
    pub fn from_records(records: Vec<AssessmentRecord>) -> Self {
        let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
        let mut kept = Vec::with_capacity(records.len());
        for record in records {
            if !seen.insert(record.url.clone()) {
                warn!(url = %record.url, "duplicate catalog url dropped");
                continue;
            }
            kept.push(record);
        }
        Self { records: kept }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON array of assessment objects.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<AssessmentRecord> =
            serde_json::from_str(&content).map_err(|source| CatalogError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_records(records))
    }

    /// Load the primary catalog, falling back to the secondary one, and finally to an
    /// empty catalog. Never fails.
    pub fn load_with_fallback(primary: &Path, fallback: &Path) -> Self {
        match Self::load(primary) {
            Ok(catalog) => {
                info!(path = %primary.display(), records = catalog.len(), "catalog loaded");
                return catalog;
            }
            Err(e) => warn!(error = %e, "primary catalog unavailable, trying fallback"),
        }

        match Self::load(fallback) {
            Ok(catalog) => {
                warn!(
                    path = %fallback.display(),
                    records = catalog.len(),
                    "using fallback catalog"
                );
                catalog
            }
            Err(e) => {
                warn!(error = %e, "fallback catalog unavailable, starting with an empty catalog");
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AssessmentRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[AssessmentRecord] {
        &self.records
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.records.iter().any(|r| r.url == url)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_catalog(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_records_in_file_order() {
        let file = write_catalog(
            r#"[{"url": "a", "name": "First"}, {"url": "b", "name": "Second"}]"#,
        );
        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().name, "First");
        assert_eq!(catalog.get(1).unwrap().name, "Second");
    }

    #[test]
    fn duplicate_urls_keep_first_occurrence() {
        let file = write_catalog(
            r#"[{"url": "a", "name": "First"}, {"url": "a", "name": "Again"}, {"url": "b", "name": "B"}]"#,
        );
        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().name, "First");
        assert!(catalog.contains_url("b"));
    }

    #[test]
    fn falls_back_to_secondary_catalog() {
        let fallback = write_catalog(r#"[{"url": "f", "name": "Fallback"}]"#);
        let catalog =
            Catalog::load_with_fallback(Path::new("/nonexistent/catalog.json"), fallback.path());
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains_url("f"));
    }

    #[test]
    fn malformed_primary_uses_fallback() {
        let primary = write_catalog("{not json");
        let fallback = write_catalog(r#"[{"url": "f", "name": "Fallback"}]"#);
        let catalog = Catalog::load_with_fallback(primary.path(), fallback.path());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn both_missing_yields_empty_catalog() {
        let catalog = Catalog::load_with_fallback(
            Path::new("/nonexistent/a.json"),
            Path::new("/nonexistent/b.json"),
        );
        assert!(catalog.is_empty());
    }

    #[test]
    fn load_reports_io_error() {
        let err = Catalog::load(Path::new("/nonexistent/a.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
