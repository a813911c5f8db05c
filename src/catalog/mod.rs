use crate::error::CatalogError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const EMBEDDED_CATALOG: &str = include_str!("artworks.json");

/// One folder of images, fetched in listed order
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub fallback: String,
    pub categories: Vec<Category>,
}

// Flattened view of a single catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub category: String,
    /// 1-based position inside the category
    pub index: usize,
    pub url: String,
}

impl Catalog {
    /// The artwork catalog compiled into the binary
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Load a catalog from a JSON file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reject catalogs whose entries could not map to distinct destination files
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.categories.is_empty() {
            return Err(CatalogError::NoCategories);
        }
        if self.fallback.trim().is_empty() {
            return Err(CatalogError::EmptyFallback);
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if !is_valid_category_name(&category.name) {
                return Err(CatalogError::InvalidCategory(category.name.clone()));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(CatalogError::DuplicateCategory(category.name.clone()));
            }
            for (i, url) in category.urls.iter().enumerate() {
                if url.trim().is_empty() {
                    return Err(CatalogError::EmptyLocator {
                        category: category.name.clone(),
                        index: i + 1,
                    });
                }
            }
        }

        Ok(())
    }

    /// Every entry in catalog order, with its per-category index assigned
    pub fn items(&self) -> Vec<CatalogItem> {
        self.categories
            .iter()
            .flat_map(|category| {
                category
                    .urls
                    .iter()
                    .enumerate()
                    .map(move |(i, url)| CatalogItem {
                        category: category.name.clone(),
                        index: i + 1,
                        url: url.clone(),
                    })
            })
            .collect()
    }

    pub fn total_items(&self) -> usize {
        self.categories.iter().map(|c| c.urls.len()).sum()
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }
}

fn is_valid_category_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_is_valid() {
        let catalog = Catalog::embedded().unwrap();
        assert_eq!(catalog.categories.len(), 6);
        assert_eq!(catalog.total_items(), 30);
        assert_eq!(catalog.categories[0].name, "van-gogh");
        assert_eq!(catalog.fallback, "https://picsum.photos/1200/800");
    }

    #[test]
    fn test_items_keep_order_and_restart_index_per_category() {
        let catalog = Catalog::from_json(
            r#"{"fallback": "f", "categories": [
                {"name": "b", "urls": ["u1", "u2"]},
                {"name": "a", "urls": ["u3"]}
            ]}"#,
        )
        .unwrap();

        let items = catalog.items();
        let keys: Vec<_> = items
            .iter()
            .map(|i| (i.category.as_str(), i.index, i.url.as_str()))
            .collect();
        assert_eq!(keys, vec![("b", 1, "u1"), ("b", 2, "u2"), ("a", 1, "u3")]);
    }

    #[test]
    fn test_empty_url_list_is_allowed() {
        let catalog =
            Catalog::from_json(r#"{"fallback": "f", "categories": [{"name": "a"}]}"#).unwrap();
        assert_eq!(catalog.total_items(), 0);
        assert!(catalog.items().is_empty());
    }

    #[test]
    fn test_rejects_path_like_category_names() {
        for name in ["", "..", ".", "a/b", "a\\b"] {
            let json = format!(
                r#"{{"fallback": "f", "categories": [{{"name": {:?}, "urls": ["u"]}}]}}"#,
                name
            );
            let err = Catalog::from_json(&json).unwrap_err();
            assert!(
                matches!(err, CatalogError::InvalidCategory(_)),
                "name {:?} gave {:?}",
                name,
                err
            );
        }
    }

    #[test]
    fn test_rejects_duplicate_categories() {
        let err = Catalog::from_json(
            r#"{"fallback": "f", "categories": [
                {"name": "a", "urls": ["u1"]},
                {"name": "a", "urls": ["u2"]}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateCategory(name) if name == "a"));
    }

    #[test]
    fn test_rejects_empty_locator_and_fallback() {
        let err = Catalog::from_json(
            r#"{"fallback": "f", "categories": [{"name": "a", "urls": ["u1", " "]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::EmptyLocator { index: 2, .. }));

        let err =
            Catalog::from_json(r#"{"fallback": "", "categories": [{"name": "a", "urls": []}]}"#)
                .unwrap_err();
        assert!(matches!(err, CatalogError::EmptyFallback));
    }

    #[test]
    fn test_rejects_empty_catalog() {
        let err = Catalog::from_json(r#"{"fallback": "f", "categories": []}"#).unwrap_err();
        assert!(matches!(err, CatalogError::NoCategories));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = Catalog::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Read { .. }));
    }
}
