//! Catalog listing filters and sort orders.

use crate::models::{CatalogEntry, Category, Classification};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// By reading, falling back to name
    #[default]
    Reading,
    /// Highest id first
    Newest,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kana" | "reading" => Ok(SortOrder::Reading),
            "newest" | "new" => Ok(SortOrder::Newest),
            other => Err(format!("unknown sort order '{}' (expected kana or newest)", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogFilter {
    pub search: Option<String>,
    pub classification: Option<Classification>,
    /// Uncategorized entries count as `Other`
    pub category: Option<Category>,
    /// Only entries without a registered reading
    pub missing_reading: bool,
}

impl CatalogFilter {
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        if let Some(classification) = self.classification {
            if entry.classification != classification {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if entry.effective_category() != *category {
                return false;
            }
        }
        if self.missing_reading && entry.has_reading() {
            return false;
        }
        match self.search.as_deref().map(|s| s.trim().to_lowercase()) {
            Some(term) if !term.is_empty() => {
                entry.name.to_lowercase().contains(&term)
                    || entry
                        .kana
                        .as_deref()
                        .map(|k| k.to_lowercase().contains(&term))
                        .unwrap_or(false)
            }
            _ => true,
        }
    }
}

pub fn list<'a>(catalog: &'a [CatalogEntry], filter: &CatalogFilter, order: SortOrder) -> Vec<&'a CatalogEntry> {
    let mut entries: Vec<&CatalogEntry> = catalog.iter().filter(|e| filter.matches(e)).collect();
    match order {
        SortOrder::Reading => entries.sort_by(|a, b| compare_reading(a, b)),
        SortOrder::Newest => entries.sort_by(|a, b| b.id.cmp(&a.id)),
    }
    entries
}

fn compare_reading(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    a.sort_key()
        .to_lowercase()
        .cmp(&b.sort_key().to_lowercase())
        .then_with(|| a.id.cmp(&b.id))
}
