//! Fuzzy reference matcher for catalog names.
//!
//! Editor assist only: suggests existing entries while a name is typed.
//! An entry is a candidate when the lowercased query and the entry's
//! lowercased name or reading contain one another, in either direction.
//! Persistence-time resolution uses exact matching (see `resolver`).

use crate::models::CatalogEntry;

/// Maximum number of suggestions returned
pub const MAX_CANDIDATES: usize = 8;

/// Entries related to `query`, in catalog order, at most [`MAX_CANDIDATES`].
///
/// An empty query is the "nothing typed yet" state and yields nothing.
pub fn find_candidates<'a>(query: &str, catalog: &'a [CatalogEntry]) -> Vec<&'a CatalogEntry> {
    if query.is_empty() {
        return Vec::new();
    }
    let term = query.to_lowercase();

    catalog
        .iter()
        .filter(|entry| is_related(&term, entry))
        .take(MAX_CANDIDATES)
        .collect()
}

/// Bidirectional containment on name, then on reading
fn is_related(term: &str, entry: &CatalogEntry) -> bool {
    let name = entry.name.to_lowercase();
    if contains_either_way(term, &name) {
        return true;
    }
    match entry.kana.as_deref() {
        Some(kana) if !kana.is_empty() => contains_either_way(term, &kana.to_lowercase()),
        _ => false,
    }
}

fn contains_either_way(term: &str, field: &str) -> bool {
    // An empty field is a substring of everything; never treat it as a match.
    !field.is_empty() && (field.contains(term) || term.contains(field))
}

/// Name form the server uses to detect duplicates
pub fn normalized_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Entry whose name equals `name` once both are normalized
pub fn same_name<'a>(name: &str, catalog: &'a [CatalogEntry]) -> Option<&'a CatalogEntry> {
    let wanted = normalized_name(name);
    catalog.iter().find(|e| normalized_name(&e.name) == wanted)
}
