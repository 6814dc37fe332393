//! Quick registration of ingredient names the catalog does not know.
//!
//! Each name gets an explicit classification from the user, then all of
//! them are created in one bulk request with placeholder details: a
//! seasoning has no category or unit, anything else is filed under
//! `other` with `piece` as its unit. The details can be fixed later in the
//! catalog editor.
//!
//! A name that differs from an existing entry only by case or padding is
//! refused before anything is asked.

use crate::api::PantryApi;
use crate::error::{PantryError, Result};
use crate::matcher::same_name;
use crate::models::{CatalogEntry, Category, Classification};
use crate::prompt::Prompter;
use tracing::info;

pub const PLACEHOLDER_UNIT: &str = "piece";

/// Names waiting for registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRegistration {
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationResult {
    Registered(Vec<String>),
    Cancelled,
}

/// Catalog entry created for a name registered in a hurry
pub fn placeholder_entry(name: &str, classification: Classification) -> CatalogEntry {
    let (category, default_unit) = match classification {
        Classification::Seasoning => (None, String::new()),
        Classification::Ingredient => (Some(Category::Other), PLACEHOLDER_UNIT.to_string()),
    };
    CatalogEntry {
        id: 0,
        name: name.to_string(),
        kana: None,
        classification,
        category,
        default_unit,
    }
}

impl PendingRegistration {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Collect a classification per name, then bulk-create.
    ///
    /// `catalog` must be current. Names already present under another
    /// spelling fail validation. Cancelling any row registers nothing. A
    /// failed bulk request is returned as-is.
    pub async fn register(
        &self,
        api: &dyn PantryApi,
        prompter: &dyn Prompter,
        catalog: &[CatalogEntry],
    ) -> Result<RegistrationResult> {
        self.check_collisions(catalog)?;

        let mut entries = Vec::with_capacity(self.names.len());
        for name in &self.names {
            match prompter.choose_classification(name, Classification::Ingredient) {
                Some(classification) => entries.push(placeholder_entry(name, classification)),
                None => {
                    info!("Registration cancelled at '{}'", name);
                    return Ok(RegistrationResult::Cancelled);
                }
            }
        }

        api.create_catalog_entries(&entries).await?;
        info!("Registered {} new catalog entries", entries.len());
        Ok(RegistrationResult::Registered(self.names.clone()))
    }

    fn check_collisions(&self, catalog: &[CatalogEntry]) -> Result<()> {
        let clashes: Vec<String> = self
            .names
            .iter()
            .filter_map(|name| {
                same_name(name, catalog).map(|existing| {
                    format!("\"{}\" is already in the catalog as \"{}\" (id {})", name, existing.name, existing.id)
                })
            })
            .collect();
        if clashes.is_empty() {
            return Ok(());
        }
        Err(PantryError::Validation(format!(
            "{}; use the catalog spelling in the recipe",
            clashes.join("; ")
        )))
    }
}
