//! Recipe ingredient resolution and save.
//!
//! Rows are matched to the catalog by exact name, then by exact reading;
//! when several entries share the reading the oldest one wins, as on the
//! server. Fuzzy matching is never used here. A save with
//! unknown names moves to quick registration, and once the names are
//! registered the identical payload is sent one more time. A second
//! missing-ingredient answer is reported, not retried.

use crate::api::PantryApi;
use crate::error::{ApiError, PantryError, Result};
use crate::ingredient_parser::{distinct_names, parse_ingredients, render_ingredients, ParsedRow};
use crate::models::{CatalogEntry, Recipe, RecipeIngredient, RecipePayload};
use crate::prompt::Prompter;
use crate::quick_register::{PendingRegistration, RegistrationResult};
use crate::store::{PantryStore, Scope};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A parsed row and the catalog entry it names, if any
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRow {
    pub row: ParsedRow,
    pub catalog_id: Option<i64>,
}

/// Catalog id for a row name
pub fn resolve_name(name: &str, catalog: &[CatalogEntry]) -> Option<i64> {
    if let Some(entry) = catalog.iter().find(|e| e.name == name) {
        return Some(entry.id);
    }
    catalog
        .iter()
        .filter(|e| e.kana.as_deref() == Some(name))
        .min_by_key(|e| e.id)
        .map(|e| e.id)
}

pub fn resolve_rows(rows: Vec<ParsedRow>, catalog: &[CatalogEntry]) -> Vec<ResolvedRow> {
    rows.into_iter()
        .map(|row| ResolvedRow {
            catalog_id: resolve_name(&row.name, catalog),
            row,
        })
        .collect()
}

/// Unresolved names in first-appearance order
pub fn unresolved_names(resolved: &[ResolvedRow]) -> Vec<String> {
    let rows: Vec<ParsedRow> = resolved
        .iter()
        .filter(|r| r.catalog_id.is_none())
        .map(|r| r.row.clone())
        .collect();
    distinct_names(&rows)
}

/// A recipe being written
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecipeDraft {
    /// `None` creates a new recipe
    pub id: Option<i64>,
    pub payload: RecipePayload,
}

impl RecipeDraft {
    pub fn new(payload: RecipePayload) -> Self {
        Self { id: None, payload }
    }

    /// Draft for editing a stored recipe, with its ingredient text rebuilt
    /// from the resolved rows
    pub fn from_existing(recipe: &Recipe, rows: &[RecipeIngredient]) -> Self {
        Self {
            id: Some(recipe.id),
            payload: RecipePayload {
                name: recipe.name.clone(),
                yield_text: recipe.yield_text.clone(),
                url: recipe.url.clone(),
                process: recipe.process.clone(),
                csv_data: render_ingredients(rows),
            },
        }
    }

    fn validate(&self) -> Result<Vec<ParsedRow>> {
        if self.payload.name.trim().is_empty() {
            return Err(PantryError::Validation("Recipe name is required".to_string()));
        }
        if self.payload.csv_data.trim().is_empty() {
            return Err(PantryError::Validation("Ingredients are required".to_string()));
        }
        let rows = parse_ingredients(&self.payload.csv_data);
        if rows.is_empty() {
            return Err(PantryError::Validation(
                "Ingredients contain no named rows".to_string(),
            ));
        }
        Ok(rows)
    }
}

/// States a recipe save passes through
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeSaveState {
    Submitting,
    PendingRegistration(Vec<String>),
    Retrying,
    Saved,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeSaveOutcome {
    /// `registered` lists names created on the way
    Saved { registered: Vec<String> },
    /// The user cancelled registration; the recipe was not saved
    RegistrationCancelled { missing: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeSaveReport {
    pub outcome: RecipeSaveOutcome,
    pub trail: Vec<RecipeSaveState>,
}

pub struct RecipeSaver {
    api: Arc<dyn PantryApi>,
    prompter: Arc<dyn Prompter>,
}

impl RecipeSaver {
    pub fn new(api: Arc<dyn PantryApi>, prompter: Arc<dyn Prompter>) -> Self {
        Self { api, prompter }
    }

    /// Resolve the draft's rows against the current catalog without saving
    pub async fn check(&self, store: &mut PantryStore, draft: &RecipeDraft) -> Result<Vec<ResolvedRow>> {
        let rows = draft.validate()?;
        store.ensure_fresh(self.api.as_ref(), Scope::Catalog).await?;
        Ok(resolve_rows(rows, store.catalog()))
    }

    /// Submit the draft; when the server names unknown ingredients, register
    /// them (one classification prompt per name) and resend the identical
    /// payload once. A second missing response is `StillMissing`.
    pub async fn save(&self, store: &mut PantryStore, draft: &RecipeDraft) -> Result<RecipeSaveReport> {
        draft.validate()?;
        let mut trail = vec![RecipeSaveState::Submitting];

        let missing = match self.submit(draft).await {
            Ok(()) => {
                trail.push(RecipeSaveState::Saved);
                return Ok(RecipeSaveReport {
                    outcome: RecipeSaveOutcome::Saved { registered: vec![] },
                    trail,
                });
            }
            Err(ApiError::MissingIngredients(names)) => names,
            Err(e) => return Err(e.into()),
        };
        debug!("Server reported missing ingredients: {:?}", missing);

        trail.push(RecipeSaveState::PendingRegistration(missing.clone()));
        store.refresh(self.api.as_ref(), Scope::Catalog).await?;
        let pending = PendingRegistration::new(missing.clone());
        let registered = match pending
            .register(self.api.as_ref(), self.prompter.as_ref(), store.catalog())
            .await?
        {
            RegistrationResult::Registered(names) => names,
            RegistrationResult::Cancelled => {
                trail.push(RecipeSaveState::Cancelled);
                return Ok(RecipeSaveReport {
                    outcome: RecipeSaveOutcome::RegistrationCancelled { missing },
                    trail,
                });
            }
        };
        store.refresh_after_write(self.api.as_ref(), Scope::Catalog).await;

        trail.push(RecipeSaveState::Retrying);
        match self.submit(draft).await {
            Ok(()) => {
                trail.push(RecipeSaveState::Saved);
                Ok(RecipeSaveReport {
                    outcome: RecipeSaveOutcome::Saved { registered },
                    trail,
                })
            }
            Err(ApiError::MissingIngredients(names)) => {
                warn!("Still missing after registration: {:?}", names);
                Err(PantryError::StillMissing(names))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn submit(&self, draft: &RecipeDraft) -> std::result::Result<(), ApiError> {
        self.api.save_recipe(draft.id, &draft.payload).await?;
        info!("Saved recipe '{}'", draft.payload.name);
        Ok(())
    }
}
