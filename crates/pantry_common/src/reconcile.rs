//! Catalog reconciliation.
//!
//! Create and update go out as plain writes. When the server reports that
//! the name collides with another entry, the user sees the server's message
//! and may resend the identical payload with `force_merge` set, which folds
//! this entry into the existing one and repoints everything that referenced
//! it. At most one forced resend happens per save.
//!
//! ```text
//! Editing -> Submitting -> Saved
//!                       -> Conflict -> ForceSubmitting -> ForceSaved
//!                                   -> Aborted
//! ```

use crate::api::PantryApi;
use crate::error::{ApiError, PantryError, Result};
use crate::impact::{check_edit, AbortReason, GateDecision};
use crate::matcher::find_candidates;
use crate::models::{CatalogEntry, CatalogWrite, ImportReport};
use crate::prompt::{Confirmation, Prompter};
use crate::store::{PantryStore, Scope};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Editing buffer for one catalog entry
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogDraft {
    /// The entry as last loaded; `None` when creating
    pub original: Option<CatalogEntry>,
    pub edited: CatalogEntry,
}

impl CatalogDraft {
    pub fn create(entry: CatalogEntry) -> Self {
        let mut edited = entry;
        edited.id = 0;
        Self {
            original: None,
            edited,
        }
    }

    pub fn edit(original: CatalogEntry) -> Self {
        Self {
            edited: original.clone(),
            original: Some(original),
        }
    }

    pub fn is_update(&self) -> bool {
        self.original.as_ref().map(|o| !o.is_new()).unwrap_or(false)
    }

    /// Copy every field except the id from a suggested entry
    pub fn apply(&mut self, suggestion: &CatalogEntry) {
        let id = self.edited.id;
        self.edited = suggestion.clone();
        self.edited.id = id;
    }

    fn validate(&self) -> Result<()> {
        if self.edited.name.trim().is_empty() {
            return Err(PantryError::Validation("Name is required".to_string()));
        }
        Ok(())
    }
}

/// States a single save attempt passes through
#[derive(Debug, Clone, PartialEq)]
pub enum SaveState {
    Editing,
    Submitting,
    Conflict { message: String },
    ForceSubmitting,
    Saved,
    ForceSaved,
    Aborted(AbortReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Folded into an existing entry after confirmation
    ForceSaved,
    /// The user declined; nothing further was written
    Aborted(AbortReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub outcome: SaveOutcome,
    /// Every state visited, starting with `Editing`
    pub trail: Vec<SaveState>,
}

struct Attempt {
    trail: Vec<SaveState>,
}

impl Attempt {
    fn start() -> Self {
        Self {
            trail: vec![SaveState::Editing],
        }
    }

    fn enter(&mut self, state: SaveState) {
        debug!("Catalog save: {:?}", state);
        self.trail.push(state);
    }

    fn finish(mut self, outcome: SaveOutcome) -> SaveReport {
        let last = match outcome {
            SaveOutcome::Saved => SaveState::Saved,
            SaveOutcome::ForceSaved => SaveState::ForceSaved,
            SaveOutcome::Aborted(reason) => SaveState::Aborted(reason),
        };
        self.enter(last);
        SaveReport {
            outcome,
            trail: self.trail,
        }
    }
}

pub struct CatalogController {
    api: Arc<dyn PantryApi>,
    prompter: Arc<dyn Prompter>,
}

impl CatalogController {
    pub fn new(api: Arc<dyn PantryApi>, prompter: Arc<dyn Prompter>) -> Self {
        Self { api, prompter }
    }

    /// Save a draft, walking the impact check and merge flow.
    ///
    /// Declining any prompt ends in `Aborted` with nothing written after
    /// the decline. A transport failure or rejection ends the attempt with
    /// an error and the draft untouched.
    pub async fn save(&self, store: &mut PantryStore, draft: &CatalogDraft) -> Result<SaveReport> {
        draft.validate()?;
        let mut attempt = Attempt::start();

        if let Some(original) = draft.original.as_ref() {
            let decision =
                check_edit(self.api.as_ref(), self.prompter.as_ref(), original, &draft.edited).await;
            if let GateDecision::Abort(reason) = decision {
                info!("Catalog save of '{}' aborted: {}", draft.edited.name, reason.as_str());
                return Ok(attempt.finish(SaveOutcome::Aborted(reason)));
            }
        }

        attempt.enter(SaveState::Submitting);
        let first = if draft.is_update() {
            let write = CatalogWrite {
                entry: draft.edited.clone(),
                force_merge: false,
            };
            self.api.update_catalog_entry(&write).await
        } else {
            self.api.create_catalog_entry(&draft.edited).await
        };

        let message = match first {
            Ok(()) => {
                info!("Saved catalog entry '{}'", draft.edited.name);
                store.refresh_after_write(self.api.as_ref(), Scope::Catalog).await;
                return Ok(attempt.finish(SaveOutcome::Saved));
            }
            Err(ApiError::MergeConfirmationRequired { message, .. }) => message,
            Err(e) => return Err(e.into()),
        };

        attempt.enter(SaveState::Conflict {
            message: message.clone(),
        });
        if !self.prompter.confirm(&Confirmation::Merge { message }) {
            info!("Merge of '{}' declined", draft.edited.name);
            return Ok(attempt.finish(SaveOutcome::Aborted(AbortReason::MergeDeclined)));
        }

        attempt.enter(SaveState::ForceSubmitting);
        let write = CatalogWrite {
            entry: draft.edited.clone(),
            force_merge: true,
        };
        match self.api.update_catalog_entry(&write).await {
            Ok(()) => {
                info!("Merged catalog entry '{}'", draft.edited.name);
                // Merging repoints stock rows too
                store.refresh_after_write(self.api.as_ref(), Scope::Catalog).await;
                store.refresh_after_write(self.api.as_ref(), Scope::Inventory).await;
                Ok(attempt.finish(SaveOutcome::ForceSaved))
            }
            Err(e) => {
                warn!("Forced merge of '{}' failed: {}", draft.edited.name, e);
                Err(e.into())
            }
        }
    }

    /// Suggestions for the name being typed
    pub fn suggest<'a>(&self, store: &'a PantryStore, query: &str) -> Vec<&'a CatalogEntry> {
        find_candidates(query, store.catalog())
    }

    /// Copy a suggestion into the draft after confirmation
    pub fn apply_suggestion(&self, draft: &mut CatalogDraft, suggestion: &CatalogEntry) -> GateDecision {
        let request = Confirmation::ApplySuggestion {
            name: suggestion.name.clone(),
        };
        if !self.prompter.confirm(&request) {
            return GateDecision::Abort(AbortReason::SuggestionDeclined);
        }
        draft.apply(suggestion);
        GateDecision::Proceed
    }

    /// Returns false when the user declined
    pub async fn delete(&self, store: &mut PantryStore, id: i64) -> Result<bool> {
        store.ensure_fresh(self.api.as_ref(), Scope::Catalog).await?;
        let name = store
            .catalog_entry(id)
            .map(|e| e.name.clone())
            .ok_or_else(|| PantryError::NotFound(format!("catalog entry {}", id)))?;

        if !self.prompter.confirm(&Confirmation::DeleteCatalogEntry { name: name.clone() }) {
            return Ok(false);
        }
        self.api.delete_catalog_entry(id).await?;
        info!("Deleted catalog entry '{}'", name);
        store.refresh_after_write(self.api.as_ref(), Scope::Catalog).await;
        Ok(true)
    }

    pub async fn import_csv(&self, store: &mut PantryStore, text: &str) -> Result<ImportReport> {
        let body = text.strip_prefix('\u{feff}').unwrap_or(text);
        if body.trim().is_empty() {
            return Err(PantryError::Validation("Import file is empty".to_string()));
        }
        let report = self.api.import_catalog_csv(body).await?;
        info!(
            "Catalog import: {} added, {} skipped, {} errors",
            report.added,
            report.skipped,
            report.errors.len()
        );
        store.refresh_after_write(self.api.as_ref(), Scope::Catalog).await;
        Ok(report)
    }

    pub async fn export_csv(&self) -> Result<String> {
        Ok(self.api.export_catalog_csv().await?)
    }
}
