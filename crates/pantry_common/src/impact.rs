//! Impact check before editing a catalog entry in place.
//!
//! A rename is shown in every recipe that references the entry, and a
//! unit change silently reinterprets stored quantities. Both need an
//! explicit yes before the write goes out. The rename check runs first.

use crate::api::PantryApi;
use crate::models::CatalogEntry;
use crate::prompt::{Confirmation, Prompter};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    RenameDeclined,
    UnitChangeDeclined,
    MergeDeclined,
    SuggestionDeclined,
}

impl AbortReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbortReason::RenameDeclined => "rename declined",
            AbortReason::UnitChangeDeclined => "unit change declined",
            AbortReason::MergeDeclined => "merge declined",
            AbortReason::SuggestionDeclined => "suggestion declined",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    Abort(AbortReason),
}

/// Ask about the consequences of turning `original` into `edited`.
///
/// Only meaningful for existing entries; new entries always proceed.
/// A failed usage lookup is treated as "no recipes" and does not block.
pub async fn check_edit(
    api: &dyn PantryApi,
    prompter: &dyn Prompter,
    original: &CatalogEntry,
    edited: &CatalogEntry,
) -> GateDecision {
    if original.is_new() {
        return GateDecision::Proceed;
    }

    if original.name != edited.name {
        let usage = match api.catalog_usage(original.id).await {
            Ok(usage) => usage,
            Err(e) => {
                warn!("Usage lookup for catalog entry {} failed: {}", original.id, e);
                Default::default()
            }
        };
        debug!(
            "Rename of {} affects {} recipe(s)",
            original.id, usage.recipe_count
        );

        if usage.recipe_count > 0 {
            let request = Confirmation::RenameImpact {
                old_name: original.name.clone(),
                new_name: edited.name.clone(),
                recipe_count: usage.recipe_count,
                sample: usage.sample(),
            };
            if !prompter.confirm(&request) {
                return GateDecision::Abort(AbortReason::RenameDeclined);
            }
        }
    }

    if original.default_unit != edited.default_unit {
        let request = Confirmation::UnitDrift {
            old_unit: original.default_unit.clone(),
            new_unit: edited.default_unit.clone(),
        };
        if !prompter.confirm(&request) {
            return GateDecision::Abort(AbortReason::UnitChangeDeclined);
        }
    }

    GateDecision::Proceed
}
