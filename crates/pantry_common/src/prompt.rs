//! User confirmation seam.
//!
//! Flows never talk to a terminal directly. They describe what needs
//! confirming with a [`Confirmation`] and ask a [`Prompter`]. The CLI
//! implements it on stdin; tests use [`ScriptedPrompter`].

use crate::models::Classification;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Everything a flow may ask the user to confirm
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    /// Renaming an entry that recipes reference
    RenameImpact {
        old_name: String,
        new_name: String,
        recipe_count: u32,
        sample: String,
    },
    /// Changing the default unit reinterprets stored quantities
    UnitDrift { old_unit: String, new_unit: String },
    /// Server-detected duplicate; message shown verbatim
    Merge { message: String },
    /// Copy a suggested entry into the draft
    ApplySuggestion { name: String },
    DeleteCatalogEntry { name: String },
    AddToInventory { name: String, location: String },
    AddAllToInventory { names: Vec<String>, location: String },
    ConsumeItem { name: String },
    DeleteLocation { name: String },
    DeletePhoto { image_path: String },
}

impl Confirmation {
    /// Short stable name, used in logs and test assertions
    pub fn kind(&self) -> &'static str {
        match self {
            Confirmation::RenameImpact { .. } => "rename_impact",
            Confirmation::UnitDrift { .. } => "unit_drift",
            Confirmation::Merge { .. } => "merge",
            Confirmation::ApplySuggestion { .. } => "apply_suggestion",
            Confirmation::DeleteCatalogEntry { .. } => "delete_catalog_entry",
            Confirmation::AddToInventory { .. } => "add_to_inventory",
            Confirmation::AddAllToInventory { .. } => "add_all_to_inventory",
            Confirmation::ConsumeItem { .. } => "consume_item",
            Confirmation::DeleteLocation { .. } => "delete_location",
            Confirmation::DeletePhoto { .. } => "delete_photo",
        }
    }

    /// Text shown to the user
    pub fn message(&self) -> String {
        match self {
            Confirmation::RenameImpact {
                old_name,
                new_name,
                recipe_count,
                sample,
            } => format!(
                "\"{}\" is used by {} recipe(s) ({}).\nRenaming it to \"{}\" changes how it is shown in all of them.\nRename anyway?",
                old_name, recipe_count, sample, new_name
            ),
            Confirmation::UnitDrift { old_unit, new_unit } => {
                let old = if old_unit.is_empty() {
                    "no unit".to_string()
                } else {
                    format!("unit \"{}\"", old_unit)
                };
                let new = if new_unit.is_empty() {
                    "no unit".to_string()
                } else {
                    format!("\"{}\"", new_unit)
                };
                format!(
                    "The default unit changes from {} to {}.\nExisting stock amounts keep their numbers but will be read in the new unit.\nChange the unit?",
                    old, new
                )
            }
            Confirmation::Merge { message } => message.clone(),
            Confirmation::ApplySuggestion { name } => {
                format!("Copy the details of \"{}\" into this entry?", name)
            }
            Confirmation::DeleteCatalogEntry { name } => {
                format!("Delete \"{}\" from the catalog?", name)
            }
            Confirmation::AddToInventory { name, location } => {
                format!("Add \"{}\" to inventory ({})?", name, location)
            }
            Confirmation::AddAllToInventory { names, location } => format!(
                "Add {} missing item(s) to inventory ({})?\n  {}",
                names.len(),
                location,
                names.join(", ")
            ),
            Confirmation::ConsumeItem { name } => format!("Mark \"{}\" as used up?", name),
            Confirmation::DeleteLocation { name } => format!("Delete location \"{}\"?", name),
            Confirmation::DeletePhoto { image_path } => format!("Delete photo {}?", image_path),
        }
    }
}

pub trait Prompter: Send + Sync {
    /// True only on an explicit yes
    fn confirm(&self, request: &Confirmation) -> bool;

    /// Classification for a name about to be registered.
    /// `None` cancels the whole registration.
    fn choose_classification(&self, name: &str, suggested: Classification) -> Option<Classification>;
}

/// Answers yes to everything and takes suggested classifications
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&self, request: &Confirmation) -> bool {
        tracing::debug!("Auto-confirming {}", request.kind());
        true
    }

    fn choose_classification(&self, _name: &str, suggested: Classification) -> Option<Classification> {
        Some(suggested)
    }
}

/// Prompter driven by queued answers, recording every question.
///
/// An exhausted confirmation queue answers no; an exhausted
/// classification queue takes the suggestion.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<bool>>,
    classifications: Mutex<VecDeque<Option<Classification>>>,
    asked: Mutex<Vec<Confirmation>>,
    classified: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering(answers: &[bool]) -> Self {
        let prompter = Self::new();
        for answer in answers {
            prompter.push_answer(*answer);
        }
        prompter
    }

    pub fn push_answer(&self, answer: bool) {
        lock(&self.answers).push_back(answer);
    }

    /// `None` cancels at that row
    pub fn push_classification(&self, choice: Option<Classification>) {
        lock(&self.classifications).push_back(choice);
    }

    pub fn asked(&self) -> Vec<Confirmation> {
        lock(&self.asked).clone()
    }

    pub fn asked_kinds(&self) -> Vec<&'static str> {
        lock(&self.asked).iter().map(|c| c.kind()).collect()
    }

    /// Names offered for classification, in order
    pub fn classified(&self) -> Vec<String> {
        lock(&self.classified).clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, request: &Confirmation) -> bool {
        lock(&self.asked).push(request.clone());
        lock(&self.answers).pop_front().unwrap_or(false)
    }

    fn choose_classification(&self, name: &str, suggested: Classification) -> Option<Classification> {
        lock(&self.classified).push(name.to_string());
        lock(&self.classifications)
            .pop_front()
            .unwrap_or(Some(suggested))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
