//! Pantry Common - client engine for the pantry server
//!
//! Catalog reconciliation, recipe ingredient resolution, missing-ingredient
//! registration and stock cross-referencing, written against the
//! [`PantryApi`] seam so the same flows run over HTTP or in memory.

pub mod api;
pub mod catalog_view;
pub mod config;
pub mod cross_ref;
pub mod error;
pub mod fake_api;
pub mod impact;
pub mod ingredient_parser;
pub mod inventory;
pub mod locations;
pub mod matcher;
pub mod models;
pub mod photos;
pub mod prompt;
pub mod quick_register;
pub mod reconcile;
pub mod resolver;
pub mod store;

pub use api::{ApiResult, PantryApi, RecipeFilter};
pub use config::PantryConfig;
pub use error::{ApiError, PantryError, Result};
pub use models::*;
pub use prompt::{AssumeYes, Confirmation, Prompter, ScriptedPrompter};
pub use store::{PantryStore, Scope, SnapshotListener};
