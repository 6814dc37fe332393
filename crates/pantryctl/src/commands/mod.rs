//! Command handlers
//!
//! Each handler works against a [`Context`] built once in `main`: the API,
//! the prompter, the shared snapshot store and the loaded config.

pub mod catalog;
pub mod inventory;
pub mod location;
pub mod photo;
pub mod recipe;

use crate::cli::Commands;
use crate::resize::JpegResizer;
use pantry_common::api::PantryApi;
use pantry_common::config::PantryConfig;
use pantry_common::photos::PhotoManager;
use pantry_common::prompt::Prompter;
use pantry_common::store::{PantryStore, Scope, SnapshotListener};
use std::sync::Arc;
use tracing::debug;

/// Logs every snapshot replacement
pub struct SnapshotLogger;

impl SnapshotListener for SnapshotLogger {
    fn snapshot_replaced(&self, scope: Scope, store: &PantryStore) {
        let count = match scope {
            Scope::Catalog => store.catalog().len(),
            Scope::Inventory => store.inventory().len(),
            Scope::Locations => store.locations().len(),
            Scope::Photos => store.photos().len(),
        };
        debug!("{} snapshot replaced ({} rows)", scope.as_str(), count);
    }
}

pub struct Context {
    pub api: Arc<dyn PantryApi>,
    pub prompter: Arc<dyn Prompter>,
    pub store: PantryStore,
    pub config: PantryConfig,
}

impl Context {
    pub fn new(api: Arc<dyn PantryApi>, prompter: Arc<dyn Prompter>, config: PantryConfig) -> Self {
        let mut store = PantryStore::new();
        store.subscribe(Arc::new(SnapshotLogger));
        Self {
            api,
            prompter,
            store,
            config,
        }
    }

    pub fn default_location(&self) -> &str {
        &self.config.inventory.default_location
    }

    pub fn photo_manager(&self) -> PhotoManager {
        PhotoManager::new(
            Arc::clone(&self.api),
            Arc::clone(&self.prompter),
            Arc::new(JpegResizer),
            self.config.photos.clone(),
        )
    }
}

pub async fn run(ctx: &mut Context, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Catalog { action } => catalog::run(ctx, action).await,
        Commands::Inventory { action } => inventory::run(ctx, action).await,
        Commands::Location { action } => location::run(ctx, action).await,
        Commands::Photo { action } => photo::run(ctx, action).await,
        Commands::Recipe { action } => recipe::run(ctx, action).await,
    }
}
