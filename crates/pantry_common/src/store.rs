//! In-memory snapshot store.
//!
//! Holds the last fetched catalog, inventory, locations and photos. The
//! only mutation is wholesale replacement with a fetch result; components
//! read through the accessors. A snapshot whose refresh failed is marked
//! stale and reloaded before the next dependent use.

use crate::api::PantryApi;
use crate::error::ApiError;
use crate::models::{CatalogEntry, FridgePhoto, InventoryItem, Location};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Part of the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Catalog,
    Inventory,
    Locations,
    Photos,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Catalog => "catalog",
            Scope::Inventory => "inventory",
            Scope::Locations => "locations",
            Scope::Photos => "photos",
        }
    }
}

/// Registered at composition time to hear about replaced snapshots
pub trait SnapshotListener: Send + Sync {
    fn snapshot_replaced(&self, scope: Scope, store: &PantryStore);
}

#[derive(Default)]
pub struct PantryStore {
    catalog: Vec<CatalogEntry>,
    inventory: Vec<InventoryItem>,
    locations: Vec<Location>,
    photos: Vec<FridgePhoto>,
    loaded: HashSet<Scope>,
    stale: HashSet<Scope>,
    listeners: Vec<Arc<dyn SnapshotListener>>,
}

impl PantryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Arc<dyn SnapshotListener>) {
        self.listeners.push(listener);
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    pub fn inventory(&self) -> &[InventoryItem] {
        &self.inventory
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn photos(&self) -> &[FridgePhoto] {
        &self.photos
    }

    pub fn catalog_entry(&self, id: i64) -> Option<&CatalogEntry> {
        self.catalog.iter().find(|e| e.id == id)
    }

    pub fn inventory_item(&self, id: i64) -> Option<&InventoryItem> {
        self.inventory.iter().find(|i| i.id == id)
    }

    /// Never loaded, or the last refresh after a write failed
    pub fn needs_refresh(&self, scope: Scope) -> bool {
        !self.loaded.contains(&scope) || self.stale.contains(&scope)
    }

    // ------------------------------------------------------------------
    // Replacement
    // ------------------------------------------------------------------

    pub fn replace_catalog(&mut self, entries: Vec<CatalogEntry>) {
        self.catalog = entries;
        self.replaced(Scope::Catalog);
    }

    pub fn replace_inventory(&mut self, items: Vec<InventoryItem>) {
        self.inventory = items;
        self.replaced(Scope::Inventory);
    }

    pub fn replace_locations(&mut self, mut locations: Vec<Location>) {
        locations.sort_by_key(|l| l.priority);
        self.locations = locations;
        self.replaced(Scope::Locations);
    }

    pub fn replace_photos(&mut self, photos: Vec<FridgePhoto>) {
        self.photos = photos;
        self.replaced(Scope::Photos);
    }

    pub fn mark_stale(&mut self, scope: Scope) {
        self.stale.insert(scope);
    }

    fn replaced(&mut self, scope: Scope) {
        self.loaded.insert(scope);
        self.stale.remove(&scope);
        debug!("Replaced {} snapshot", scope.as_str());

        let listeners = self.listeners.clone();
        for listener in listeners {
            listener.snapshot_replaced(scope, self);
        }
    }

    // ------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------

    /// Fetch and replace one part of the snapshot
    pub async fn refresh(&mut self, api: &dyn PantryApi, scope: Scope) -> Result<(), ApiError> {
        match scope {
            Scope::Catalog => {
                let entries = api.list_catalog().await?;
                self.replace_catalog(entries);
            }
            Scope::Inventory => {
                let items = api.list_inventory().await?;
                self.replace_inventory(items);
            }
            Scope::Locations => {
                let locations = api.list_locations().await?;
                self.replace_locations(locations);
            }
            Scope::Photos => {
                let photos = api.list_photos().await?;
                self.replace_photos(photos);
            }
        }
        Ok(())
    }

    /// Refresh only if never loaded or stale
    pub async fn ensure_fresh(&mut self, api: &dyn PantryApi, scope: Scope) -> Result<(), ApiError> {
        if self.needs_refresh(scope) {
            self.refresh(api, scope).await?;
        }
        Ok(())
    }

    /// Refresh after a successful write. The write already succeeded, so a
    /// failed reload is logged and the snapshot marked stale instead.
    pub async fn refresh_after_write(&mut self, api: &dyn PantryApi, scope: Scope) {
        if let Err(e) = self.refresh(api, scope).await {
            warn!("Failed to reload {} after write: {}", scope.as_str(), e);
            self.mark_stale(scope);
        }
    }
}
