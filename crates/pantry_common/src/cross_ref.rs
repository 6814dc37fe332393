//! Recipe rows against current stock.
//!
//! A row is in stock when its catalog entry has at least one inventory
//! row, whatever the amount. Missing rows can be added to inventory one at
//! a time or all at once. Bulk adds run concurrently and report what
//! happened to each item; nothing is rolled back when some fail.

use crate::api::PantryApi;
use crate::error::{ApiError, PantryError, Result};
use crate::inventory::resolve_location;
use crate::models::{Amount, InventoryItem, NewInventoryItem, RecipeIngredient};
use crate::prompt::{Confirmation, Prompter};
use crate::store::{PantryStore, Scope};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

pub fn is_in_stock(catalog_id: Option<i64>, inventory: &[InventoryItem]) -> bool {
    match catalog_id {
        Some(id) => inventory.iter().any(|i| i.catalog_id == id),
        None => false,
    }
}

/// Recompute `in_stock` from the local inventory snapshot
pub fn annotate(rows: &mut [RecipeIngredient], inventory: &[InventoryItem]) {
    for row in rows.iter_mut() {
        row.in_stock = is_in_stock(row.catalog_id, inventory);
    }
}

/// Rows not in stock, one per catalog entry, in row order
pub fn missing_rows(rows: &[RecipeIngredient]) -> Vec<&RecipeIngredient> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|r| !r.in_stock)
        .filter(|r| match r.catalog_id {
            Some(id) => seen.insert(id),
            None => true,
        })
        .collect()
}

/// Contiguous run of rows sharing a group name
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientGroup<'a> {
    pub name: &'a str,
    pub rows: Vec<&'a RecipeIngredient>,
}

pub fn group_runs(rows: &[RecipeIngredient]) -> Vec<IngredientGroup<'_>> {
    let mut groups: Vec<IngredientGroup<'_>> = Vec::new();
    for row in rows {
        match groups.last_mut() {
            Some(group) if group.name == row.group_name => group.rows.push(row),
            _ => groups.push(IngredientGroup {
                name: &row.group_name,
                rows: vec![row],
            }),
        }
    }
    groups
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added(InventoryItem),
    AlreadyInStock,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BulkAddReport {
    pub added: Vec<String>,
    pub failed: Vec<(String, ApiError)>,
    pub declined: bool,
}

impl BulkAddReport {
    pub fn is_complete(&self) -> bool {
        !self.declined && self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.added.len() + self.failed.len()
    }
}

pub struct StockCoordinator {
    api: Arc<dyn PantryApi>,
    prompter: Arc<dyn Prompter>,
    default_location: String,
}

impl StockCoordinator {
    pub fn new(api: Arc<dyn PantryApi>, prompter: Arc<dyn Prompter>, default_location: &str) -> Self {
        Self {
            api,
            prompter,
            default_location: default_location.to_string(),
        }
    }

    /// Rows of a recipe with stock recomputed from the current inventory
    pub async fn recipe_rows(&self, store: &mut PantryStore, recipe_id: i64) -> Result<Vec<RecipeIngredient>> {
        let mut rows = self.api.recipe_ingredients(recipe_id).await?;
        store.ensure_fresh(self.api.as_ref(), Scope::Inventory).await?;
        annotate(&mut rows, store.inventory());
        Ok(rows)
    }

    fn stock_entry(&self, catalog_id: i64, location: &str) -> NewInventoryItem {
        NewInventoryItem {
            catalog_id,
            amount: Amount::Untracked,
            unit: String::new(),
            expiration_date: None,
            location: location.to_string(),
            image_path: None,
        }
    }

    async fn target_location(&self, store: &mut PantryStore) -> String {
        if let Err(e) = store.ensure_fresh(self.api.as_ref(), Scope::Locations).await {
            warn!("Locations unavailable, using default: {}", e);
        }
        resolve_location(None, store.locations(), &self.default_location)
    }

    /// Add one row's catalog entry to inventory as untracked stock
    pub async fn add_one(&self, store: &mut PantryStore, row: &RecipeIngredient) -> Result<AddOutcome> {
        let catalog_id = row.catalog_id.ok_or_else(|| {
            PantryError::Validation(format!("\"{}\" is not in the catalog", row.name))
        })?;

        store.ensure_fresh(self.api.as_ref(), Scope::Inventory).await?;
        if is_in_stock(Some(catalog_id), store.inventory()) {
            return Ok(AddOutcome::AlreadyInStock);
        }

        let location = self.target_location(store).await;
        let request = Confirmation::AddToInventory {
            name: row.name.clone(),
            location: location.clone(),
        };
        if !self.prompter.confirm(&request) {
            return Ok(AddOutcome::Declined);
        }

        let item = self
            .api
            .add_inventory_item(&self.stock_entry(catalog_id, &location))
            .await?;
        info!("Added '{}' to {}", row.name, location);
        store.refresh_after_write(self.api.as_ref(), Scope::Inventory).await;
        Ok(AddOutcome::Added(item))
    }

    /// Add every missing row at once.
    ///
    /// Requests run concurrently. The report lists each success and
    /// failure; the inventory is reloaded either way.
    pub async fn add_all_missing(&self, store: &mut PantryStore, rows: &[RecipeIngredient]) -> Result<BulkAddReport> {
        store.ensure_fresh(self.api.as_ref(), Scope::Inventory).await?;
        let mut rows = rows.to_vec();
        annotate(&mut rows, store.inventory());

        let targets: Vec<(String, i64)> = missing_rows(&rows)
            .into_iter()
            .filter_map(|r| r.catalog_id.map(|id| (r.name.clone(), id)))
            .collect();
        if targets.is_empty() {
            return Ok(BulkAddReport::default());
        }

        let location = self.target_location(store).await;
        let request = Confirmation::AddAllToInventory {
            names: targets.iter().map(|(name, _)| name.clone()).collect(),
            location: location.clone(),
        };
        if !self.prompter.confirm(&request) {
            return Ok(BulkAddReport {
                declined: true,
                ..Default::default()
            });
        }

        let mut set = JoinSet::new();
        for (index, (name, catalog_id)) in targets.iter().enumerate() {
            let api = Arc::clone(&self.api);
            let item = self.stock_entry(*catalog_id, &location);
            let name = name.clone();
            set.spawn(async move {
                let result = api.add_inventory_item(&item).await;
                (index, name, result)
            });
        }

        let mut results = Vec::with_capacity(targets.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => warn!("Inventory add task failed to complete: {}", e),
            }
        }
        results.sort_by_key(|(index, _, _)| *index);

        let mut report = BulkAddReport::default();
        let finished: HashSet<usize> = results.iter().map(|(index, _, _)| *index).collect();
        for (_, name, result) in results {
            match result {
                Ok(_) => report.added.push(name),
                Err(e) => {
                    warn!("Adding '{}' to inventory failed: {}", name, e);
                    report.failed.push((name, e));
                }
            }
        }
        for (index, (name, _)) in targets.iter().enumerate() {
            if !finished.contains(&index) {
                report
                    .failed
                    .push((name.clone(), ApiError::Transport("request did not complete".into())));
            }
        }

        info!(
            "Bulk add: {} added, {} failed",
            report.added.len(),
            report.failed.len()
        );
        store.refresh_after_write(self.api.as_ref(), Scope::Inventory).await;
        Ok(report)
    }
}
