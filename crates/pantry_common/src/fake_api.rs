//! In-memory pantry server for deterministic testing.
//!
//! Simulates the parts of the HTTP contract the flows depend on:
//! duplicate-name conflicts with force-merge repointing, missing-ingredient
//! detection on recipe save, usage counts, and referential delete guards.
//! Every call is recorded, and failures can be queued per endpoint.
//!
//! ```rust,ignore
//! let api = FakePantryApi::new();
//! let salt = api.seed_catalog("Salt", Classification::Seasoning, "");
//! api.fail_next(Endpoint::AddInventory, ApiError::Transport("reset".into()));
//! ```

use crate::api::{ApiResult, PantryApi, RecipeFilter};
use crate::error::ApiError;
use crate::ingredient_parser::{distinct_names, parse_ingredients, ParsedRow};
use crate::matcher::normalized_name;
use crate::resolver::resolve_name;
use crate::models::{
    Amount, CatalogEntry, CatalogWrite, Category, Classification, FridgePhoto, ImportReport,
    InventoryItem, InventoryUpdate, Location, NewInventoryItem, Recipe, RecipeIngredient,
    RecipePayload, UploadReceipt, UsageReport,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// Every operation of [`PantryApi`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListCatalog,
    CreateCatalog,
    BulkCreateCatalog,
    UpdateCatalog,
    DeleteCatalog,
    CatalogUsage,
    ImportCatalog,
    ExportCatalog,
    ListInventory,
    AddInventory,
    UpdateInventory,
    DeleteInventory,
    ListLocations,
    AddLocation,
    ReorderLocations,
    DeleteLocation,
    ListPhotos,
    Upload,
    AddPhoto,
    DeletePhoto,
    ListRecipes,
    SaveRecipe,
    RecipeIngredients,
}

impl Endpoint {
    /// Anything but a GET
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            Endpoint::ListCatalog
                | Endpoint::CatalogUsage
                | Endpoint::ExportCatalog
                | Endpoint::ListInventory
                | Endpoint::ListLocations
                | Endpoint::ListPhotos
                | Endpoint::ListRecipes
                | Endpoint::RecipeIngredients
        )
    }
}

/// One recorded request with its JSON body (or `null`)
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub endpoint: Endpoint,
    pub body: serde_json::Value,
}

#[derive(Debug, Clone)]
struct StoredRecipe {
    recipe: Recipe,
    payload: RecipePayload,
    rows: Vec<(ParsedRow, i64)>,
}

#[derive(Debug, Default)]
struct FakeState {
    catalog: Vec<CatalogEntry>,
    inventory: Vec<InventoryItem>,
    locations: Vec<Location>,
    photos: Vec<FridgePhoto>,
    recipes: Vec<StoredRecipe>,
    uploads: Vec<(String, usize)>,
    next_id: i64,
    calls: Vec<RecordedCall>,
    failures: HashMap<Endpoint, VecDeque<ApiError>>,
    /// Inventory adds for these catalog ids fail once
    failing_adds: HashMap<i64, ApiError>,
}

impl FakeState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&mut self, endpoint: Endpoint, body: serde_json::Value) -> ApiResult<()> {
        self.calls.push(RecordedCall { endpoint, body });
        match self.failures.get_mut(&endpoint).and_then(|q| q.pop_front()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn find_by_name(&self, name: &str, except_id: i64) -> Option<&CatalogEntry> {
        let wanted = normalized_name(name);
        self.catalog
            .iter()
            .find(|e| e.id != except_id && normalized_name(&e.name) == wanted)
    }

    /// Recipe-row resolution, same rule the client previews with
    fn resolve(&self, name: &str) -> Option<i64> {
        resolve_name(name, &self.catalog)
    }

    fn usage(&self, catalog_id: i64) -> UsageReport {
        let names: Vec<String> = self
            .recipes
            .iter()
            .filter(|r| r.rows.iter().any(|(_, id)| *id == catalog_id))
            .map(|r| r.recipe.name.clone())
            .collect();
        UsageReport {
            recipe_count: names.len() as u32,
            recipe_names: names.into_iter().take(3).collect(),
        }
    }

    fn in_stock(&self, catalog_id: i64) -> bool {
        self.inventory.iter().any(|i| i.catalog_id == catalog_id)
    }

    fn joined_inventory(&self) -> Vec<InventoryItem> {
        self.inventory
            .iter()
            .map(|item| {
                let mut item = item.clone();
                if let Some(entry) = self.catalog.iter().find(|e| e.id == item.catalog_id) {
                    item.name = entry.name.clone();
                    item.kana = entry.kana.clone();
                }
                item.recipe_count = self.usage(item.catalog_id).recipe_count;
                item
            })
            .collect()
    }

    fn summary(&self, stored: &StoredRecipe) -> Recipe {
        let mut recipe = stored.recipe.clone();
        let (mut all_ingredients, mut all_seasonings) = (true, true);
        for (_, id) in &stored.rows {
            let seasoning = self
                .catalog
                .iter()
                .find(|e| e.id == *id)
                .map(|e| e.classification == Classification::Seasoning)
                .unwrap_or(false);
            let stocked = self.in_stock(*id);
            if seasoning {
                all_seasonings &= stocked;
            } else {
                all_ingredients &= stocked;
            }
        }
        recipe.has_ingredients = all_ingredients;
        recipe.has_seasonings = all_seasonings;
        recipe
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

#[derive(Debug, Default)]
pub struct FakePantryApi {
    state: Mutex<FakeState>,
}

impl FakePantryApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ------------------------------------------------------------------
    // Seeding
    // ------------------------------------------------------------------

    pub fn seed_catalog(&self, name: &str, classification: Classification, unit: &str) -> i64 {
        let mut state = self.state();
        let id = state.next_id();
        let category = match classification {
            Classification::Ingredient => Some(Category::Other),
            Classification::Seasoning => None,
        };
        state.catalog.push(CatalogEntry {
            id,
            name: name.to_string(),
            kana: None,
            classification,
            category,
            default_unit: unit.to_string(),
        });
        id
    }

    pub fn seed_entry(&self, mut entry: CatalogEntry) -> i64 {
        let mut state = self.state();
        let id = state.next_id();
        entry.id = id;
        state.catalog.push(entry);
        id
    }

    pub fn seed_inventory(&self, catalog_id: i64, amount: Amount, location: &str) -> i64 {
        let mut state = self.state();
        let id = state.next_id();
        state.inventory.push(InventoryItem {
            id,
            catalog_id,
            amount,
            location: location.to_string(),
            ..Default::default()
        });
        id
    }

    pub fn seed_location(&self, name: &str) -> i64 {
        let mut state = self.state();
        let id = state.next_id();
        let priority = state.locations.len() as i64 + 1;
        state.locations.push(Location {
            id,
            name: name.to_string(),
            priority,
        });
        id
    }

    /// Store a recipe whose rows all resolve; unresolvable rows are dropped
    pub fn seed_recipe(&self, name: &str, csv_data: &str) -> i64 {
        let mut state = self.state();
        let id = state.next_id();
        let rows = parse_ingredients(csv_data)
            .into_iter()
            .filter_map(|row| state.resolve(&row.name).map(|cid| (row, cid)))
            .collect();
        state.recipes.push(StoredRecipe {
            recipe: Recipe {
                id,
                name: name.to_string(),
                ..Default::default()
            },
            payload: RecipePayload {
                name: name.to_string(),
                csv_data: csv_data.to_string(),
                ..Default::default()
            },
            rows,
        });
        id
    }

    // ------------------------------------------------------------------
    // Failure injection
    // ------------------------------------------------------------------

    /// The next call to `endpoint` fails with `error`
    pub fn fail_next(&self, endpoint: Endpoint, error: ApiError) {
        self.state()
            .failures
            .entry(endpoint)
            .or_default()
            .push_back(error);
    }

    /// The next inventory add for `catalog_id` fails with `error`
    pub fn fail_inventory_add_for(&self, catalog_id: i64, error: ApiError) {
        self.state().failing_adds.insert(catalog_id, error);
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    pub fn calls_to(&self, endpoint: Endpoint) -> Vec<RecordedCall> {
        self.state()
            .calls
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .cloned()
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.endpoint.is_write())
            .count()
    }

    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.state().catalog.clone()
    }

    pub fn catalog_by_name(&self, name: &str) -> Option<CatalogEntry> {
        self.state().catalog.iter().find(|e| e.name == name).cloned()
    }

    pub fn inventory(&self) -> Vec<InventoryItem> {
        self.state().joined_inventory()
    }

    pub fn locations(&self) -> Vec<Location> {
        let mut locations = self.state().locations.clone();
        locations.sort_by_key(|l| l.priority);
        locations
    }

    /// Catalog ids referenced by a recipe's rows, in row order
    pub fn recipe_catalog_ids(&self, recipe_id: i64) -> Vec<i64> {
        self.state()
            .recipes
            .iter()
            .find(|r| r.recipe.id == recipe_id)
            .map(|r| r.rows.iter().map(|(_, id)| *id).collect())
            .unwrap_or_default()
    }

    pub fn recipe_by_name(&self, name: &str) -> Option<(Recipe, RecipePayload)> {
        self.state()
            .recipes
            .iter()
            .find(|r| r.recipe.name == name)
            .map(|r| (r.recipe.clone(), r.payload.clone()))
    }

    pub fn uploads(&self) -> Vec<(String, usize)> {
        self.state().uploads.clone()
    }
}

#[async_trait]
impl PantryApi for FakePantryApi {
    async fn list_catalog(&self) -> ApiResult<Vec<CatalogEntry>> {
        let mut state = self.state();
        state.record(Endpoint::ListCatalog, serde_json::Value::Null)?;
        Ok(state.catalog.clone())
    }

    async fn create_catalog_entry(&self, entry: &CatalogEntry) -> ApiResult<()> {
        let mut state = self.state();
        state.record(Endpoint::CreateCatalog, to_json(entry))?;
        if entry.name.trim().is_empty() {
            return Err(ApiError::rejected(400, "name required"));
        }
        if let Some(existing) = state.find_by_name(&entry.name, 0) {
            return Err(ApiError::MergeConfirmationRequired {
                message: format!("\"{}\" already exists. Merge into it?", existing.name),
                target_id: Some(existing.id),
            });
        }
        let mut created = entry.clone();
        created.id = state.next_id();
        state.catalog.push(created);
        Ok(())
    }

    async fn create_catalog_entries(&self, entries: &[CatalogEntry]) -> ApiResult<()> {
        let mut state = self.state();
        state.record(Endpoint::BulkCreateCatalog, to_json(&entries))?;
        let mut batch = HashSet::new();
        for entry in entries {
            if entry.name.trim().is_empty() {
                return Err(ApiError::rejected(400, "name required"));
            }
            if let Some(existing) = state.find_by_name(&entry.name, 0) {
                return Err(ApiError::rejected(
                    409,
                    format!("\"{}\" already exists as \"{}\"", entry.name, existing.name),
                ));
            }
            if !batch.insert(normalized_name(&entry.name)) {
                return Err(ApiError::rejected(409, format!("\"{}\" is listed twice", entry.name)));
            }
        }
        for entry in entries {
            let mut created = entry.clone();
            created.id = state.next_id();
            state.catalog.push(created);
        }
        Ok(())
    }

    async fn update_catalog_entry(&self, write: &CatalogWrite) -> ApiResult<()> {
        let mut state = self.state();
        state.record(Endpoint::UpdateCatalog, to_json(write))?;
        let id = write.entry.id;
        let target = state.find_by_name(&write.entry.name, id).map(|e| e.id);
        match target {
            Some(target_id) if !write.force_merge => Err(ApiError::MergeConfirmationRequired {
                message: format!("\"{}\" already exists. Merge into it?", write.entry.name),
                target_id: Some(target_id),
            }),
            Some(target_id) => {
                for item in state.inventory.iter_mut().filter(|i| i.catalog_id == id) {
                    item.catalog_id = target_id;
                }
                for recipe in state.recipes.iter_mut() {
                    for (_, cid) in recipe.rows.iter_mut().filter(|(_, cid)| *cid == id) {
                        *cid = target_id;
                    }
                }
                state.catalog.retain(|e| e.id != id);
                Ok(())
            }
            None => match state.catalog.iter_mut().find(|e| e.id == id) {
                Some(slot) => {
                    *slot = write.entry.clone();
                    Ok(())
                }
                None => Err(ApiError::rejected(404, format!("catalog entry {} not found", id))),
            },
        }
    }

    async fn delete_catalog_entry(&self, id: i64) -> ApiResult<()> {
        let mut state = self.state();
        state.record(Endpoint::DeleteCatalog, serde_json::json!({ "id": id }))?;
        if state.usage(id).recipe_count > 0 {
            return Err(ApiError::rejected(409, "In use by recipes; cannot delete"));
        }
        if state.in_stock(id) {
            return Err(ApiError::rejected(409, "In stock; cannot delete"));
        }
        state.catalog.retain(|e| e.id != id);
        Ok(())
    }

    async fn catalog_usage(&self, id: i64) -> ApiResult<UsageReport> {
        let mut state = self.state();
        state.record(Endpoint::CatalogUsage, serde_json::json!({ "id": id }))?;
        Ok(state.usage(id))
    }

    async fn import_catalog_csv(&self, csv: &str) -> ApiResult<ImportReport> {
        let mut state = self.state();
        state.record(Endpoint::ImportCatalog, serde_json::Value::String(csv.to_string()))?;
        let mut report = ImportReport::default();
        for (idx, line) in csv.lines().enumerate() {
            let cols: Vec<&str> = line.split(',').map(str::trim).collect();
            let name = cols.first().copied().unwrap_or_default();
            if name.is_empty() || (idx == 0 && name == "name") {
                continue;
            }
            if state.find_by_name(name, 0).is_some() {
                report.skipped += 1;
                continue;
            }
            let classification = match cols.get(1).copied().unwrap_or_default() {
                "" => Classification::Ingredient,
                raw => match raw.parse() {
                    Ok(c) => c,
                    Err(e) => {
                        report.errors.push(format!("line {}: {}", idx + 1, e));
                        continue;
                    }
                },
            };
            let category = cols.get(2).and_then(|c| Category::from_wire(c));
            let id = state.next_id();
            state.catalog.push(CatalogEntry {
                id,
                name: name.to_string(),
                classification,
                category,
                default_unit: cols.get(3).copied().unwrap_or_default().to_string(),
                kana: cols
                    .get(4)
                    .filter(|k| !k.is_empty())
                    .map(|k| k.to_string()),
            });
            report.added += 1;
        }
        Ok(report)
    }

    async fn export_catalog_csv(&self) -> ApiResult<String> {
        let mut state = self.state();
        state.record(Endpoint::ExportCatalog, serde_json::Value::Null)?;
        let mut out = String::from("name,classification,category,default_unit,kana\n");
        for e in &state.catalog {
            out.push_str(&format!(
                "{},{},{},{},{}\n",
                e.name,
                e.classification,
                e.category.as_ref().map(|c| c.as_str()).unwrap_or(""),
                e.default_unit,
                e.kana.as_deref().unwrap_or("")
            ));
        }
        Ok(out)
    }

    async fn list_inventory(&self) -> ApiResult<Vec<InventoryItem>> {
        let mut state = self.state();
        state.record(Endpoint::ListInventory, serde_json::Value::Null)?;
        Ok(state.joined_inventory())
    }

    async fn add_inventory_item(&self, item: &NewInventoryItem) -> ApiResult<InventoryItem> {
        let mut state = self.state();
        state.record(Endpoint::AddInventory, to_json(item))?;
        if let Some(err) = state.failing_adds.remove(&item.catalog_id) {
            return Err(err);
        }
        if !state.catalog.iter().any(|e| e.id == item.catalog_id) {
            return Err(ApiError::rejected(
                400,
                format!("unknown catalog_id {}", item.catalog_id),
            ));
        }
        let id = state.next_id();
        state.inventory.push(InventoryItem {
            id,
            catalog_id: item.catalog_id,
            amount: item.amount,
            unit: item.unit.clone(),
            expiration_date: item.expiration_date,
            location: item.location.clone(),
            image_path: item.image_path.clone(),
            ..Default::default()
        });
        state
            .joined_inventory()
            .into_iter()
            .find(|i| i.id == id)
            .ok_or_else(|| ApiError::Decode("inserted row vanished".into()))
    }

    async fn update_inventory_item(&self, update: &InventoryUpdate) -> ApiResult<()> {
        let mut state = self.state();
        state.record(Endpoint::UpdateInventory, to_json(update))?;
        let slot = state
            .inventory
            .iter_mut()
            .find(|i| i.id == update.id)
            .ok_or_else(|| ApiError::rejected(404, format!("item {} not found", update.id)))?;
        slot.amount = update.amount;
        slot.expiration_date = update.expiration_date;
        slot.location = update.location.clone();
        Ok(())
    }

    async fn delete_inventory_item(&self, id: i64) -> ApiResult<()> {
        let mut state = self.state();
        state.record(Endpoint::DeleteInventory, serde_json::json!({ "id": id }))?;
        state.inventory.retain(|i| i.id != id);
        Ok(())
    }

    async fn list_locations(&self) -> ApiResult<Vec<Location>> {
        let mut state = self.state();
        state.record(Endpoint::ListLocations, serde_json::Value::Null)?;
        let mut locations = state.locations.clone();
        locations.sort_by_key(|l| l.priority);
        Ok(locations)
    }

    async fn add_location(&self, name: &str) -> ApiResult<Location> {
        let mut state = self.state();
        state.record(Endpoint::AddLocation, serde_json::json!({ "name": name }))?;
        if name.trim().is_empty() {
            return Err(ApiError::rejected(400, "name required"));
        }
        let id = state.next_id();
        let priority = state.locations.iter().map(|l| l.priority).max().unwrap_or(0) + 1;
        let location = Location {
            id,
            name: name.to_string(),
            priority,
        };
        state.locations.push(location.clone());
        Ok(location)
    }

    async fn reorder_locations(&self, ordered: &[Location]) -> ApiResult<()> {
        let mut state = self.state();
        state.record(Endpoint::ReorderLocations, to_json(&ordered))?;
        for incoming in ordered {
            if let Some(slot) = state.locations.iter_mut().find(|l| l.id == incoming.id) {
                slot.priority = incoming.priority;
            }
        }
        Ok(())
    }

    async fn delete_location(&self, id: i64) -> ApiResult<()> {
        let mut state = self.state();
        state.record(Endpoint::DeleteLocation, serde_json::json!({ "id": id }))?;
        state.locations.retain(|l| l.id != id);
        Ok(())
    }

    async fn list_photos(&self) -> ApiResult<Vec<FridgePhoto>> {
        let mut state = self.state();
        state.record(Endpoint::ListPhotos, serde_json::Value::Null)?;
        Ok(state.photos.clone())
    }

    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<UploadReceipt> {
        let mut state = self.state();
        state.record(
            Endpoint::Upload,
            serde_json::json!({ "file": file_name, "size": bytes.len() }),
        )?;
        if bytes.is_empty() {
            return Err(ApiError::rejected(400, "empty upload"));
        }
        let id = state.next_id();
        let filename = format!("upload_{}.jpg", id);
        state.uploads.push((filename.clone(), bytes.len()));
        Ok(UploadReceipt {
            status: "success".to_string(),
            filename,
        })
    }

    async fn add_photo(&self, image_path: &str, location: &str) -> ApiResult<FridgePhoto> {
        let mut state = self.state();
        state.record(
            Endpoint::AddPhoto,
            serde_json::json!({ "image_path": image_path, "location": location }),
        )?;
        let id = state.next_id();
        let photo = FridgePhoto {
            id,
            image_path: image_path.to_string(),
            location: location.to_string(),
            created_at: String::new(),
        };
        state.photos.push(photo.clone());
        Ok(photo)
    }

    async fn delete_photo(&self, id: i64) -> ApiResult<()> {
        let mut state = self.state();
        state.record(Endpoint::DeletePhoto, serde_json::json!({ "id": id }))?;
        state.photos.retain(|p| p.id != id);
        Ok(())
    }

    async fn list_recipes(&self, filter: RecipeFilter) -> ApiResult<Vec<Recipe>> {
        let mut state = self.state();
        let body = match filter {
            RecipeFilter::All => serde_json::json!({ "all": true }),
            RecipeFilter::UsingIngredient(id) => serde_json::json!({ "ingredient_id": id }),
        };
        state.record(Endpoint::ListRecipes, body)?;
        Ok(state
            .recipes
            .iter()
            .filter(|r| match filter {
                RecipeFilter::All => true,
                RecipeFilter::UsingIngredient(id) => r.rows.iter().any(|(_, cid)| *cid == id),
            })
            .map(|r| state.summary(r))
            .collect())
    }

    async fn save_recipe(&self, id: Option<i64>, payload: &RecipePayload) -> ApiResult<()> {
        let mut state = self.state();
        state.record(Endpoint::SaveRecipe, serde_json::json!({ "id": id, "payload": to_json(payload) }))?;
        if payload.name.trim().is_empty() {
            return Err(ApiError::rejected(400, "name required"));
        }

        let parsed = parse_ingredients(&payload.csv_data);
        let missing: Vec<String> = distinct_names(&parsed)
            .into_iter()
            .filter(|name| state.resolve(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::MissingIngredients(missing));
        }

        let rows: Vec<(ParsedRow, i64)> = parsed
            .into_iter()
            .filter_map(|row| state.resolve(&row.name).map(|cid| (row, cid)))
            .collect();

        match id {
            None => {
                let new_id = state.next_id();
                state.recipes.push(StoredRecipe {
                    recipe: Recipe {
                        id: new_id,
                        name: payload.name.clone(),
                        yield_text: payload.yield_text.clone(),
                        url: payload.url.clone(),
                        process: payload.process.clone(),
                        ..Default::default()
                    },
                    payload: payload.clone(),
                    rows,
                });
            }
            Some(id) => {
                let stored = state
                    .recipes
                    .iter_mut()
                    .find(|r| r.recipe.id == id)
                    .ok_or_else(|| ApiError::rejected(404, format!("recipe {} not found", id)))?;
                stored.recipe.name = payload.name.clone();
                stored.recipe.yield_text = payload.yield_text.clone();
                stored.recipe.url = payload.url.clone();
                stored.recipe.process = payload.process.clone();
                stored.payload = payload.clone();
                stored.rows = rows;
            }
        }
        Ok(())
    }

    async fn recipe_ingredients(&self, recipe_id: i64) -> ApiResult<Vec<RecipeIngredient>> {
        let mut state = self.state();
        state.record(Endpoint::RecipeIngredients, serde_json::json!({ "id": recipe_id }))?;
        let stored = state
            .recipes
            .iter()
            .find(|r| r.recipe.id == recipe_id)
            .ok_or_else(|| ApiError::rejected(404, format!("recipe {} not found", recipe_id)))?;

        let stocked: HashSet<i64> = state.inventory.iter().map(|i| i.catalog_id).collect();
        Ok(stored
            .rows
            .iter()
            .map(|(row, cid)| RecipeIngredient {
                name: state
                    .catalog
                    .iter()
                    .find(|e| e.id == *cid)
                    .map(|e| e.name.clone())
                    .unwrap_or_else(|| row.name.clone()),
                amount: row.amount.clone(),
                unit: row.unit.clone(),
                group_name: row.group_name.clone(),
                details: row.details.clone(),
                catalog_id: Some(*cid),
                in_stock: stocked.contains(cid),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_conflict_then_force_merge_repoints() {
        let api = FakePantryApi::new();
        let salt = api.seed_catalog("Salt", Classification::Seasoning, "");
        let dup = api.seed_catalog("salt", Classification::Seasoning, "g");
        api.seed_inventory(dup, Amount::Quantity(100.0), "Other");
        let recipe = api.seed_recipe("Soup", "salt,1");
        assert_eq!(api.recipe_catalog_ids(recipe), vec![dup]);

        let mut entry = api.catalog_by_name("salt").unwrap();
        entry.name = "SALT".into();
        let write = CatalogWrite {
            entry,
            force_merge: false,
        };
        let err = api.update_catalog_entry(&write).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::MergeConfirmationRequired { target_id: Some(id), .. } if id == salt
        ));

        let forced = CatalogWrite {
            force_merge: true,
            ..write
        };
        api.update_catalog_entry(&forced).await.unwrap();
        assert_eq!(api.catalog().len(), 1);
        assert_eq!(api.inventory()[0].catalog_id, salt);
        assert_eq!(api.recipe_catalog_ids(recipe), vec![salt]);
    }

    #[tokio::test]
    async fn test_recipe_save_reports_missing_names_once() {
        let api = FakePantryApi::new();
        api.seed_catalog("Rice", Classification::Ingredient, "g");
        let payload = RecipePayload {
            name: "Onigiri".into(),
            csv_data: "Rice,300g\nNori,2\nNori,1".into(),
            ..Default::default()
        };
        let err = api.save_recipe(None, &payload).await.unwrap_err();
        assert_eq!(err, ApiError::MissingIngredients(vec!["Nori".into()]));
        assert!(api.recipe_by_name("Onigiri").is_none());
    }

    #[tokio::test]
    async fn test_delete_refused_while_referenced() {
        let api = FakePantryApi::new();
        let egg = api.seed_catalog("Egg", Classification::Ingredient, "pcs");
        api.seed_inventory(egg, Amount::Untracked, "Fridge");
        let err = api.delete_catalog_entry(egg).await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected { status: 409, .. }));
        assert_eq!(api.catalog().len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_create_refuses_case_variants() {
        let api = FakePantryApi::new();
        api.seed_catalog("Onion", Classification::Ingredient, "pcs");
        let before = api.catalog();

        let batch = vec![
            CatalogEntry::new("Leek", Classification::Ingredient),
            CatalogEntry::new(" onion", Classification::Ingredient),
        ];
        let err = api.create_catalog_entries(&batch).await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected { status: 409, .. }));
        assert_eq!(api.catalog(), before);

        let twice = vec![
            CatalogEntry::new("Leek", Classification::Ingredient),
            CatalogEntry::new("LEEK", Classification::Ingredient),
        ];
        assert!(api.create_catalog_entries(&twice).await.is_err());
        assert_eq!(api.catalog().len(), 1);
    }

    #[tokio::test]
    async fn test_csv_import_keeps_unlisted_category() {
        let api = FakePantryApi::new();
        let csv = "name,classification,category,default_unit,kana\nApple,ingredient,fruit,pcs,\n";
        let report = api.import_catalog_csv(csv).await.unwrap();
        assert_eq!(report.added, 1);
        let apple = api.catalog_by_name("Apple").unwrap();
        assert_eq!(apple.category, Some(Category::Unlisted("fruit".into())));
        assert!(api.export_catalog_csv().await.unwrap().contains("Apple,ingredient,fruit,pcs,"));
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot_and_recorded() {
        let api = FakePantryApi::new();
        api.fail_next(Endpoint::ListCatalog, ApiError::Transport("refused".into()));
        assert!(api.list_catalog().await.is_err());
        assert!(api.list_catalog().await.is_ok());
        assert_eq!(api.calls_to(Endpoint::ListCatalog).len(), 2);
        assert_eq!(api.write_count(), 0);
    }
}
