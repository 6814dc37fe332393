//! Inventory management: add, adjust, edit, consume, and views.

use crate::api::PantryApi;
use crate::error::{PantryError, Result};
use crate::models::{Amount, InventoryItem, InventoryUpdate, Location, NewInventoryItem};
use crate::prompt::{Confirmation, Prompter};
use crate::store::{PantryStore, Scope};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

/// A known location name, else the default if configured, else the first
/// configured location. With no locations at all the default is used as-is.
pub fn resolve_location(requested: Option<&str>, locations: &[Location], default: &str) -> String {
    if let Some(name) = requested.map(str::trim).filter(|n| !n.is_empty()) {
        if locations.iter().any(|l| l.name == name) {
            return name.to_string();
        }
        debug!("Unknown location '{}', falling back", name);
    }
    if locations.is_empty() || locations.iter().any(|l| l.name == default) {
        return default.to_string();
    }
    locations[0].name.clone()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    /// No date set
    None,
    Expired { days_ago: i64 },
    Today,
    Soon { days_left: i64 },
    Normal,
}

impl ExpiryStatus {
    pub fn label(&self) -> String {
        match self {
            ExpiryStatus::None => String::new(),
            ExpiryStatus::Expired { days_ago } => format!("expired {}d ago", days_ago),
            ExpiryStatus::Today => "expires today".to_string(),
            ExpiryStatus::Soon { days_left } => format!("{}d left", days_left),
            ExpiryStatus::Normal => String::new(),
        }
    }

    pub fn needs_attention(&self) -> bool {
        matches!(
            self,
            ExpiryStatus::Expired { .. } | ExpiryStatus::Today | ExpiryStatus::Soon { .. }
        )
    }
}

pub fn expiry_status(date: Option<NaiveDate>, today: NaiveDate, soon_days: i64) -> ExpiryStatus {
    let Some(date) = date else {
        return ExpiryStatus::None;
    };
    let days = (date - today).num_days();
    if days < 0 {
        ExpiryStatus::Expired { days_ago: -days }
    } else if days == 0 {
        ExpiryStatus::Today
    } else if days <= soon_days {
        ExpiryStatus::Soon { days_left: days }
    } else {
        ExpiryStatus::Normal
    }
}

/// Case-insensitive match on name or reading
pub fn matches_search(item: &InventoryItem, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    item.name.to_lowercase().contains(&term)
        || item
            .kana
            .as_deref()
            .map(|k| k.to_lowercase().contains(&term))
            .unwrap_or(false)
}

/// Items bucketed per location, in location order. Items whose location
/// is not configured land in the default bucket. Empty buckets are kept.
pub fn group_by_location<'a>(
    items: &'a [InventoryItem],
    locations: &[Location],
    default: &str,
) -> Vec<(String, Vec<&'a InventoryItem>)> {
    let mut buckets: Vec<(String, Vec<&InventoryItem>)> =
        locations.iter().map(|l| (l.name.clone(), Vec::new())).collect();
    if !buckets.iter().any(|(name, _)| name == default) {
        buckets.push((default.to_string(), Vec::new()));
    }

    for item in items {
        let target = if locations.iter().any(|l| l.name == item.location) {
            item.location.as_str()
        } else {
            default
        };
        if let Some((_, bucket)) = buckets.iter_mut().find(|(name, _)| name == target) {
            bucket.push(item);
        }
    }
    buckets
}

/// What to stock from the catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockRequest {
    pub catalog_id: i64,
    /// `None` records the item as in stock without a count
    pub amount: Option<f64>,
    /// Defaults to the catalog entry's unit
    pub unit: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub location: Option<String>,
    /// Stored file name of an uploaded preview
    pub image_path: Option<String>,
}

/// Field changes for an existing item; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemEdit {
    pub amount: Option<Amount>,
    pub expiration_date: Option<Option<NaiveDate>>,
    pub location: Option<String>,
}

pub struct InventoryManager {
    api: Arc<dyn PantryApi>,
    prompter: Arc<dyn Prompter>,
    default_location: String,
}

impl InventoryManager {
    pub fn new(api: Arc<dyn PantryApi>, prompter: Arc<dyn Prompter>, default_location: &str) -> Self {
        Self {
            api,
            prompter,
            default_location: default_location.to_string(),
        }
    }

    pub fn default_location(&self) -> &str {
        &self.default_location
    }

    pub async fn load(&self, store: &mut PantryStore) -> Result<()> {
        store.refresh(self.api.as_ref(), Scope::Inventory).await?;
        store.ensure_fresh(self.api.as_ref(), Scope::Locations).await?;
        Ok(())
    }

    pub async fn add(&self, store: &mut PantryStore, request: &StockRequest) -> Result<InventoryItem> {
        if let Some(amount) = request.amount {
            if amount < 0.0 || !amount.is_finite() {
                return Err(PantryError::Validation(format!(
                    "Amount must be zero or more, got {}",
                    amount
                )));
            }
        }

        store.ensure_fresh(self.api.as_ref(), Scope::Catalog).await?;
        store.ensure_fresh(self.api.as_ref(), Scope::Locations).await?;
        let entry = store.catalog_entry(request.catalog_id).ok_or_else(|| {
            PantryError::NotFound(format!("catalog entry {}", request.catalog_id))
        })?;

        let item = NewInventoryItem {
            catalog_id: entry.id,
            amount: request.amount.map(Amount::Quantity).unwrap_or(Amount::Untracked),
            unit: request
                .unit
                .clone()
                .unwrap_or_else(|| entry.default_unit.clone()),
            expiration_date: request.expiration_date,
            location: resolve_location(
                request.location.as_deref(),
                store.locations(),
                &self.default_location,
            ),
            image_path: request.image_path.clone(),
        };
        let name = entry.name.clone();

        let created = self.api.add_inventory_item(&item).await?;
        info!("Stocked '{}' in {}", name, item.location);
        store.refresh_after_write(self.api.as_ref(), Scope::Inventory).await;
        Ok(created)
    }

    /// Quick adjust by `delta`; refused for untracked amounts
    pub async fn adjust(&self, store: &mut PantryStore, item_id: i64, delta: f64) -> Result<Amount> {
        let item = self.current(store, item_id).await?;
        let next = item
            .amount
            .adjusted(delta)
            .ok_or_else(|| PantryError::UntrackedAmount(item.name.clone()))?;

        let mut update = InventoryUpdate::from_item(&item);
        update.amount = next;
        self.api.update_inventory_item(&update).await?;
        debug!("Adjusted item {} to {:?}", item_id, next);
        store.refresh_after_write(self.api.as_ref(), Scope::Inventory).await;
        Ok(next)
    }

    pub async fn edit(&self, store: &mut PantryStore, item_id: i64, edit: &ItemEdit) -> Result<()> {
        if let Some(Amount::Quantity(q)) = edit.amount {
            if q < 0.0 {
                return Err(PantryError::Validation(format!(
                    "Amount must be zero or more, got {}",
                    q
                )));
            }
        }
        let item = self.current(store, item_id).await?;
        store.ensure_fresh(self.api.as_ref(), Scope::Locations).await?;

        let mut update = InventoryUpdate::from_item(&item);
        if let Some(amount) = edit.amount {
            update.amount = amount;
        }
        if let Some(date) = edit.expiration_date {
            update.expiration_date = date;
        }
        if let Some(location) = edit.location.as_deref() {
            update.location = resolve_location(Some(location), store.locations(), &self.default_location);
        }

        self.api.update_inventory_item(&update).await?;
        info!("Updated inventory item {}", item_id);
        store.refresh_after_write(self.api.as_ref(), Scope::Inventory).await;
        Ok(())
    }

    /// Delete the item after confirmation; false when declined
    pub async fn consume(&self, store: &mut PantryStore, item_id: i64) -> Result<bool> {
        let item = self.current(store, item_id).await?;
        if !self.prompter.confirm(&Confirmation::ConsumeItem {
            name: item.name.clone(),
        }) {
            return Ok(false);
        }
        self.api.delete_inventory_item(item_id).await?;
        info!("Consumed '{}'", item.name);
        store.refresh_after_write(self.api.as_ref(), Scope::Inventory).await;
        Ok(true)
    }

    async fn current(&self, store: &mut PantryStore, item_id: i64) -> Result<InventoryItem> {
        store.ensure_fresh(self.api.as_ref(), Scope::Inventory).await?;
        store
            .inventory_item(item_id)
            .cloned()
            .ok_or_else(|| PantryError::NotFound(format!("inventory item {}", item_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_api::{Endpoint, FakePantryApi};
    use crate::models::Classification;
    use crate::prompt::ScriptedPrompter;

    fn locations(names: &[&str]) -> Vec<Location> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| Location {
                id: i as i64 + 1,
                name: n.to_string(),
                priority: i as i64 + 1,
            })
            .collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_location_fallback() {
        let locs = locations(&["Fridge", "Freezer", "Other"]);
        assert_eq!(resolve_location(Some("Freezer"), &locs, "Other"), "Freezer");
        assert_eq!(resolve_location(Some("Garage"), &locs, "Other"), "Other");
        assert_eq!(resolve_location(None, &locs, "Other"), "Other");

        let locs = locations(&["Fridge", "Freezer"]);
        assert_eq!(resolve_location(Some("Garage"), &locs, "Other"), "Fridge");
        assert_eq!(resolve_location(None, &[], "Other"), "Other");
    }

    #[test]
    fn test_expiry_status() {
        let today = date(2024, 5, 10);
        assert_eq!(expiry_status(None, today, 2), ExpiryStatus::None);
        assert_eq!(
            expiry_status(Some(date(2024, 5, 8)), today, 2),
            ExpiryStatus::Expired { days_ago: 2 }
        );
        assert_eq!(expiry_status(Some(today), today, 2), ExpiryStatus::Today);
        assert_eq!(
            expiry_status(Some(date(2024, 5, 12)), today, 2),
            ExpiryStatus::Soon { days_left: 2 }
        );
        assert_eq!(expiry_status(Some(date(2024, 5, 13)), today, 2), ExpiryStatus::Normal);
    }

    #[test]
    fn test_group_by_location_uses_default_bucket() {
        let locs = locations(&["Fridge", "Other"]);
        let items = vec![
            InventoryItem {
                id: 1,
                location: "Fridge".into(),
                ..Default::default()
            },
            InventoryItem {
                id: 2,
                location: "Garage".into(),
                ..Default::default()
            },
        ];
        let grouped = group_by_location(&items, &locs, "Other");
        let shape: Vec<(&str, Vec<i64>)> = grouped
            .iter()
            .map(|(name, items)| (name.as_str(), items.iter().map(|i| i.id).collect()))
            .collect();
        assert_eq!(shape, vec![("Fridge", vec![1]), ("Other", vec![2])]);
    }

    #[test]
    fn test_search_on_name_and_reading() {
        let item = InventoryItem {
            name: "人参".into(),
            kana: Some("にんじん".into()),
            ..Default::default()
        };
        assert!(matches_search(&item, "にん"));
        assert!(matches_search(&item, "人参"));
        assert!(matches_search(&item, ""));
        assert!(!matches_search(&item, "だいこん"));
    }

    #[tokio::test]
    async fn test_add_defaults_unit_and_untracked() {
        let api = Arc::new(FakePantryApi::new());
        let egg = api.seed_catalog("Egg", Classification::Ingredient, "pcs");
        api.seed_location("Fridge");
        api.seed_location("Other");
        let manager = InventoryManager::new(api.clone(), Arc::new(ScriptedPrompter::new()), "Other");
        let mut store = PantryStore::new();

        let request = StockRequest {
            catalog_id: egg,
            location: Some("Pantry".into()),
            ..Default::default()
        };
        manager.add(&mut store, &request).await.unwrap();

        let sent = &api.calls_to(Endpoint::AddInventory)[0].body;
        assert_eq!(sent["amount"], serde_json::json!(-1.0));
        assert_eq!(sent["unit"], serde_json::json!("pcs"));
        assert_eq!(sent["location"], serde_json::json!("Other"));
        assert_eq!(store.inventory().len(), 1);
    }

    #[tokio::test]
    async fn test_adjust_refuses_untracked() {
        let api = Arc::new(FakePantryApi::new());
        let milk = api.seed_catalog("Milk", Classification::Ingredient, "L");
        let item = api.seed_inventory(milk, Amount::Untracked, "Fridge");
        let manager = InventoryManager::new(api.clone(), Arc::new(ScriptedPrompter::new()), "Other");
        let mut store = PantryStore::new();

        let err = manager.adjust(&mut store, item, -1.0).await.unwrap_err();
        assert!(matches!(err, PantryError::UntrackedAmount(ref name) if name == "Milk"));
        assert!(api.calls_to(Endpoint::UpdateInventory).is_empty());
    }

    #[tokio::test]
    async fn test_adjust_clamps_at_zero() {
        let api = Arc::new(FakePantryApi::new());
        let milk = api.seed_catalog("Milk", Classification::Ingredient, "L");
        let item = api.seed_inventory(milk, Amount::Quantity(0.5), "Fridge");
        let manager = InventoryManager::new(api.clone(), Arc::new(ScriptedPrompter::new()), "Other");
        let mut store = PantryStore::new();

        let next = manager.adjust(&mut store, item, -1.0).await.unwrap();
        assert_eq!(next, Amount::Quantity(0.0));
        assert_eq!(api.inventory()[0].amount, Amount::Quantity(0.0));
    }

    #[tokio::test]
    async fn test_consume_declined_keeps_item() {
        let api = Arc::new(FakePantryApi::new());
        let milk = api.seed_catalog("Milk", Classification::Ingredient, "L");
        let item = api.seed_inventory(milk, Amount::Quantity(1.0), "Fridge");
        let manager = InventoryManager::new(api.clone(), Arc::new(ScriptedPrompter::new()), "Other");
        let mut store = PantryStore::new();

        assert!(!manager.consume(&mut store, item).await.unwrap());
        assert_eq!(api.inventory().len(), 1);
    }
}
