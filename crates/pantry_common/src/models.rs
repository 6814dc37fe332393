//! Data model shared by every pantry component.
//!
//! Field names and encodings follow the HTTP API contract: empty strings
//! stand for "absent" on the wire, `-1` is the untracked-amount sentinel,
//! and dates travel as `YYYY-MM-DDT00:00:00Z`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Classification / Category
// ============================================================================

/// Top-level type of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    #[default]
    Ingredient,
    Seasoning,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Ingredient => "ingredient",
            Classification::Seasoning => "seasoning",
        }
    }

    pub fn all() -> &'static [Classification] {
        &[Classification::Ingredient, Classification::Seasoning]
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ingredient" => Ok(Classification::Ingredient),
            "seasoning" => Ok(Classification::Seasoning),
            other => Err(format!(
                "unknown classification '{}' (expected ingredient or seasoning)",
                other
            )),
        }
    }
}

/// Catalog categories.
///
/// Seasonings carry no category; an ingredient with no category is
/// "uncategorized" and is listed together with `Other`. A category the
/// server holds outside the known list (CSV imports accept anything) is
/// kept as `Unlisted` so a save writes it back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Vegetable,
    Meat,
    ProcessedMeat,
    Seafood,
    Canned,
    EggDairy,
    Soy,
    DriedGoods,
    Noodles,
    Bread,
    Grains,
    Other,
    Unlisted(String),
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::Vegetable,
        Category::Meat,
        Category::ProcessedMeat,
        Category::Seafood,
        Category::Canned,
        Category::EggDairy,
        Category::Soy,
        Category::DriedGoods,
        Category::Noodles,
        Category::Bread,
        Category::Grains,
        Category::Other,
    ];

    /// Category as the server stores it; blank is `None`
    pub fn from_wire(raw: &str) -> Option<Category> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(
            trimmed
                .parse()
                .unwrap_or_else(|_| Category::Unlisted(trimmed.to_string())),
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::Vegetable => "vegetable",
            Category::Meat => "meat",
            Category::ProcessedMeat => "processed_meat",
            Category::Seafood => "seafood",
            Category::Canned => "canned",
            Category::EggDairy => "egg_dairy",
            Category::Soy => "soy",
            Category::DriedGoods => "dried_goods",
            Category::Noodles => "noodles",
            Category::Bread => "bread",
            Category::Grains => "grains",
            Category::Other => "other",
            Category::Unlisted(raw) => raw,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '-'], "_");
        Category::ALL
            .iter()
            .find(|c| c.as_str() == wanted)
            .cloned()
            .ok_or_else(|| format!("unknown category '{}'", s.trim()))
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Canonical record for a purchasable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CatalogEntry {
    /// 0 means "not yet created"
    #[serde(default)]
    pub id: i64,
    pub name: String,
    /// Phonetic reading; `None` is the flagged "reading not registered" state
    #[serde(default, with = "wire::opt_string")]
    pub kana: Option<String>,
    #[serde(default)]
    pub classification: Classification,
    #[serde(default, with = "wire::category")]
    pub category: Option<Category>,
    #[serde(default)]
    pub default_unit: String,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, classification: Classification) -> Self {
        Self {
            name: name.into(),
            classification,
            ..Default::default()
        }
    }

    pub fn is_new(&self) -> bool {
        self.id == 0
    }

    pub fn has_reading(&self) -> bool {
        self.kana
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }

    /// Reading if registered, name otherwise
    pub fn sort_key(&self) -> &str {
        match self.kana.as_deref() {
            Some(k) if !k.trim().is_empty() => k,
            _ => &self.name,
        }
    }

    /// Category used for filtering; seasonings, uncategorized and unlisted
    /// entries land in `Other`
    pub fn effective_category(&self) -> Category {
        match &self.category {
            Some(Category::Unlisted(_)) | None => Category::Other,
            Some(category) => category.clone(),
        }
    }

    /// "seasoning" or "ingredient / vegetable"
    pub fn tag(&self) -> String {
        match self.classification {
            Classification::Seasoning => self.classification.to_string(),
            Classification::Ingredient => format!(
                "{} / {}",
                self.classification,
                self.category
                    .as_ref()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "uncategorized".to_string())
            ),
        }
    }
}

/// `PUT /api/catalog` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogWrite {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    #[serde(default)]
    pub force_merge: bool,
}

/// `GET /api/catalog/usage` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UsageReport {
    #[serde(default)]
    pub recipe_count: u32,
    /// At most three names, chosen by the server
    #[serde(default, deserialize_with = "wire::null_default")]
    pub recipe_names: Vec<String>,
}

impl UsageReport {
    /// "A, B, C..." with a truncation marker when more recipes exist than named
    pub fn sample(&self) -> String {
        let shown: Vec<&str> = self.recipe_names.iter().take(3).map(String::as_str).collect();
        let mut text = shown.join(", ");
        if self.recipe_count as usize > shown.len() {
            text.push_str("...");
        }
        text
    }
}

/// `POST /import/catalog` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ImportReport {
    #[serde(default)]
    pub added: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default, deserialize_with = "wire::null_default")]
    pub errors: Vec<String>,
}

// ============================================================================
// Inventory
// ============================================================================

/// Stock quantity. `Untracked` is the `-1` sentinel: in stock, count unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Amount {
    Untracked,
    Quantity(f64),
}

impl Amount {
    pub const SENTINEL: f64 = -1.0;

    pub fn from_wire(value: f64) -> Self {
        if value == Self::SENTINEL {
            Amount::Untracked
        } else {
            Amount::Quantity(value)
        }
    }

    pub fn to_wire(self) -> f64 {
        match self {
            Amount::Untracked => Self::SENTINEL,
            Amount::Quantity(q) => q,
        }
    }

    pub fn is_tracked(&self) -> bool {
        matches!(self, Amount::Quantity(_))
    }

    /// Add `delta`, clamped at zero and rounded to one decimal.
    /// `None` for untracked amounts, which never take part in arithmetic.
    pub fn adjusted(self, delta: f64) -> Option<Amount> {
        match self {
            Amount::Untracked => None,
            Amount::Quantity(q) => {
                let next = (q + delta).max(0.0);
                Some(Amount::Quantity((next * 10.0).round() / 10.0))
            }
        }
    }

    /// "in stock" for untracked, "3 pcs" otherwise
    pub fn display_with_unit(&self, unit: &str) -> String {
        match self {
            Amount::Untracked => "in stock".to_string(),
            Amount::Quantity(q) => {
                let number = if q.fract() == 0.0 {
                    format!("{}", *q as i64)
                } else {
                    format!("{}", q)
                };
                if unit.is_empty() {
                    number
                } else {
                    format!("{} {}", number, unit)
                }
            }
        }
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Untracked
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_wire())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(Amount::from_wire(value))
    }
}

/// A physical stock record, as listed by `GET /api/ingredients`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InventoryItem {
    #[serde(default)]
    pub id: i64,
    pub catalog_id: i64,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default)]
    pub unit: String,
    #[serde(default, with = "wire::opt_date")]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: String,
    #[serde(default, with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    /// Joined from the catalog entry
    #[serde(default)]
    pub name: String,
    #[serde(default, with = "wire::opt_string")]
    pub kana: Option<String>,
    /// Recipes referencing the catalog entry
    #[serde(default)]
    pub recipe_count: u32,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// `POST /api/ingredients` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInventoryItem {
    pub catalog_id: i64,
    pub amount: Amount,
    pub unit: String,
    #[serde(with = "wire::opt_date")]
    pub expiration_date: Option<NaiveDate>,
    pub location: String,
    #[serde(default, with = "wire::opt_string", skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

/// `PUT /api/ingredients` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryUpdate {
    pub id: i64,
    pub amount: Amount,
    #[serde(with = "wire::opt_date")]
    pub expiration_date: Option<NaiveDate>,
    pub location: String,
}

impl InventoryUpdate {
    pub fn from_item(item: &InventoryItem) -> Self {
        Self {
            id: item.id,
            amount: item.amount,
            expiration_date: item.expiration_date,
            location: item.location.clone(),
        }
    }
}

/// Ordered storage bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Location {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub priority: i64,
}

/// Photo attached to a location, not to an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FridgePhoto {
    #[serde(default)]
    pub id: i64,
    pub image_path: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub created_at: String,
}

/// `POST /api/upload` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub status: String,
    #[serde(default)]
    pub filename: String,
}

impl UploadReceipt {
    pub fn is_success(&self) -> bool {
        self.status == "success" && !self.filename.is_empty()
    }
}

// ============================================================================
// Recipes
// ============================================================================

/// Recipe summary as listed by `GET /api/recipes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Recipe {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default, rename = "yield", deserialize_with = "wire::null_default")]
    pub yield_text: String,
    #[serde(default, deserialize_with = "wire::null_default")]
    pub url: String,
    #[serde(default, deserialize_with = "wire::null_default")]
    pub process: String,
    #[serde(default)]
    pub created_at: String,
    /// Every non-seasoning row is in stock
    #[serde(default)]
    pub has_ingredients: bool,
    /// Every seasoning row is in stock
    #[serde(default)]
    pub has_seasonings: bool,
}

/// `POST/PUT /api/recipes` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RecipePayload {
    pub name: String,
    #[serde(rename = "yield")]
    pub yield_text: String,
    pub url: String,
    pub process: String,
    /// Raw ingredient text; the server parses it again at write time
    pub csv_data: String,
}

/// Resolved ingredient row from `GET /api/recipes/ingredients`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RecipeIngredient {
    pub name: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "wire::null_default")]
    pub group_name: String,
    #[serde(default, deserialize_with = "wire::null_default")]
    pub details: String,
    #[serde(default, with = "wire::opt_id")]
    pub catalog_id: Option<i64>,
    #[serde(default)]
    pub in_stock: bool,
}

// ============================================================================
// Wire helpers
// ============================================================================

mod wire {
    use super::Category;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    /// `null` decodes as the type's default
    pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    pub mod opt_string {
        use super::*;

        pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_str(value.as_deref().unwrap_or(""))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
            let raw = Option::<String>::deserialize(d)?;
            Ok(raw.filter(|v| !v.trim().is_empty()))
        }
    }

    pub mod opt_id {
        use super::*;

        pub fn serialize<S: Serializer>(value: &Option<i64>, s: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(id) => s.serialize_i64(*id),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
            let raw = Option::<i64>::deserialize(d)?;
            Ok(raw.filter(|id| *id > 0))
        }
    }

    pub mod category {
        use super::*;

        pub fn serialize<S: Serializer>(value: &Option<Category>, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_str(value.as_ref().map(|c| c.as_str()).unwrap_or(""))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Category>, D::Error> {
            let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
            let category = Category::from_wire(&raw);
            if let Some(Category::Unlisted(name)) = &category {
                tracing::debug!("Unlisted category '{}' from server, kept as-is", name);
            }
            Ok(category)
        }
    }

    pub mod opt_date {
        use super::*;

        pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(date) => s.serialize_str(&format!("{}T00:00:00Z", date.format("%Y-%m-%d"))),
                None => s.serialize_str(""),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
            let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
            Ok(parse_date_prefix(&raw))
        }
    }

    /// Accepts `YYYY-MM-DD` optionally followed by a time part
    pub fn parse_date_prefix(raw: &str) -> Option<NaiveDate> {
        let trimmed = raw.trim();
        let head = trimmed.get(..10)?;
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }
}

pub use wire::parse_date_prefix;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_untracked_amount_serializes_as_sentinel() {
        let untracked = serde_json::to_value(Amount::Untracked).unwrap();
        let zero = serde_json::to_value(Amount::Quantity(0.0)).unwrap();
        assert_eq!(untracked, json!(-1.0));
        assert_eq!(zero, json!(0.0));
        assert_ne!(untracked, zero);
    }

    #[test]
    fn test_untracked_amount_never_adjusts() {
        assert_eq!(Amount::Untracked.adjusted(-1.0), None);
        assert_eq!(Amount::Untracked.adjusted(5.0), None);
        assert_eq!(Amount::Quantity(0.5).adjusted(-1.0), Some(Amount::Quantity(0.0)));
        assert_eq!(Amount::Quantity(1.0).adjusted(0.25), Some(Amount::Quantity(1.3)));
    }

    #[test]
    fn test_amount_display() {
        assert_eq!(Amount::Untracked.display_with_unit("pcs"), "in stock");
        assert_eq!(Amount::Quantity(0.0).display_with_unit("pcs"), "0 pcs");
        assert_eq!(Amount::Quantity(1.5).display_with_unit(""), "1.5");
    }

    #[test]
    fn test_catalog_entry_empty_strings_are_absent() {
        let entry: CatalogEntry = serde_json::from_value(json!({
            "id": 3,
            "name": "Salt",
            "kana": "",
            "classification": "seasoning",
            "category": "",
            "default_unit": ""
        }))
        .unwrap();
        assert_eq!(entry.kana, None);
        assert_eq!(entry.category, None);
        assert!(!entry.has_reading());
        assert_eq!(entry.sort_key(), "Salt");
        assert_eq!(entry.tag(), "seasoning");

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["kana"], json!(""));
        assert_eq!(back["category"], json!(""));
    }

    #[test]
    fn test_catalog_write_flattens_force_merge() {
        let write = CatalogWrite {
            entry: CatalogEntry {
                id: 4,
                name: "Tomato".into(),
                category: Some(Category::Vegetable),
                default_unit: "pcs".into(),
                ..Default::default()
            },
            force_merge: true,
        };
        let value = serde_json::to_value(&write).unwrap();
        assert_eq!(value["id"], json!(4));
        assert_eq!(value["category"], json!("vegetable"));
        assert_eq!(value["force_merge"], json!(true));
    }

    #[test]
    fn test_usage_sample_truncation() {
        let usage: UsageReport = serde_json::from_value(json!({
            "recipe_count": 5,
            "recipe_names": ["Curry", "Stew", "Soup"]
        }))
        .unwrap();
        assert_eq!(usage.sample(), "Curry, Stew, Soup...");

        let usage: UsageReport =
            serde_json::from_value(json!({"recipe_count": 0, "recipe_names": null})).unwrap();
        assert!(usage.recipe_names.is_empty());
        assert_eq!(usage.sample(), "");
    }

    #[test]
    fn test_inventory_dates_round_trip_wire_format() {
        let item: InventoryItem = serde_json::from_value(json!({
            "id": 1,
            "catalog_id": 9,
            "amount": -1,
            "unit": "",
            "expiration_date": "2024-05-01T00:00:00Z",
            "location": "Fridge"
        }))
        .unwrap();
        assert_eq!(item.amount, Amount::Untracked);
        assert_eq!(item.expiration_date, NaiveDate::from_ymd_opt(2024, 5, 1));

        let update = InventoryUpdate::from_item(&item);
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["expiration_date"], json!("2024-05-01T00:00:00Z"));
        assert_eq!(value["amount"], json!(-1.0));

        let none: InventoryItem = serde_json::from_value(json!({
            "catalog_id": 9,
            "expiration_date": ""
        }))
        .unwrap();
        assert_eq!(none.expiration_date, None);
    }

    #[test]
    fn test_unlisted_category_written_back_unchanged() {
        let entry: CatalogEntry =
            serde_json::from_value(json!({"name": "Apple", "category": "fruit"})).unwrap();
        assert_eq!(entry.category, Some(Category::Unlisted("fruit".into())));
        assert_eq!(entry.effective_category(), Category::Other);
        assert_eq!(entry.tag(), "ingredient / fruit");

        let write = CatalogWrite {
            entry: CatalogEntry {
                default_unit: "kg".into(),
                ..entry
            },
            force_merge: false,
        };
        let value = serde_json::to_value(&write).unwrap();
        assert_eq!(value["category"], json!("fruit"));
        assert_eq!(value["default_unit"], json!("kg"));
    }

    #[test]
    fn test_category_parse_accepts_spaces() {
        assert_eq!("Dried Goods".parse::<Category>(), Ok(Category::DriedGoods));
        assert_eq!("egg-dairy".parse::<Category>(), Ok(Category::EggDairy));
        assert!("furniture".parse::<Category>().is_err());
    }

    #[test]
    fn test_recipe_ingredient_zero_catalog_id_is_unresolved() {
        let row: RecipeIngredient =
            serde_json::from_value(json!({"name": "Onion", "catalog_id": 0})).unwrap();
        assert_eq!(row.catalog_id, None);
    }
}
