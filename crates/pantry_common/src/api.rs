//! Pantry API abstraction
//!
//! Every component talks to the server through [`PantryApi`]. The CLI
//! provides the HTTP implementation; tests use
//! [`FakePantryApi`](crate::fake_api::FakePantryApi), which simulates the
//! server contract in memory.
//!
//! Requests are not cancellable once issued.

use crate::error::ApiError;
use crate::models::{
    CatalogEntry, CatalogWrite, FridgePhoto, ImportReport, InventoryItem, InventoryUpdate,
    Location, NewInventoryItem, Recipe, RecipeIngredient, RecipePayload, UploadReceipt,
    UsageReport,
};
use async_trait::async_trait;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Which recipes `GET /api/recipes` should return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecipeFilter {
    /// `?all=true`
    #[default]
    All,
    /// `?ingredient_id=`
    UsingIngredient(i64),
}

#[async_trait]
pub trait PantryApi: Send + Sync {
    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    /// `GET /api/catalog`
    async fn list_catalog(&self) -> ApiResult<Vec<CatalogEntry>>;

    /// `POST /api/catalog` with a single entry.
    /// Fails with `MergeConfirmationRequired` when the name already exists.
    async fn create_catalog_entry(&self, entry: &CatalogEntry) -> ApiResult<()>;

    /// `POST /api/catalog` with an array; existing names are updated in place.
    async fn create_catalog_entries(&self, entries: &[CatalogEntry]) -> ApiResult<()>;

    /// `PUT /api/catalog`
    async fn update_catalog_entry(&self, write: &CatalogWrite) -> ApiResult<()>;

    /// `DELETE /api/catalog?id=`; refused while referenced
    async fn delete_catalog_entry(&self, id: i64) -> ApiResult<()>;

    /// `GET /api/catalog/usage?id=`
    async fn catalog_usage(&self, id: i64) -> ApiResult<UsageReport>;

    /// `POST /import/catalog` with a plain-text CSV body
    async fn import_catalog_csv(&self, csv: &str) -> ApiResult<ImportReport>;

    /// `GET /api/catalog/export`
    async fn export_catalog_csv(&self) -> ApiResult<String>;

    // ------------------------------------------------------------------
    // Inventory
    // ------------------------------------------------------------------

    /// `GET /api/ingredients`
    async fn list_inventory(&self) -> ApiResult<Vec<InventoryItem>>;

    /// `POST /api/ingredients`
    async fn add_inventory_item(&self, item: &NewInventoryItem) -> ApiResult<InventoryItem>;

    /// `PUT /api/ingredients`
    async fn update_inventory_item(&self, update: &InventoryUpdate) -> ApiResult<()>;

    /// `DELETE /api/ingredients?id=`
    async fn delete_inventory_item(&self, id: i64) -> ApiResult<()>;

    // ------------------------------------------------------------------
    // Locations
    // ------------------------------------------------------------------

    /// `GET /api/locations`, ordered by priority
    async fn list_locations(&self) -> ApiResult<Vec<Location>>;

    /// `POST /api/locations`; appended at the end
    async fn add_location(&self, name: &str) -> ApiResult<Location>;

    /// `PUT /api/locations` with the full ordered list
    async fn reorder_locations(&self, ordered: &[Location]) -> ApiResult<()>;

    /// `DELETE /api/locations?id=`
    async fn delete_location(&self, id: i64) -> ApiResult<()>;

    // ------------------------------------------------------------------
    // Photos
    // ------------------------------------------------------------------

    /// `GET /api/fridge_photos`
    async fn list_photos(&self) -> ApiResult<Vec<FridgePhoto>>;

    /// `POST /api/upload`, multipart field `photo`
    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<UploadReceipt>;

    /// `POST /api/fridge_photos`
    async fn add_photo(&self, image_path: &str, location: &str) -> ApiResult<FridgePhoto>;

    /// `DELETE /api/fridge_photos?id=`
    async fn delete_photo(&self, id: i64) -> ApiResult<()>;

    // ------------------------------------------------------------------
    // Recipes
    // ------------------------------------------------------------------

    /// `GET /api/recipes`
    async fn list_recipes(&self, filter: RecipeFilter) -> ApiResult<Vec<Recipe>>;

    /// `POST /api/recipes` when `id` is `None`, `PUT /api/recipes?id=` otherwise.
    /// Fails with `MissingIngredients` when a row names no catalog entry.
    async fn save_recipe(&self, id: Option<i64>, payload: &RecipePayload) -> ApiResult<()>;

    /// `GET /api/recipes/ingredients?id=`
    async fn recipe_ingredients(&self, recipe_id: i64) -> ApiResult<Vec<RecipeIngredient>>;
}
