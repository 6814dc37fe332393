//! HTTP client for the pantry server
//!
//! Implements [`PantryApi`] over reqwest. Non-2xx responses are decoded
//! into [`ApiError`]: the structured `error_code` bodies become their own
//! variants, `{"error": "..."}` and plain-text bodies become `Rejected`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use pantry_common::api::{ApiResult, PantryApi, RecipeFilter};
use pantry_common::config::ServerSettings;
use pantry_common::error::{ApiError, CODE_MERGE_CONFIRMATION, CODE_MISSING_INGREDIENTS, GENERIC_FAILURE};
use pantry_common::models::{
    CatalogEntry, CatalogWrite, FridgePhoto, ImportReport, InventoryItem, InventoryUpdate,
    Location, NewInventoryItem, Recipe, RecipeIngredient, RecipePayload, UploadReceipt,
    UsageReport,
};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Error body shapes the server sends
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    target_id: Option<i64>,
    #[serde(default)]
    items: Option<Vec<String>>,
}

/// Turn a failed response into an error
pub fn map_error_response(status: u16, body: &str) -> ApiError {
    let parsed: ErrorBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) => return ApiError::rejected(status, body.trim()),
    };

    match parsed.error_code.as_deref() {
        Some(CODE_MERGE_CONFIRMATION) => ApiError::MergeConfirmationRequired {
            message: parsed
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            target_id: parsed.target_id,
        },
        Some(CODE_MISSING_INGREDIENTS) => {
            ApiError::MissingIngredients(parsed.items.unwrap_or_default())
        }
        _ => ApiError::rejected(
            status,
            parsed.error.or(parsed.message).unwrap_or_default(),
        ),
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    if e.is_decode() {
        ApiError::Decode(e.to_string())
    } else {
        ApiError::Transport(e.to_string())
    }
}

pub struct HttpPantryApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpPantryApi {
    pub fn new(settings: &ServerSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.effective_timeout()))
            .user_agent(settings.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: settings.normalized_base_url(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url().path());
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_error_response(status.as_u16(), &body))
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = self.send(request).await?;
        let text = response.text().await.map_err(transport)?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Lists come back as `null` when empty
    async fn list<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<Vec<T>> {
        let items: Option<Vec<T>> = self.json(request).await?;
        Ok(items.unwrap_or_default())
    }

    async fn empty(&self, request: RequestBuilder) -> ApiResult<()> {
        self.send(request).await.map(|_| ())
    }
}

#[async_trait]
impl PantryApi for HttpPantryApi {
    async fn list_catalog(&self) -> ApiResult<Vec<CatalogEntry>> {
        self.list(self.http.get(self.url("/api/catalog"))).await
    }

    async fn create_catalog_entry(&self, entry: &CatalogEntry) -> ApiResult<()> {
        let body = std::slice::from_ref(entry);
        self.empty(self.http.post(self.url("/api/catalog")).json(body)).await
    }

    async fn create_catalog_entries(&self, entries: &[CatalogEntry]) -> ApiResult<()> {
        self.empty(self.http.post(self.url("/api/catalog")).json(entries)).await
    }

    async fn update_catalog_entry(&self, write: &CatalogWrite) -> ApiResult<()> {
        self.empty(self.http.put(self.url("/api/catalog")).json(write)).await
    }

    async fn delete_catalog_entry(&self, id: i64) -> ApiResult<()> {
        let request = self.http.delete(self.url("/api/catalog")).query(&[("id", id)]);
        self.empty(request).await
    }

    async fn catalog_usage(&self, id: i64) -> ApiResult<UsageReport> {
        let request = self.http.get(self.url("/api/catalog/usage")).query(&[("id", id)]);
        self.json(request).await
    }

    async fn import_catalog_csv(&self, csv: &str) -> ApiResult<ImportReport> {
        let request = self
            .http
            .post(self.url("/import/catalog"))
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(csv.to_string());
        self.json(request).await
    }

    async fn export_catalog_csv(&self) -> ApiResult<String> {
        let response = self.send(self.http.get(self.url("/api/catalog/export"))).await?;
        response.text().await.map_err(transport)
    }

    async fn list_inventory(&self) -> ApiResult<Vec<InventoryItem>> {
        self.list(self.http.get(self.url("/api/ingredients"))).await
    }

    async fn add_inventory_item(&self, item: &NewInventoryItem) -> ApiResult<InventoryItem> {
        self.json(self.http.post(self.url("/api/ingredients")).json(item)).await
    }

    async fn update_inventory_item(&self, update: &InventoryUpdate) -> ApiResult<()> {
        self.empty(self.http.put(self.url("/api/ingredients")).json(update)).await
    }

    async fn delete_inventory_item(&self, id: i64) -> ApiResult<()> {
        let request = self.http.delete(self.url("/api/ingredients")).query(&[("id", id)]);
        self.empty(request).await
    }

    async fn list_locations(&self) -> ApiResult<Vec<Location>> {
        self.list(self.http.get(self.url("/api/locations"))).await
    }

    async fn add_location(&self, name: &str) -> ApiResult<Location> {
        let body = serde_json::json!({ "name": name });
        self.json(self.http.post(self.url("/api/locations")).json(&body)).await
    }

    async fn reorder_locations(&self, ordered: &[Location]) -> ApiResult<()> {
        self.empty(self.http.put(self.url("/api/locations")).json(ordered)).await
    }

    async fn delete_location(&self, id: i64) -> ApiResult<()> {
        let request = self.http.delete(self.url("/api/locations")).query(&[("id", id)]);
        self.empty(request).await
    }

    async fn list_photos(&self) -> ApiResult<Vec<FridgePhoto>> {
        self.list(self.http.get(self.url("/api/fridge_photos"))).await
    }

    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> ApiResult<UploadReceipt> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("image/jpeg")
            .map_err(transport)?;
        let form = Form::new().part("photo", part);
        self.json(self.http.post(self.url("/api/upload")).multipart(form)).await
    }

    async fn add_photo(&self, image_path: &str, location: &str) -> ApiResult<FridgePhoto> {
        let body = serde_json::json!({ "image_path": image_path, "location": location });
        self.json(self.http.post(self.url("/api/fridge_photos")).json(&body)).await
    }

    async fn delete_photo(&self, id: i64) -> ApiResult<()> {
        let request = self.http.delete(self.url("/api/fridge_photos")).query(&[("id", id)]);
        self.empty(request).await
    }

    async fn list_recipes(&self, filter: RecipeFilter) -> ApiResult<Vec<Recipe>> {
        let request = self.http.get(self.url("/api/recipes"));
        let request = match filter {
            RecipeFilter::All => request.query(&[("all", "true")]),
            RecipeFilter::UsingIngredient(id) => request.query(&[("ingredient_id", id)]),
        };
        self.list(request).await
    }

    async fn save_recipe(&self, id: Option<i64>, payload: &RecipePayload) -> ApiResult<()> {
        let request = match id {
            None => self.http.post(self.url("/api/recipes")),
            Some(id) => self.http.put(self.url("/api/recipes")).query(&[("id", id)]),
        };
        self.empty(request.json(payload)).await
    }

    async fn recipe_ingredients(&self, recipe_id: i64) -> ApiResult<Vec<RecipeIngredient>> {
        let request = self
            .http
            .get(self.url("/api/recipes/ingredients"))
            .query(&[("id", recipe_id)]);
        self.list(request).await
    }
}
