//! Location photos and item images.
//!
//! Every image is shrunk to JPEG before upload. Location photos then get a
//! record tying the stored file to a location. Batches are capped, and a
//! failure on one file does not stop the others.

use crate::api::PantryApi;
use crate::config::PhotoSettings;
use crate::error::{PantryError, Result};
use crate::models::FridgePhoto;
use crate::prompt::{Confirmation, Prompter};
use crate::store::{PantryStore, Scope};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSpec {
    pub max_edge: u32,
    /// JPEG quality in 0.1..=1.0
    pub quality: f32,
}

impl ResizeSpec {
    pub fn location_photo(settings: &PhotoSettings) -> Self {
        Self {
            max_edge: settings.effective_max_edge(),
            quality: settings.effective_quality(),
        }
    }

    pub fn item_preview(settings: &PhotoSettings) -> Self {
        Self {
            max_edge: settings.effective_preview_edge(),
            quality: settings.effective_quality(),
        }
    }

    /// Quality on the 1-100 scale JPEG encoders use
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality.clamp(0.1, 1.0) * 100.0).round() as u8
    }
}

/// Dimensions that fit within `max_edge` with the aspect ratio kept.
/// Images already small enough are left alone. A zero edge is treated as 1.
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let max_edge = max_edge.max(1);
    let longest = width.max(height);
    if longest <= max_edge {
        return (width, height);
    }
    let scale = max_edge as f64 / longest as f64;
    let w = ((width as f64 * scale).round() as u32).max(1);
    let h = ((height as f64 * scale).round() as u32).max(1);
    (w, h)
}

/// Decodes, shrinks and re-encodes an image as JPEG
pub trait ImageResizer: Send + Sync {
    fn resize(&self, bytes: &[u8], spec: ResizeSpec) -> Result<Vec<u8>>;
}

/// One file to upload
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoBatchReport {
    pub uploaded: Vec<FridgePhoto>,
    /// File name and reason
    pub failed: Vec<(String, String)>,
    /// Files beyond the batch cap
    pub skipped: Vec<String>,
}

pub fn photos_for_location<'a>(photos: &'a [FridgePhoto], location: &str, default: &str) -> Vec<&'a FridgePhoto> {
    photos
        .iter()
        .filter(|p| {
            let own = if p.location.is_empty() { default } else { p.location.as_str() };
            own == location
        })
        .collect()
}

pub struct PhotoManager {
    api: Arc<dyn PantryApi>,
    prompter: Arc<dyn Prompter>,
    resizer: Arc<dyn ImageResizer>,
    settings: PhotoSettings,
}

impl PhotoManager {
    pub fn new(
        api: Arc<dyn PantryApi>,
        prompter: Arc<dyn Prompter>,
        resizer: Arc<dyn ImageResizer>,
        settings: PhotoSettings,
    ) -> Self {
        Self {
            api,
            prompter,
            resizer,
            settings,
        }
    }

    /// Shrink and upload one image; returns the stored file name
    async fn upload(&self, file: &PhotoFile, spec: ResizeSpec) -> Result<String> {
        let jpeg = self.resizer.resize(&file.bytes, spec)?;
        let receipt = self.api.upload_image(&file.name, jpeg).await?;
        if !receipt.is_success() {
            return Err(PantryError::Image(format!(
                "upload of {} not accepted (status {})",
                file.name, receipt.status
            )));
        }
        Ok(receipt.filename)
    }

    pub async fn upload_location_photos(
        &self,
        store: &mut PantryStore,
        files: Vec<PhotoFile>,
        location: &str,
    ) -> Result<PhotoBatchReport> {
        let cap = self.settings.effective_max_batch();
        let mut report = PhotoBatchReport::default();
        let spec = ResizeSpec::location_photo(&self.settings);

        for (index, file) in files.into_iter().enumerate() {
            if index >= cap {
                report.skipped.push(file.name);
                continue;
            }
            let stored = match self.upload(&file, spec).await {
                Ok(stored) => stored,
                Err(e) => {
                    warn!("Photo {} failed: {}", file.name, e);
                    report.failed.push((file.name, e.to_string()));
                    continue;
                }
            };
            match self.api.add_photo(&stored, location).await {
                Ok(photo) => report.uploaded.push(photo),
                Err(e) => {
                    warn!("Photo record for {} failed: {}", file.name, e);
                    report.failed.push((file.name, e.to_string()));
                }
            }
        }

        if !report.skipped.is_empty() {
            info!("Skipped {} photo(s) beyond the batch limit of {}", report.skipped.len(), cap);
        }
        if !report.uploaded.is_empty() {
            store.refresh_after_write(self.api.as_ref(), Scope::Photos).await;
        }
        Ok(report)
    }

    /// Upload an inline item image at preview size
    pub async fn upload_item_image(&self, file: &PhotoFile) -> Result<String> {
        self.upload(file, ResizeSpec::item_preview(&self.settings)).await
    }

    pub async fn delete(&self, store: &mut PantryStore, id: i64) -> Result<bool> {
        store.ensure_fresh(self.api.as_ref(), Scope::Photos).await?;
        let image_path = store
            .photos()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.image_path.clone())
            .ok_or_else(|| PantryError::NotFound(format!("photo {}", id)))?;
        if !self.prompter.confirm(&Confirmation::DeletePhoto { image_path }) {
            return Ok(false);
        }
        self.api.delete_photo(id).await?;
        store.refresh_after_write(self.api.as_ref(), Scope::Photos).await;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_api::{Endpoint, FakePantryApi};
    use crate::prompt::ScriptedPrompter;

    /// Passes bytes through; empty input fails like an undecodable file
    struct PassThrough;

    impl ImageResizer for PassThrough {
        fn resize(&self, bytes: &[u8], _spec: ResizeSpec) -> Result<Vec<u8>> {
            if bytes.is_empty() {
                return Err(PantryError::Image("not an image".into()));
            }
            Ok(bytes.to_vec())
        }
    }

    fn file(name: &str, bytes: &[u8]) -> PhotoFile {
        PhotoFile {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(4000, 3000, 800), (800, 600));
        assert_eq!(fit_within(3000, 4000, 800), (600, 800));
        assert_eq!(fit_within(640, 480, 800), (640, 480));
        assert_eq!(fit_within(5000, 10, 800), (800, 2));
        assert_eq!(fit_within(4000, 3000, 0), (1, 1));
    }

    #[test]
    fn test_zero_edge_settings_still_shrink() {
        let settings = PhotoSettings {
            max_edge_px: 0,
            preview_edge_px: 0,
            ..Default::default()
        };
        let photo = ResizeSpec::location_photo(&settings);
        let preview = ResizeSpec::item_preview(&settings);
        assert_eq!(fit_within(4000, 3000, photo.max_edge), (100, 75));
        assert_eq!(fit_within(4000, 3000, preview.max_edge), (100, 75));
    }

    #[test]
    fn test_quality_scale() {
        let spec = ResizeSpec::location_photo(&PhotoSettings::default());
        assert_eq!(spec.max_edge, 800);
        assert_eq!(spec.jpeg_quality(), 70);
        assert_eq!(ResizeSpec::item_preview(&PhotoSettings::default()).max_edge, 600);
    }

    #[tokio::test]
    async fn test_batch_cap_and_per_file_failure() {
        let api = Arc::new(FakePantryApi::new());
        let manager = PhotoManager::new(
            api.clone(),
            Arc::new(ScriptedPrompter::new()),
            Arc::new(PassThrough),
            PhotoSettings::default(),
        );
        let mut store = PantryStore::new();

        let files = vec![file("a.jpg", b""), file("b.jpg", b"jpeg"), file("c.jpg", b"jpeg")];
        let report = manager
            .upload_location_photos(&mut store, files, "Fridge")
            .await
            .unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "a.jpg");
        assert_eq!(report.uploaded.len(), 1);
        assert_eq!(report.uploaded[0].location, "Fridge");
        assert_eq!(report.skipped, vec!["c.jpg"]);
        assert_eq!(api.calls_to(Endpoint::Upload).len(), 1);
        assert_eq!(store.photos().len(), 1);
    }

    #[test]
    fn test_photos_without_location_belong_to_default() {
        let photos = vec![
            FridgePhoto {
                id: 1,
                image_path: "a.jpg".into(),
                location: String::new(),
                created_at: String::new(),
            },
            FridgePhoto {
                id: 2,
                image_path: "b.jpg".into(),
                location: "Fridge".into(),
                created_at: String::new(),
            },
        ];
        assert_eq!(photos_for_location(&photos, "Other", "Other").len(), 1);
        assert_eq!(photos_for_location(&photos, "Fridge", "Other")[0].id, 2);
    }
}
