//! Photo commands

use super::inventory::read_photo;
use super::Context;
use crate::cli::PhotoCommands;
use crate::output;
use anyhow::{bail, Result};
use pantry_common::inventory::resolve_location;
use pantry_common::photos::photos_for_location;
use pantry_common::store::Scope;

pub async fn run(ctx: &mut Context, action: PhotoCommands) -> Result<()> {
    let manager = ctx.photo_manager();

    match action {
        PhotoCommands::List { location } => {
            ctx.store.refresh(ctx.api.as_ref(), Scope::Photos).await?;
            let photos: Vec<_> = match location.as_deref() {
                Some(name) => photos_for_location(ctx.store.photos(), name, ctx.default_location()),
                None => ctx.store.photos().iter().collect(),
            };
            if photos.is_empty() {
                output::display_info("No photos.");
            }
            for photo in photos {
                println!("{:>5}  {}  {}  {}", photo.id, photo.location, photo.image_path, photo.created_at);
            }
            Ok(())
        }

        PhotoCommands::Upload { files, location } => {
            ctx.store.ensure_fresh(ctx.api.as_ref(), Scope::Locations).await?;
            let location = resolve_location(location.as_deref(), ctx.store.locations(), ctx.default_location());
            let files = files
                .iter()
                .map(|path| read_photo(path))
                .collect::<Result<Vec<_>>>()?;

            let report = manager.upload_location_photos(&mut ctx.store, files, &location).await?;
            output::display_photo_batch(&report);
            if !report.failed.is_empty() {
                bail!("{} photo(s) failed to upload", report.failed.len());
            }
            Ok(())
        }

        PhotoCommands::Delete { id } => {
            if manager.delete(&mut ctx.store, id).await? {
                output::display_success(&format!("Deleted photo {}", id));
            }
            Ok(())
        }
    }
}
