//! Inventory commands

use super::Context;
use crate::cli::InventoryCommands;
use crate::output;
use anyhow::{Context as _, Result};
use pantry_common::inventory::{group_by_location, matches_search, InventoryManager, ItemEdit, StockRequest};
use pantry_common::models::{Amount, InventoryItem};
use pantry_common::photos::PhotoFile;
use std::path::Path;
use std::sync::Arc;

pub async fn run(ctx: &mut Context, action: InventoryCommands) -> Result<()> {
    let manager = InventoryManager::new(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.prompter),
        ctx.default_location(),
    );

    match action {
        InventoryCommands::List { search } => {
            manager.load(&mut ctx.store).await?;
            let items: Vec<InventoryItem> = ctx
                .store
                .inventory()
                .iter()
                .filter(|item| search.as_deref().map_or(true, |q| matches_search(item, q)))
                .cloned()
                .collect();
            let grouped = group_by_location(&items, ctx.store.locations(), manager.default_location());
            let today = chrono::Local::now().date_naive();
            output::display_inventory(&grouped, today, ctx.config.inventory.soon_days);
            Ok(())
        }

        InventoryCommands::Add {
            catalog_id,
            amount,
            unit,
            expires,
            location,
            image,
        } => {
            let image_path = match image {
                Some(path) => {
                    let file = read_photo(&path)?;
                    Some(ctx.photo_manager().upload_item_image(&file).await?)
                }
                None => None,
            };
            let request = StockRequest {
                catalog_id,
                amount,
                unit,
                expiration_date: expires,
                location,
                image_path,
            };
            let item = manager.add(&mut ctx.store, &request).await?;
            output::display_success(&format!(
                "Added {} ({}) to {}",
                item.name,
                item.amount.display_with_unit(&item.unit),
                item.location
            ));
            Ok(())
        }

        InventoryCommands::Adjust { id, delta } => {
            let amount = manager.adjust(&mut ctx.store, id, delta).await?;
            let unit = ctx
                .store
                .inventory_item(id)
                .map(|i| i.unit.clone())
                .unwrap_or_default();
            output::display_success(&format!("Now {}", amount.display_with_unit(&unit)));
            Ok(())
        }

        InventoryCommands::Edit {
            id,
            amount,
            expires,
            location,
        } => {
            let edit = ItemEdit {
                amount: amount.map(Amount::from_wire),
                expiration_date: expires.map(|e| e.into_option()),
                location,
            };
            manager.edit(&mut ctx.store, id, &edit).await?;
            output::display_success(&format!("Updated item {}", id));
            Ok(())
        }

        InventoryCommands::Consume { id } => {
            if manager.consume(&mut ctx.store, id).await? {
                output::display_success(&format!("Removed item {}", id));
            }
            Ok(())
        }
    }
}

pub(crate) fn read_photo(path: &Path) -> Result<PhotoFile> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo.jpg".to_string());
    Ok(PhotoFile { name, bytes })
}
