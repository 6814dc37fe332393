//! Location commands

use super::Context;
use crate::cli::LocationCommands;
use crate::output;
use anyhow::Result;
use pantry_common::locations::LocationManager;
use pantry_common::store::Scope;
use std::sync::Arc;

pub async fn run(ctx: &mut Context, action: LocationCommands) -> Result<()> {
    let manager = LocationManager::new(Arc::clone(&ctx.api), Arc::clone(&ctx.prompter));

    match action {
        LocationCommands::List => {
            ctx.store.refresh(ctx.api.as_ref(), Scope::Locations).await?;
            output::display_locations(ctx.store.locations());
        }
        LocationCommands::Add { name } => {
            let location = manager.add(&mut ctx.store, &name).await?;
            output::display_success(&format!("Added location {} ({})", location.name, location.id));
        }
        LocationCommands::Delete { id } => {
            if manager.delete(&mut ctx.store, id).await? {
                output::display_success(&format!("Deleted location {}", id));
            }
        }
        LocationCommands::Move { id, direction } => {
            if manager.shift(&mut ctx.store, id, direction).await? {
                output::display_locations(ctx.store.locations());
            } else {
                output::display_info("Already at the edge; order unchanged.");
            }
        }
    }
    Ok(())
}
