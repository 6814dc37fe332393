//! Recipe commands

use super::Context;
use crate::cli::RecipeCommands;
use crate::output;
use anyhow::{bail, Context as _, Result};
use pantry_common::api::RecipeFilter;
use pantry_common::cross_ref::{AddOutcome, StockCoordinator};
use pantry_common::error::PantryError;
use pantry_common::models::{Recipe, RecipePayload};
use pantry_common::resolver::{unresolved_names, RecipeDraft, RecipeSaveOutcome, RecipeSaver};
use std::path::Path;
use std::sync::Arc;

pub async fn run(ctx: &mut Context, action: RecipeCommands) -> Result<()> {
    match action {
        RecipeCommands::List { search, ingredient } => {
            let filter = ingredient.map_or(RecipeFilter::All, RecipeFilter::UsingIngredient);
            let recipes = ctx.api.list_recipes(filter).await?;
            let shown: Vec<&Recipe> = recipes
                .iter()
                .filter(|r| search.as_deref().map_or(true, |q| name_matches(r, q)))
                .collect();
            output::display_recipes(&shown);
            Ok(())
        }

        RecipeCommands::Show { id, text } => {
            let recipe = find_recipe(ctx, id).await?;
            let rows = coordinator(ctx).recipe_rows(&mut ctx.store, id).await?;
            if text {
                print!("{}", RecipeDraft::from_existing(&recipe, &rows).payload.csv_data);
            } else {
                output::display_recipe(&recipe, &rows);
            }
            Ok(())
        }

        RecipeCommands::Check { file } => {
            let csv_data = read_text(&file)?;
            let name = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "recipe".to_string());
            let draft = RecipeDraft::new(RecipePayload {
                name,
                csv_data,
                ..Default::default()
            });
            let saver = RecipeSaver::new(Arc::clone(&ctx.api), Arc::clone(&ctx.prompter));
            let resolved = saver.check(&mut ctx.store, &draft).await?;
            output::display_check(&resolved);

            let missing = unresolved_names(&resolved);
            if missing.is_empty() {
                output::display_success("Every ingredient is in the catalog");
            } else {
                output::display_warning(&format!(
                    "Will be registered on save: {}",
                    missing.join(", ")
                ));
            }
            Ok(())
        }

        RecipeCommands::Save {
            name,
            ingredients,
            id,
            yield_text,
            url,
            process,
        } => {
            let stored = match id {
                Some(id) => Some(find_recipe(ctx, id).await?),
                None => None,
            };
            let process = match process {
                Some(path) => Some(read_text(&path)?),
                None => None,
            };
            let draft = RecipeDraft {
                id,
                payload: RecipePayload {
                    name: name.trim().to_string(),
                    yield_text: yield_text
                        .or_else(|| stored.as_ref().map(|r| r.yield_text.clone()))
                        .unwrap_or_default(),
                    url: url
                        .or_else(|| stored.as_ref().map(|r| r.url.clone()))
                        .unwrap_or_default(),
                    process: process
                        .or_else(|| stored.as_ref().map(|r| r.process.clone()))
                        .unwrap_or_default(),
                    csv_data: read_text(&ingredients)?,
                },
            };

            let saver = RecipeSaver::new(Arc::clone(&ctx.api), Arc::clone(&ctx.prompter));
            let report = saver.save(&mut ctx.store, &draft).await?;
            match report.outcome {
                RecipeSaveOutcome::Saved { registered } => {
                    for name in &registered {
                        output::display_info(&format!("Registered \"{}\" in the catalog", name));
                    }
                    output::display_success(&format!("Saved recipe \"{}\"", draft.payload.name));
                }
                RecipeSaveOutcome::RegistrationCancelled { missing } => {
                    output::display_info(&format!(
                        "Recipe not saved; still missing: {}",
                        missing.join(", ")
                    ));
                }
            }
            Ok(())
        }

        RecipeCommands::Stock { id, item, all } => {
            let stock = coordinator(ctx);
            let rows = stock.recipe_rows(&mut ctx.store, id).await?;

            if all {
                let report = stock.add_all_missing(&mut ctx.store, &rows).await?;
                output::display_bulk_add(&report);
                if !report.failed.is_empty() {
                    bail!("{} of {} item(s) failed", report.failed.len(), report.attempted());
                }
                return Ok(());
            }

            let Some(catalog_id) = item else {
                bail!("Pass --item or --all");
            };
            let row = rows
                .iter()
                .find(|r| r.catalog_id == Some(catalog_id))
                .ok_or_else(|| {
                    PantryError::NotFound(format!("catalog entry {} in recipe {}", catalog_id, id))
                })?;
            match stock.add_one(&mut ctx.store, row).await? {
                AddOutcome::Added(added) => {
                    output::display_success(&format!("Added {} to {}", row.name, added.location))
                }
                AddOutcome::AlreadyInStock => {
                    output::display_info(&format!("{} is already in stock", row.name))
                }
                AddOutcome::Declined => {}
            }
            Ok(())
        }
    }
}

fn coordinator(ctx: &Context) -> StockCoordinator {
    StockCoordinator::new(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.prompter),
        ctx.default_location(),
    )
}

async fn find_recipe(ctx: &Context, id: i64) -> Result<Recipe> {
    let recipes = ctx.api.list_recipes(RecipeFilter::All).await?;
    let recipe = recipes
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(|| PantryError::NotFound(format!("recipe {}", id)))?;
    Ok(recipe)
}

fn name_matches(recipe: &Recipe, query: &str) -> bool {
    recipe.name.to_lowercase().contains(&query.trim().to_lowercase())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_search_ignores_case() {
        let recipe = Recipe {
            name: "Nikujaga".into(),
            ..Default::default()
        };
        assert!(name_matches(&recipe, "JAGA"));
        assert!(!name_matches(&recipe, "curry"));
    }
}
