//! Catalog commands

use super::Context;
use crate::cli::{CatalogCommands, EntryFields};
use crate::output;
use anyhow::{Context as _, Result};
use pantry_common::catalog_view::CatalogFilter;
use pantry_common::error::PantryError;
use pantry_common::impact::GateDecision;
use pantry_common::models::{CatalogEntry, Classification};
use pantry_common::reconcile::{CatalogController, CatalogDraft, SaveOutcome, SaveReport};
use pantry_common::store::Scope;
use std::sync::Arc;

pub async fn run(ctx: &mut Context, action: CatalogCommands) -> Result<()> {
    let controller = CatalogController::new(Arc::clone(&ctx.api), Arc::clone(&ctx.prompter));

    match action {
        CatalogCommands::List {
            search,
            classification,
            category,
            no_kana,
            sort,
        } => {
            ctx.store.ensure_fresh(ctx.api.as_ref(), Scope::Catalog).await?;
            let filter = CatalogFilter {
                search,
                classification,
                category,
                missing_reading: no_kana,
            };
            output::display_catalog(&output::sorted_catalog(ctx.store.catalog(), &filter, sort));
            Ok(())
        }

        CatalogCommands::Suggest { query } => {
            ctx.store.ensure_fresh(ctx.api.as_ref(), Scope::Catalog).await?;
            output::display_suggestions(&query, &controller.suggest(&ctx.store, query.trim()));
            Ok(())
        }

        CatalogCommands::Add { name, fields } => {
            let mut entry = CatalogEntry::new(
                name.trim(),
                fields.classification.unwrap_or(Classification::Ingredient),
            );
            apply_fields(&mut entry, &fields);
            let report = controller.save(&mut ctx.store, &CatalogDraft::create(entry)).await?;
            report_save(&name, &report);
            Ok(())
        }

        CatalogCommands::Edit {
            id,
            name,
            from,
            fields,
        } => {
            ctx.store.ensure_fresh(ctx.api.as_ref(), Scope::Catalog).await?;
            let original = ctx
                .store
                .catalog_entry(id)
                .cloned()
                .ok_or_else(|| PantryError::NotFound(format!("catalog entry {}", id)))?;
            let mut draft = CatalogDraft::edit(original);

            if let Some(source) = from {
                let suggestion = ctx
                    .store
                    .catalog_entry(source)
                    .cloned()
                    .ok_or_else(|| PantryError::NotFound(format!("catalog entry {}", source)))?;
                if let GateDecision::Abort(reason) = controller.apply_suggestion(&mut draft, &suggestion) {
                    output::display_info(&format!("Nothing saved ({})", reason.as_str()));
                    return Ok(());
                }
            }
            if let Some(name) = name {
                draft.edited.name = name.trim().to_string();
            }
            apply_fields(&mut draft.edited, &fields);

            let label = draft.edited.name.clone();
            let report = controller.save(&mut ctx.store, &draft).await?;
            report_save(&label, &report);
            Ok(())
        }

        CatalogCommands::Delete { id } => {
            if controller.delete(&mut ctx.store, id).await? {
                output::display_success(&format!("Deleted catalog entry {}", id));
            }
            Ok(())
        }

        CatalogCommands::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let report = controller.import_csv(&mut ctx.store, &text).await?;
            output::display_success(&format!(
                "Imported {} entries ({} skipped)",
                report.added, report.skipped
            ));
            for error in &report.errors {
                output::display_warning(error);
            }
            Ok(())
        }

        CatalogCommands::Export { output: target } => {
            let csv = controller.export_csv().await?;
            match target {
                Some(path) => {
                    std::fs::write(&path, csv)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    output::display_success(&format!("Catalog written to {}", path.display()));
                }
                None => print!("{}", csv),
            }
            Ok(())
        }

        CatalogCommands::Usage { id } => {
            let usage = ctx.api.catalog_usage(id).await?;
            if usage.recipe_count == 0 {
                output::display_info("Not used by any recipe.");
            } else {
                println!("Used by {} recipe(s):", usage.recipe_count);
                for name in &usage.recipe_names {
                    println!("  {}", name);
                }
            }
            Ok(())
        }
    }
}

/// Flags given on the command line override the draft
fn apply_fields(entry: &mut CatalogEntry, fields: &EntryFields) {
    if let Some(kana) = &fields.kana {
        let kana = kana.trim();
        entry.kana = if kana.is_empty() { None } else { Some(kana.to_string()) };
    }
    if let Some(classification) = fields.classification {
        entry.classification = classification;
    }
    if let Some(category) = &fields.category {
        entry.category = Some(category.clone());
    }
    if let Some(unit) = &fields.unit {
        entry.default_unit = unit.trim().to_string();
    }
}

fn report_save(name: &str, report: &SaveReport) {
    match report.outcome {
        SaveOutcome::Saved => output::display_success(&format!("Saved \"{}\"", name.trim())),
        SaveOutcome::ForceSaved => {
            output::display_success(&format!("Merged \"{}\" into the existing entry", name.trim()))
        }
        SaveOutcome::Aborted(reason) => {
            output::display_info(&format!("Nothing saved ({})", reason.as_str()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_common::models::Category;

    #[test]
    fn test_apply_fields_overrides_only_given() {
        let mut entry = CatalogEntry::new("Tomato", Classification::Ingredient);
        entry.default_unit = "piece".into();
        entry.kana = Some("tomato".into());

        let fields = EntryFields {
            category: Some(Category::Vegetable),
            kana: Some("  ".into()),
            ..Default::default()
        };
        apply_fields(&mut entry, &fields);

        assert_eq!(entry.default_unit, "piece");
        assert_eq!(entry.category, Some(Category::Vegetable));
        assert_eq!(entry.kana, None);
    }
}
