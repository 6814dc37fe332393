//! Output formatting - ASCII only

use chrono::NaiveDate;
use owo_colors::OwoColorize;
use pantry_common::catalog_view;
use pantry_common::cross_ref::{group_runs, missing_rows, BulkAddReport};
use pantry_common::inventory::{expiry_status, ExpiryStatus};
use pantry_common::models::{CatalogEntry, InventoryItem, Location, Recipe, RecipeIngredient};
use pantry_common::photos::PhotoBatchReport;
use pantry_common::resolver::ResolvedRow;

pub const SEPARATOR: &str = "------------------------------------------------------------";

pub fn display_success(message: &str) {
    println!("[OK] {}", message.green());
}

pub fn display_error(message: &str) {
    eprintln!("[ERROR] {}", message.red());
}

pub fn display_warning(message: &str) {
    println!("[WARNING] {}", message.yellow());
}

pub fn display_info(message: &str) {
    println!("[INFO] {}", message);
}

pub fn catalog_line(entry: &CatalogEntry) -> String {
    let reading = match entry.kana.as_deref() {
        Some(k) if entry.has_reading() => k.to_string(),
        _ => "(no reading)".to_string(),
    };
    let unit = if entry.default_unit.is_empty() {
        String::new()
    } else {
        format!(" [{}]", entry.default_unit)
    };
    format!("{:>5}  {}  {}  {}{}", entry.id, entry.name, reading, entry.tag(), unit)
}

pub fn display_catalog(entries: &[&CatalogEntry]) {
    if entries.is_empty() {
        display_info("No catalog entries match.");
        return;
    }
    for entry in entries {
        if entry.has_reading() {
            println!("{}", catalog_line(entry));
        } else {
            println!("{}", catalog_line(entry).dimmed());
        }
    }
    println!("{}", SEPARATOR.dimmed());
    println!("{} entries", entries.len());
}

pub fn display_suggestions(query: &str, entries: &[&CatalogEntry]) {
    if entries.is_empty() {
        display_info(&format!("Nothing in the catalog resembles \"{}\".", query));
        return;
    }
    println!("Similar entries for \"{}\":", query);
    for entry in entries {
        println!("  {}", catalog_line(entry));
    }
}

pub fn sorted_catalog<'a>(
    catalog: &'a [CatalogEntry],
    filter: &catalog_view::CatalogFilter,
    order: catalog_view::SortOrder,
) -> Vec<&'a CatalogEntry> {
    catalog_view::list(catalog, filter, order)
}

fn expiry_text(status: ExpiryStatus) -> String {
    let label = status.label();
    match status {
        ExpiryStatus::Expired { .. } | ExpiryStatus::Today => format!("  {}", label.red()),
        ExpiryStatus::Soon { .. } => format!("  {}", label.yellow()),
        ExpiryStatus::None | ExpiryStatus::Normal => String::new(),
    }
}

pub fn inventory_line(item: &InventoryItem, today: NaiveDate, soon_days: i64) -> String {
    let expires = item
        .expiration_date
        .map(|d| format!("  exp {}", d.format("%Y-%m-%d")))
        .unwrap_or_default();
    let recipes = if item.recipe_count > 0 {
        format!("  ({} recipes)", item.recipe_count)
    } else {
        String::new()
    };
    format!(
        "{:>5}  {}  {}{}{}{}",
        item.id,
        item.name,
        item.amount.display_with_unit(&item.unit),
        expires,
        expiry_text(expiry_status(item.expiration_date, today, soon_days)),
        recipes
    )
}

pub fn display_inventory(
    grouped: &[(String, Vec<&InventoryItem>)],
    today: NaiveDate,
    soon_days: i64,
) {
    for (location, items) in grouped {
        println!("[{}]", location.bold());
        if items.is_empty() {
            println!("  {}", "(empty)".dimmed());
        }
        for item in items {
            println!("  {}", inventory_line(item, today, soon_days));
        }
    }

    let flagged = attention_count(grouped, today, soon_days);
    if flagged > 0 {
        display_warning(&format!("{} item(s) expired or expiring soon.", flagged));
    }
}

/// Items whose expiry is past, today or within `soon_days`
pub fn attention_count(
    grouped: &[(String, Vec<&InventoryItem>)],
    today: NaiveDate,
    soon_days: i64,
) -> usize {
    grouped
        .iter()
        .flat_map(|(_, items)| items.iter())
        .filter(|item| expiry_status(item.expiration_date, today, soon_days).needs_attention())
        .count()
}

pub fn display_locations(locations: &[Location]) {
    for location in locations {
        println!("{:>5}  {:>3}  {}", location.id, location.priority, location.name);
    }
}

pub fn display_recipes(recipes: &[&Recipe]) {
    if recipes.is_empty() {
        display_info("No recipes found.");
        return;
    }
    for recipe in recipes {
        let ingredients = if recipe.has_ingredients { "[OK]" } else { "[--]" };
        let seasonings = if recipe.has_seasonings { "[OK]" } else { "[--]" };
        println!(
            "{:>5}  ingredients {}  seasonings {}  {}",
            recipe.id, ingredients, seasonings, recipe.name
        );
    }
}

fn ingredient_line(row: &RecipeIngredient) -> String {
    let mark = if row.in_stock {
        "[OK]".green().to_string()
    } else {
        "[--]".red().to_string()
    };
    let mut line = format!("{} {} {}{}", mark, row.name, row.amount, row.unit);
    if !row.details.is_empty() {
        line.push_str(&format!(" ({})", row.details));
    }
    line
}

pub fn display_recipe(recipe: &Recipe, rows: &[RecipeIngredient]) {
    println!("{}", recipe.name.bold());
    if !recipe.yield_text.is_empty() {
        println!("Yield: {}", recipe.yield_text);
    }
    if !recipe.url.is_empty() {
        println!("Source: {}", recipe.url);
    }
    println!("{}", SEPARATOR.dimmed());
    for group in group_runs(rows) {
        let indent = if group.name.is_empty() {
            ""
        } else {
            println!("  <{}>", group.name);
            "  "
        };
        for row in group.rows {
            println!("  {}{}", indent, ingredient_line(row));
        }
    }

    let missing = missing_rows(rows);
    if !missing.is_empty() {
        println!();
        let names: Vec<&str> = missing.iter().map(|r| r.name.as_str()).collect();
        display_warning(&format!("Missing: {}", names.join(", ")));
    }
    if !recipe.process.is_empty() {
        println!("{}", SEPARATOR.dimmed());
        println!("{}", recipe.process);
    }
}

pub fn display_check(rows: &[ResolvedRow]) {
    for resolved in rows {
        let row = &resolved.row;
        let group = if row.group_name.is_empty() {
            String::new()
        } else {
            format!(" <{}>", row.group_name)
        };
        match resolved.catalog_id {
            Some(id) => println!(
                "{:>4}  {} {}{}{}  -> #{}",
                row.line, row.name, row.amount, row.unit, group, id
            ),
            None => println!(
                "{:>4}  {} {}{}{}  -> {}",
                row.line,
                row.name,
                row.amount,
                row.unit,
                group,
                "not in catalog".red()
            ),
        }
    }
}

pub fn display_bulk_add(report: &BulkAddReport) {
    if report.declined {
        display_info("Nothing added.");
        return;
    }
    if report.attempted() == 0 {
        display_info("Everything is already in stock.");
        return;
    }
    for name in &report.added {
        display_success(&format!("Added {}", name));
    }
    for (name, err) in &report.failed {
        display_error(&format!("{}: {}", name, err));
    }
    if !report.failed.is_empty() {
        display_warning(&format!(
            "{} of {} item(s) were not added; the others were kept",
            report.failed.len(),
            report.attempted()
        ));
    }
}

pub fn display_photo_batch(report: &PhotoBatchReport) {
    for photo in &report.uploaded {
        display_success(&format!("Uploaded {} ({})", photo.image_path, photo.location));
    }
    for (name, reason) in &report.failed {
        display_error(&format!("{}: {}", name, reason));
    }
    for name in &report.skipped {
        display_warning(&format!("Skipped {} (batch limit)", name));
    }
}
