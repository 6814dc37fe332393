//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use pantry_common::catalog_view::SortOrder;
use pantry_common::locations::Direction;
use pantry_common::models::{Category, Classification};
use std::path::PathBuf;

/// Pantry - kitchen inventory and recipe client
#[derive(Parser, Debug)]
#[command(name = "pantryctl")]
#[command(about = "Pantry - ingredient catalog, stock and recipes", long_about = None)]
#[command(version = env!("PANTRY_VERSION"))]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Config file (overrides $PANTRY_CONFIG and defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Server base URL (overrides the config file)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Answer yes to every confirmation
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingredient and seasoning catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogCommands,
    },

    /// Stock on hand
    Inventory {
        #[command(subcommand)]
        action: InventoryCommands,
    },

    /// Storage locations
    Location {
        #[command(subcommand)]
        action: LocationCommands,
    },

    /// Storage location photos
    Photo {
        #[command(subcommand)]
        action: PhotoCommands,
    },

    /// Recipes
    Recipe {
        #[command(subcommand)]
        action: RecipeCommands,
    },
}

/// Fields shared by `catalog add` and `catalog edit`
#[derive(Args, Debug, Default, Clone)]
pub struct EntryFields {
    /// Reading used for sorting and matching
    #[arg(long)]
    pub kana: Option<String>,

    /// ingredient or seasoning
    #[arg(long)]
    pub classification: Option<Classification>,

    /// Ingredient category, e.g. vegetable, meat
    #[arg(long)]
    pub category: Option<Category>,

    /// Default unit for new stock
    #[arg(long)]
    pub unit: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// List entries
    List {
        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        classification: Option<Classification>,

        #[arg(long)]
        category: Option<Category>,

        /// Only entries without a reading
        #[arg(long)]
        no_kana: bool,

        /// kana or newest
        #[arg(long, default_value = "kana")]
        sort: SortOrder,
    },

    /// Show entries resembling a name
    Suggest { query: String },

    /// Create an entry
    Add {
        #[arg(long)]
        name: String,

        #[command(flatten)]
        fields: EntryFields,
    },

    /// Edit an entry
    Edit {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        /// Copy the details of another entry first (merges on save)
        #[arg(long, value_name = "ID")]
        from: Option<i64>,

        #[command(flatten)]
        fields: EntryFields,
    },

    /// Delete an entry
    Delete { id: i64 },

    /// Import entries from a CSV file
    Import { file: PathBuf },

    /// Export the catalog as CSV
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Show which recipes use an entry
    Usage { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum InventoryCommands {
    /// List stock grouped by location
    List {
        #[arg(long)]
        search: Option<String>,
    },

    /// Add stock for a catalog entry
    Add {
        catalog_id: i64,

        /// Omit to record presence without a quantity
        #[arg(long)]
        amount: Option<f64>,

        #[arg(long)]
        unit: Option<String>,

        /// YYYY-MM-DD
        #[arg(long)]
        expires: Option<NaiveDate>,

        #[arg(long)]
        location: Option<String>,

        /// Photo to attach as a preview
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Change a tracked amount by DELTA
    Adjust {
        id: i64,

        #[arg(allow_negative_numbers = true)]
        delta: f64,
    },

    /// Edit an item
    Edit {
        id: i64,

        /// Quantity, or -1 for untracked
        #[arg(long, allow_negative_numbers = true)]
        amount: Option<f64>,

        /// YYYY-MM-DD, or "none" to clear
        #[arg(long, value_parser = parse_expiry)]
        expires: Option<Expiry>,

        #[arg(long)]
        location: Option<String>,
    },

    /// Remove an item that was used up
    Consume { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum LocationCommands {
    /// List locations in display order
    List,

    /// Add a location at the end
    Add { name: String },

    /// Delete a location
    Delete { id: i64 },

    /// Move a location up or down one step
    Move { id: i64, direction: Direction },
}

#[derive(Subcommand, Debug)]
pub enum PhotoCommands {
    /// List photos
    List {
        #[arg(long)]
        location: Option<String>,
    },

    /// Upload photos for a location
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(long)]
        location: Option<String>,
    },

    /// Delete a photo
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum RecipeCommands {
    /// List recipes
    List {
        #[arg(long)]
        search: Option<String>,

        /// Only recipes using this catalog entry
        #[arg(long)]
        ingredient: Option<i64>,
    },

    /// Show a recipe with stock marks
    Show {
        id: i64,

        /// Print the editable ingredient text instead
        #[arg(long)]
        text: bool,
    },

    /// Resolve an ingredient file against the catalog without saving
    Check { file: PathBuf },

    /// Create or update a recipe
    Save {
        #[arg(long)]
        name: String,

        /// Ingredient text, one "name,amount,details" row per line
        #[arg(long)]
        ingredients: PathBuf,

        /// Update this recipe instead of creating one; omitted fields keep
        /// their stored values
        #[arg(long)]
        id: Option<i64>,

        #[arg(long = "yield")]
        yield_text: Option<String>,

        #[arg(long)]
        url: Option<String>,

        /// File holding the cooking steps
        #[arg(long)]
        process: Option<PathBuf>,
    },

    /// Add a recipe's missing ingredients to stock
    Stock {
        id: i64,

        /// One catalog entry
        #[arg(long, conflicts_with = "all", required_unless_present = "all")]
        item: Option<i64>,

        /// Every missing ingredient
        #[arg(long)]
        all: bool,
    },
}

/// Value of `inventory edit --expires`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Clear,
    On(NaiveDate),
}

impl Expiry {
    pub fn into_option(self) -> Option<NaiveDate> {
        match self {
            Expiry::Clear => None,
            Expiry::On(date) => Some(date),
        }
    }
}

pub fn parse_expiry(raw: &str) -> Result<Expiry, String> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") || raw.is_empty() {
        return Ok(Expiry::Clear);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Expiry::On)
        .map_err(|_| format!("invalid date '{}' (expected YYYY-MM-DD or none)", raw))
}
