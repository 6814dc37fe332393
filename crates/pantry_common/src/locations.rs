//! Storage locations: add, delete, reorder.
//!
//! Order is the `priority` field. Any reorder sends the whole list back
//! with priorities renumbered from 1.

use crate::api::PantryApi;
use crate::error::{PantryError, Result};
use crate::models::Location;
use crate::prompt::{Confirmation, Prompter};
use crate::store::{PantryStore, Scope};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(format!("unknown direction '{}' (expected up or down)", other)),
        }
    }
}

/// New order with `id` swapped one step; `None` when it cannot move
pub fn moved(locations: &[Location], id: i64, direction: Direction) -> Option<Vec<Location>> {
    let index = locations.iter().position(|l| l.id == id)?;
    let other = match direction {
        Direction::Up => index.checked_sub(1)?,
        Direction::Down if index + 1 < locations.len() => index + 1,
        Direction::Down => return None,
    };
    let mut ordered = locations.to_vec();
    ordered.swap(index, other);
    Some(renumbered(ordered))
}

pub fn renumbered(mut ordered: Vec<Location>) -> Vec<Location> {
    for (i, location) in ordered.iter_mut().enumerate() {
        location.priority = i as i64 + 1;
    }
    ordered
}

pub struct LocationManager {
    api: Arc<dyn PantryApi>,
    prompter: Arc<dyn Prompter>,
}

impl LocationManager {
    pub fn new(api: Arc<dyn PantryApi>, prompter: Arc<dyn Prompter>) -> Self {
        Self { api, prompter }
    }

    pub async fn add(&self, store: &mut PantryStore, name: &str) -> Result<Location> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PantryError::Validation("Location name is required".to_string()));
        }
        store.ensure_fresh(self.api.as_ref(), Scope::Locations).await?;
        if store.locations().iter().any(|l| l.name == name) {
            return Err(PantryError::Validation(format!(
                "Location \"{}\" already exists",
                name
            )));
        }
        let location = self.api.add_location(name).await?;
        info!("Added location '{}'", name);
        store.refresh_after_write(self.api.as_ref(), Scope::Locations).await;
        Ok(location)
    }

    pub async fn delete(&self, store: &mut PantryStore, id: i64) -> Result<bool> {
        store.ensure_fresh(self.api.as_ref(), Scope::Locations).await?;
        let name = store
            .locations()
            .iter()
            .find(|l| l.id == id)
            .map(|l| l.name.clone())
            .ok_or_else(|| PantryError::NotFound(format!("location {}", id)))?;
        if !self.prompter.confirm(&Confirmation::DeleteLocation { name: name.clone() }) {
            return Ok(false);
        }
        self.api.delete_location(id).await?;
        info!("Deleted location '{}'", name);
        store.refresh_after_write(self.api.as_ref(), Scope::Locations).await;
        Ok(true)
    }

    /// Returns false when already at that end of the list
    pub async fn shift(&self, store: &mut PantryStore, id: i64, direction: Direction) -> Result<bool> {
        store.ensure_fresh(self.api.as_ref(), Scope::Locations).await?;
        if !store.locations().iter().any(|l| l.id == id) {
            return Err(PantryError::NotFound(format!("location {}", id)));
        }
        let Some(ordered) = moved(store.locations(), id, direction) else {
            return Ok(false);
        };
        self.api.reorder_locations(&ordered).await?;
        store.refresh_after_write(self.api.as_ref(), Scope::Locations).await;
        Ok(true)
    }
}
