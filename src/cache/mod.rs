//! Cache module for storing recipes on disk
//!
//! This module provides a recipe store that persists each recipe as a pretty-printed
//! JSON file under its own directory. Reads go through the recipe schema, so a file
//! that exists but no longer validates is reported as invalid rather than returned.

mod manager;

pub use manager::{CacheRead, RecipeStore, RECIPE_FILE_NAME};
