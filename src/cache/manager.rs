//! Recipe store for persisting recipes to disk
//!
//! Provides a `RecipeStore` that maps each recipe identifier to
//! `<root>/<id>/recipe.json` and reports every read as a hit, a miss, or an
//! invalid entry.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use directories::ProjectDirs;
use tokio::fs;

use crate::data::{Recipe, RecipeSchema};

/// File name of a persisted recipe inside its identifier directory
pub const RECIPE_FILE_NAME: &str = "recipe.json";

/// Outcome of reading one cache entry
#[derive(Debug, Clone, PartialEq)]
pub enum CacheRead {
    /// The entry exists and passed validation
    Hit(Recipe),
    /// No entry exists for the identifier
    Missing,
    /// The entry exists but could not be read, parsed, or validated
    Invalid(String),
}

/// Reads and writes recipe files under a single root directory
///
/// The root is `~/.cache/recipebox/` on Linux unless a directory is supplied
/// explicitly. Entries are written once and never expire.
#[derive(Debug, Clone)]
pub struct RecipeStore {
    /// Directory holding one subdirectory per recipe identifier
    root: PathBuf,
    schema: Arc<RecipeSchema>,
}

impl RecipeStore {
    /// Creates a store rooted at the given directory
    pub fn with_dir(root: PathBuf, schema: Arc<RecipeSchema>) -> Self {
        Self { root, schema }
    }

    /// Returns the platform cache directory for recipes
    ///
    /// Returns `None` if the directory cannot be determined (e.g., no home directory).
    pub fn default_dir() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "recipebox")?;
        Some(project_dirs.cache_dir().to_path_buf())
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Schema every read is validated against
    pub fn schema(&self) -> &Arc<RecipeSchema> {
        &self.schema
    }

    /// Returns the path of the recipe file for the given identifier
    ///
    /// The identifier must already be checked as path-safe by the caller.
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(id).join(RECIPE_FILE_NAME)
    }

    /// Reads and validates the entry for `id`
    ///
    /// Never fails: I/O, parse and validation problems are reported as
    /// [`CacheRead::Invalid`] so the caller can decide what to do with them.
    pub async fn read(&self, id: &str) -> CacheRead {
        let path = self.path_for(id);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return CacheRead::Missing,
            Err(e) => return CacheRead::Invalid(format!("unreadable: {}", e)),
        };

        match self.schema.validate_str(&content) {
            Ok(recipe) => CacheRead::Hit(recipe),
            Err(e) => CacheRead::Invalid(e.to_string()),
        }
    }

    /// Writes a recipe under `id`, creating its directory if needed
    ///
    /// # Returns
    /// * `Ok(PathBuf)` with the written file on success
    /// * `Err` if directory creation or file writing fails
    pub async fn write(&self, id: &str, recipe: &Recipe) -> io::Result<PathBuf> {
        let path = self.path_for(id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(recipe)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::write(&path, json).await?;
        Ok(path)
    }
}
