//! Recipebox Library
//!
//! Read-through recipe cache: recipes are served from disk when a valid entry exists
//! and generated by an LLM, validated, and persisted otherwise.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod generate;
pub mod render;
pub mod resolver;

pub use cache::{CacheRead, RecipeStore};
pub use config::Config;
pub use data::{Recipe, RecipeSchema, ValidationError};
pub use generate::{GenerationError, RecipeGenerator};
pub use resolver::{PersistPolicy, ResolveError, Resolver};
