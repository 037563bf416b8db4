//! Recipe schema and validation
//!
//! The JSON Schema document is derived from the [`Recipe`] type and compiled once.
//! The same document validates cache entries, validates generator output, and is
//! handed to the generator to constrain what it produces.

use std::fmt;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, Validator};
use serde_json::Value;
use thiserror::Error;

use super::Recipe;

/// The compiled schema could not be built
#[derive(Debug, Clone, Error)]
#[error("Failed to build recipe schema: {0}")]
pub struct SchemaError(String);

/// A single constraint violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the offending field; empty for the document root
    pub path: String,
    /// Which constraint was violated
    pub message: String,
}

impl Violation {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    fn from_schema_error(error: jsonschema::ValidationError<'_>) -> Self {
        let mut path = error.instance_path.to_string();
        // Missing properties are reported against their parent object
        if let ValidationErrorKind::Required { property } = &error.kind {
            if let Some(name) = property.as_str() {
                path = format!("{}/{}", path, name);
            }
        }
        Self::new(path, error.to_string())
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Input did not satisfy the recipe schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Recipe failed validation: {}", join_violations(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![Violation::new(path, message)],
        }
    }

    /// Every violation found, in document order
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Whether any violation points at `path` or one of its children
    pub fn touches(&self, path: &str) -> bool {
        self.violations.iter().any(|v| {
            v.path == path
                || v.path
                    .strip_prefix(path)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The recipe schema document and its compiled validator
pub struct RecipeSchema {
    document: Value,
    validator: Validator,
}

impl fmt::Debug for RecipeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipeSchema").finish_non_exhaustive()
    }
}

impl RecipeSchema {
    /// Derives the schema document from [`Recipe`] and compiles it
    pub fn new() -> Result<Self, SchemaError> {
        let root = schemars::schema_for!(Recipe);
        let document = serde_json::to_value(&root).map_err(|e| SchemaError(e.to_string()))?;

        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .should_validate_formats(true)
            .build(&document)
            .map_err(|e| SchemaError(e.to_string()))?;

        Ok(Self {
            document,
            validator,
        })
    }

    /// The full JSON Schema document
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// The schema as sent to a generator: the document without its `$schema` marker
    pub fn generation_document(&self) -> Value {
        let mut document = self.document.clone();
        if let Some(object) = document.as_object_mut() {
            object.remove("$schema");
        }
        document
    }

    /// Validates a parsed JSON value and converts it into a [`Recipe`]
    ///
    /// # Returns
    /// * `Ok(Recipe)` if every constraint holds
    /// * `Err(ValidationError)` listing each violation with its field path
    pub fn validate(&self, value: &Value) -> Result<Recipe, ValidationError> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(value)
            .map(Violation::from_schema_error)
            .collect();
        if !violations.is_empty() {
            return Err(ValidationError { violations });
        }

        let recipe: Recipe = serde_json::from_value(value.clone())
            .map_err(|e| ValidationError::single("", e.to_string()))?;

        check_step_order(&recipe)?;
        Ok(recipe)
    }

    /// Parses JSON text, then validates it
    pub fn validate_str(&self, text: &str) -> Result<Recipe, ValidationError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ValidationError::single("", format!("invalid JSON: {}", e)))?;
        self.validate(&value)
    }
}

/// Instruction steps must be numbered 1..n in list order
fn check_step_order(recipe: &Recipe) -> Result<(), ValidationError> {
    let violations: Vec<Violation> = recipe
        .instructions
        .iter()
        .enumerate()
        .filter(|(index, instruction)| instruction.step as usize != index + 1)
        .map(|(index, instruction)| {
            Violation::new(
                format!("/instructions/{}/step", index),
                format!("expected step {}, found {}", index + 1, instruction.step),
            )
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}
