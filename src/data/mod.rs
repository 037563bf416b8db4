//! Core data models for Recipebox
//!
//! This module contains the recipe record and its nested types, exactly as they are
//! persisted to the cache and requested from the generator.

pub mod schema;

pub use schema::{RecipeSchema, SchemaError, ValidationError, Violation};

use std::fmt;

use chrono::{DateTime, Utc};
use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject, StringValidation};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Pattern every related recipe identifier must match
pub const SLUG_PATTERN: &str = "^[a-z0-9]+(-[a-z0-9]+)*$";

/// A complete recipe record
///
/// Field names are serialized in camelCase. Optional fields that are absent are
/// omitted from the JSON rather than written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Unique identifier, also the cache key
    pub id: String,
    /// Recipe name
    pub title: String,
    /// Short description of the dish
    pub description: String,
    /// Absolute URI of the recipe image
    #[schemars(url)]
    pub image_url: String,
    pub ingredients: Vec<Ingredient>,
    /// Steps in order, numbered from 1
    pub instructions: Vec<Instruction>,
    /// Preparation time in minutes
    #[schemars(range(max = 4294967295u32))]
    pub prep_time: u32,
    /// Cooking time in minutes
    #[schemars(range(max = 4294967295u32))]
    pub cook_time: u32,
    /// Number of servings (at least 1)
    #[schemars(range(min = 1, max = 4294967295u32))]
    pub servings: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutritional_info: Option<NutritionalInfo>,
    pub difficulty_level: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_equipment: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<Vec<String>>,
    /// Between two and four related recipe identifiers
    #[schemars(length(min = 2, max = 4))]
    pub related_recipe_ids: Vec<Slug>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_planning_suggestions: Option<Vec<MealPlanningSuggestion>>,
    /// Aggregate user rating from 0 to 5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0, max = 5))]
    pub user_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

impl Recipe {
    /// Total time in minutes (prep plus cook)
    pub fn total_time(&self) -> u32 {
        self.prep_time.saturating_add(self.cook_time)
    }
}

/// A single ingredient line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Ingredient {
    pub name: String,
    /// Free-form quantity such as "1/2" or "a pinch"
    pub amount: String,
    pub unit: String,
}

/// One numbered preparation step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Instruction {
    /// 1-based step number, equal to the position in the instruction list
    #[schemars(range(min = 1, max = 4294967295u32))]
    pub step: u32,
    pub description: String,
}

/// Nutrition facts per serving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NutritionalInfo {
    pub calories: f64,
    /// Grams
    pub protein: f64,
    /// Grams
    pub carbohydrates: f64,
    /// Grams
    pub fat: f64,
}

/// How hard a recipe is to make
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.write_str(label)
    }
}

/// A dish suggested alongside the recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MealPlanningSuggestion {
    pub id: String,
    #[serde(rename = "type")]
    pub category: MealCategory,
}

/// Course of a meal planning suggestion
///
/// The well-known courses are typed; anything else the generator produces is kept
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum MealCategory {
    Known(MealCourse),
    Other(String),
}

/// Well-known meal planning courses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum MealCourse {
    #[serde(rename = "Side Dish")]
    SideDish,
    Dessert,
    Drink,
}

impl fmt::Display for MealCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealCategory::Known(MealCourse::SideDish) => f.write_str("Side Dish"),
            MealCategory::Known(MealCourse::Dessert) => f.write_str("Dessert"),
            MealCategory::Known(MealCourse::Drink) => f.write_str("Drink"),
            MealCategory::Other(other) => f.write_str(other),
        }
    }
}

/// A user comment on a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Comment {
    /// Display name of the author
    pub user: String,
    /// When the comment was posted (RFC 3339)
    pub date: DateTime<Utc>,
    pub content: String,
    /// Optional rating from 1 to 5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 1, max = 5))]
    pub rating: Option<u8>,
}

/// A URL-safe recipe identifier: lowercase words joined by hyphens
///
/// Deserialization accepts any string; the schema validator enforces the pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Returns a slug if `s` matches [`SLUG_PATTERN`]
    pub fn parse(s: &str) -> Option<Self> {
        is_slug(s).then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl JsonSchema for Slug {
    fn schema_name() -> String {
        "Slug".to_string()
    }

    fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            string: Some(Box::new(StringValidation {
                pattern: Some(SLUG_PATTERN.to_string()),
                ..Default::default()
            })),
            ..Default::default()
        }
        .into()
    }
}

/// Checks `s` against [`SLUG_PATTERN`] without compiling a regex
pub fn is_slug(s: &str) -> bool {
    !s.is_empty()
        && s.split('-').all(|word| {
            !word.is_empty()
                && word
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Recipe {
        serde_json::from_str(include_str!("../../tests/fixtures/garlic-butter-shrimp.json"))
            .expect("fixture should deserialize")
    }

    #[test]
    fn test_is_slug_accepts_hyphenated_words() {
        assert!(is_slug("lemon-herb-chicken"));
        assert!(is_slug("pad-thai"));
        assert!(is_slug("soup"));
        assert!(is_slug("top-10-salads"));
    }

    #[test]
    fn test_is_slug_rejects_malformed_values() {
        assert!(!is_slug(""));
        assert!(!is_slug("Lemon-Herb-Chicken"));
        assert!(!is_slug("lemon herb chicken"));
        assert!(!is_slug("-lemon"));
        assert!(!is_slug("lemon--herb"));
        assert!(!is_slug("lemon-"));
        assert!(!is_slug("lemon_herb"));
    }

    #[test]
    fn test_slug_parse() {
        assert_eq!(Slug::parse("pan-seared-salmon").unwrap().as_str(), "pan-seared-salmon");
        assert!(Slug::parse("Not A Slug").is_none());
    }

    #[test]
    fn test_total_time_adds_prep_and_cook() {
        let recipe = sample();
        assert_eq!(recipe.total_time(), recipe.prep_time + recipe.cook_time);
    }

    #[test]
    fn test_optional_fields_are_omitted_when_absent() {
        let mut recipe = sample();
        recipe.nutritional_info = None;
        recipe.comments = None;
        recipe.user_rating = None;

        let json = serde_json::to_value(&recipe).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("nutritionalInfo"));
        assert!(!object.contains_key("comments"));
        assert!(!object.contains_key("userRating"));
        assert!(object.contains_key("relatedRecipeIds"));
        assert!(object.contains_key("difficultyLevel"));
    }

    #[test]
    fn test_meal_category_keeps_unknown_values() {
        let known: MealPlanningSuggestion =
            serde_json::from_str(r#"{"id": "garlic-bread", "type": "Side Dish"}"#).unwrap();
        assert_eq!(known.category, MealCategory::Known(MealCourse::SideDish));
        assert_eq!(known.category.to_string(), "Side Dish");

        let other: MealPlanningSuggestion =
            serde_json::from_str(r#"{"id": "fruit-salad", "type": "Brunch"}"#).unwrap();
        assert_eq!(other.category, MealCategory::Other("Brunch".to_string()));

        let json = serde_json::to_value(&known).unwrap();
        assert_eq!(json["type"], "Side Dish");
    }

    #[test]
    fn test_difficulty_display() {
        assert_eq!(Difficulty::Easy.to_string(), "Easy");
        assert_eq!(Difficulty::Hard.to_string(), "Hard");
    }
}
