//! Recipe Domain Types
//!
//! Shared value types for recipes as the backend exposes them, and the
//! create/update command the wizard sends back.
//!
//! Everything here is serialized in camelCase because the same shapes travel
//! over HTTP and into persisted drafts.

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Identifiers
// ============================================================================

/// Backend identifier of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(String);

impl RecipeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecipeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecipeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Backend identifier of a tag in the tag catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(String);

impl TagId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TagId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TagId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ============================================================================
// Recipe Parts
// ============================================================================

/// Read a JSON number, mapping `null` back to NaN.
///
/// serde_json writes non-finite floats as `null`.
fn number_or_nan<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    #[serde(deserialize_with = "number_or_nan")]
    pub amount: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparationStep {
    /// 1-based position, kept contiguous by the field store
    pub step_number: u32,
    pub instruction: String,
}

impl PreparationStep {
    pub fn blank(step_number: u32) -> Self {
        Self {
            step_number,
            instruction: String::new(),
        }
    }
}

/// Nutrition values for a single serving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Nutrition {
    #[serde(deserialize_with = "number_or_nan")]
    pub calories: f64,
    #[serde(deserialize_with = "number_or_nan")]
    pub protein: f64,
    #[serde(deserialize_with = "number_or_nan")]
    pub fat: f64,
    #[serde(deserialize_with = "number_or_nan")]
    pub carbs: f64,
    #[serde(deserialize_with = "number_or_nan")]
    pub fiber: f64,
    #[serde(deserialize_with = "number_or_nan")]
    pub salt: f64,
}

/// A catalog tag as returned by `GET /tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

// ============================================================================
// Recipe (existing entity)
// ============================================================================

/// A persisted recipe, as loaded for edit mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub servings: i32,
    #[serde(default)]
    pub prep_time_minutes: Option<i32>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<PreparationStep>,
    #[serde(default)]
    pub nutrition_per_serving: Nutrition,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

// ============================================================================
// Create / Update Command
// ============================================================================

/// Body of `POST /recipes` and `PUT /recipes/{id}`.
///
/// Built by the wizard only after every data-bearing step validates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCommand {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    pub ingredients: Vec<Ingredient>,
    /// Empty when preparation steps are disabled
    pub steps: Vec<PreparationStep>,
    pub servings: i32,
    pub nutrition_per_serving: Nutrition,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub prep_time_minutes: Option<i32>,
    pub is_public: bool,
    /// Omitted entirely when no tag is selected
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tag_ids: Option<IndexSet<TagId>>,
}
