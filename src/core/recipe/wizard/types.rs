//! Wizard Domain Types
//!
//! Defines the core types of the recipe editing wizard:
//! - [`WizardStep`]: the six sequential editing stages
//! - [`WizardMode`]: create vs. edit, fixed for a session
//! - [`FormData`]: the recipe draft being edited
//! - [`FieldErrors`]: per-field validation messages
//! - [`SessionState`]: the tagged state of a wizard session
//! - [`SubmitError`]: failures surfaced by submission
//!
//! # Serialization
//!
//! [`FormData`] uses the backend's camelCase wire shape so that persisted
//! drafts and request bodies agree. [`WizardStep`] is serialized as its
//! 1-based number.

use std::collections::BTreeMap;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::core::recipe::api::ApiError;
use crate::core::recipe::types::{Ingredient, Nutrition, PreparationStep, Recipe, RecipeId, TagId};

/// Upper bound on selected tags.
pub const MAX_TAGS: usize = 5;

// ============================================================================
// Wizard Step
// ============================================================================

/// Editing stage of the wizard, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WizardStep {
    BasicInfo,
    Ingredients,
    PreparationSteps,
    Nutrition,
    Tags,
    Review,
}

impl WizardStep {
    pub const FIRST: WizardStep = WizardStep::BasicInfo;
    pub const LAST: WizardStep = WizardStep::Review;

    /// Steps whose data is validated on submission (everything but review).
    pub const DATA_STEPS: [WizardStep; 5] = [
        WizardStep::BasicInfo,
        WizardStep::Ingredients,
        WizardStep::PreparationSteps,
        WizardStep::Nutrition,
        WizardStep::Tags,
    ];

    pub fn number(&self) -> u8 {
        match self {
            WizardStep::BasicInfo => 1,
            WizardStep::Ingredients => 2,
            WizardStep::PreparationSteps => 3,
            WizardStep::Nutrition => 4,
            WizardStep::Tags => 5,
            WizardStep::Review => 6,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(WizardStep::BasicInfo),
            2 => Some(WizardStep::Ingredients),
            3 => Some(WizardStep::PreparationSteps),
            4 => Some(WizardStep::Nutrition),
            5 => Some(WizardStep::Tags),
            6 => Some(WizardStep::Review),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::BasicInfo => "basic_info",
            WizardStep::Ingredients => "ingredients",
            WizardStep::PreparationSteps => "preparation_steps",
            WizardStep::Nutrition => "nutrition",
            WizardStep::Tags => "tags",
            WizardStep::Review => "review",
        }
    }

    /// Next step in the flow (None at review)
    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    /// Previous step in the flow (None at basic info)
    pub fn previous(&self) -> Option<Self> {
        Self::from_number(self.number().wrapping_sub(1))
    }

    /// Whether an error-map key belongs to this step.
    ///
    /// Steps own disjoint key sets so a step's errors can be recomputed
    /// without touching the others.
    pub fn owns_field(&self, key: &str) -> bool {
        match self {
            WizardStep::BasicInfo => matches!(
                key,
                field_key::TITLE
                    | field_key::DESCRIPTION
                    | field_key::SERVINGS
                    | field_key::PREP_TIME_MINUTES
            ),
            WizardStep::Ingredients => list_owns(field_key::INGREDIENTS, key),
            WizardStep::PreparationSteps => list_owns(field_key::STEPS, key),
            WizardStep::Nutrition => key.starts_with(field_key::NUTRITION_PREFIX),
            WizardStep::Tags => key == field_key::TAGS,
            WizardStep::Review => false,
        }
    }
}

fn list_owns(list: &str, key: &str) -> bool {
    key == list || (key.starts_with(list) && key[list.len()..].starts_with('['))
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<u8> for WizardStep {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::from_number(n).ok_or_else(|| format!("Unknown wizard step: {n}"))
    }
}

impl From<WizardStep> for u8 {
    fn from(step: WizardStep) -> Self {
        step.number()
    }
}

// ============================================================================
// Mode
// ============================================================================

/// Whether the session creates a new recipe or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardMode {
    Create,
    Edit(RecipeId),
}

impl WizardMode {
    pub fn recipe_id(&self) -> Option<&RecipeId> {
        match self {
            WizardMode::Create => None,
            WizardMode::Edit(id) => Some(id),
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, WizardMode::Edit(_))
    }
}

// ============================================================================
// Form Data
// ============================================================================

/// The recipe draft under edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub servings: i32,
    #[serde(default)]
    pub prep_time_minutes: Option<i32>,
    #[serde(default)]
    pub is_public: bool,
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps_enabled: bool,
    #[serde(default)]
    pub steps: Vec<PreparationStep>,
    #[serde(default)]
    pub nutrition_per_serving: Nutrition,
    #[serde(default)]
    pub tag_ids: IndexSet<TagId>,
}

impl Default for FormData {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            servings: 1,
            prep_time_minutes: None,
            is_public: false,
            ingredients: vec![Ingredient::default()],
            steps_enabled: false,
            steps: Vec::new(),
            nutrition_per_serving: Nutrition::default(),
            tag_ids: IndexSet::new(),
        }
    }
}

impl FormData {
    /// Seed the form from an existing recipe for edit mode.
    pub fn from_recipe(recipe: &Recipe) -> Self {
        let ingredients = if recipe.ingredients.is_empty() {
            vec![Ingredient::default()]
        } else {
            recipe.ingredients.clone()
        };

        let mut steps = recipe.steps.clone();
        steps.sort_by_key(|s| s.step_number);
        for (i, step) in steps.iter_mut().enumerate() {
            step.step_number = i as u32 + 1;
        }

        Self {
            title: recipe.title.clone(),
            description: recipe.description.clone().unwrap_or_default(),
            servings: recipe.servings,
            prep_time_minutes: recipe.prep_time_minutes,
            is_public: recipe.is_public,
            ingredients,
            steps_enabled: !steps.is_empty(),
            steps,
            nutrition_per_serving: recipe.nutrition_per_serving,
            tag_ids: recipe.tags.iter().map(|t| t.id.clone()).collect(),
        }
    }
}

// ============================================================================
// Field Errors
// ============================================================================

/// Error-map keys.
pub mod field_key {
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const SERVINGS: &str = "servings";
    pub const PREP_TIME_MINUTES: &str = "prepTimeMinutes";
    pub const INGREDIENTS: &str = "ingredients";
    pub const STEPS: &str = "steps";
    pub const NUTRITION_PREFIX: &str = "nutritionPerServing.";
    pub const TAGS: &str = "tags";

    /// Key of a field inside a list item, e.g. `ingredients[2].unit`
    pub fn item(list: &str, index: usize, field: &str) -> String {
        format!("{list}[{index}].{field}")
    }

    pub fn nutrition(field: &str) -> String {
        format!("{NUTRITION_PREFIX}{field}")
    }
}

/// Per-field validation messages, keyed by [`field_key`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.insert(key.into(), message.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Drop every entry owned by `step`.
    pub fn clear_step(&mut self, step: WizardStep) {
        self.0.retain(|key, _| !step.owns_field(key));
    }

    /// Replace `step`'s entries with `fresh`.
    pub fn replace_step(&mut self, step: WizardStep, fresh: FieldErrors) {
        self.clear_step(step);
        self.0.extend(fresh.0);
    }

    /// Drop all item-level entries of `list` (keeps the list-level entry).
    pub fn clear_items(&mut self, list: &str) {
        self.0
            .retain(|key, _| !(key.starts_with(list) && key[list.len()..].starts_with('[')));
    }

    /// Per-item errors of `list` as an array parallel to the list itself.
    ///
    /// Entry `i` maps item field names (`name`, `amount`, ...) to messages;
    /// valid items get an empty map.
    pub fn items(&self, list: &str, len: usize) -> Vec<BTreeMap<String, String>> {
        let mut items = vec![BTreeMap::new(); len];
        for (key, message) in &self.0 {
            let Some(rest) = key.strip_prefix(list).and_then(|r| r.strip_prefix('[')) else {
                continue;
            };
            let Some((index, field)) = rest.split_once("].") else {
                continue;
            };
            if let Ok(index) = index.parse::<usize>() {
                if let Some(slot) = items.get_mut(index) {
                    slot.insert(field.to_string(), message.clone());
                }
            }
        }
        items
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Blocking activity of a wizard session.
///
/// `has_unsaved_changes` and `has_draft` are tracked separately and may be
/// set in any of these states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Editing,
    Submitting,
    RestoringDraft,
}

impl SessionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SessionState::Submitting)
    }

    pub fn is_restoring_draft(&self) -> bool {
        matches!(self, SessionState::RestoringDraft)
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Why a submission did not reach a successful save.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    #[error("Step {step} has validation errors")]
    Validation { step: WizardStep },

    #[error(transparent)]
    Api(#[from] ApiError),
}
