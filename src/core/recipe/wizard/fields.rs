//! Field Store
//!
//! Owns the recipe draft under edit together with its error map and the
//! dirty flag. Every operation that actually changes the draft marks it as
//! having unsaved changes; rejected operations leave data and flag alone and
//! report the rejection through the error map instead.

use tracing::debug;

use crate::core::recipe::types::{Ingredient, PreparationStep, TagId};

use super::types::{field_key, FieldErrors, FormData, MAX_TAGS};

// ============================================================================
// Update Payloads
// ============================================================================

/// Replacement value for a top-level scalar field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Title(String),
    Description(String),
    Servings(i32),
    PrepTimeMinutes(Option<i32>),
    IsPublic(bool),
}

impl FieldUpdate {
    /// Error-map key of the field this update targets
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldUpdate::Title(_) => field_key::TITLE,
            FieldUpdate::Description(_) => field_key::DESCRIPTION,
            FieldUpdate::Servings(_) => field_key::SERVINGS,
            FieldUpdate::PrepTimeMinutes(_) => field_key::PREP_TIME_MINUTES,
            FieldUpdate::IsPublic(_) => "isPublic",
        }
    }
}

/// Replacement value for one field of an ingredient row.
#[derive(Debug, Clone, PartialEq)]
pub enum IngredientField {
    Name(String),
    Amount(f64),
    Unit(String),
}

impl IngredientField {
    pub fn field_name(&self) -> &'static str {
        match self {
            IngredientField::Name(_) => "name",
            IngredientField::Amount(_) => "amount",
            IngredientField::Unit(_) => "unit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutritionField {
    Calories,
    Protein,
    Fat,
    Carbs,
    Fiber,
    Salt,
}

impl NutritionField {
    pub const ALL: [NutritionField; 6] = [
        NutritionField::Calories,
        NutritionField::Protein,
        NutritionField::Fat,
        NutritionField::Carbs,
        NutritionField::Fiber,
        NutritionField::Salt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NutritionField::Calories => "calories",
            NutritionField::Protein => "protein",
            NutritionField::Fat => "fat",
            NutritionField::Carbs => "carbs",
            NutritionField::Fiber => "fiber",
            NutritionField::Salt => "salt",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NutritionField::Calories => "Calories",
            NutritionField::Protein => "Protein",
            NutritionField::Fat => "Fat",
            NutritionField::Carbs => "Carbs",
            NutritionField::Fiber => "Fiber",
            NutritionField::Salt => "Salt",
        }
    }
}

/// Outcome of [`FieldStore::toggle_tag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagToggle {
    Added,
    Removed,
    /// The tag limit was reached; nothing changed
    Rejected,
}

// ============================================================================
// FieldStore
// ============================================================================

pub const LAST_INGREDIENT_MESSAGE: &str = "At least one ingredient is required";
pub const LAST_STEP_MESSAGE: &str = "At least one preparation step is required";

/// Mutable recipe draft plus its error map and dirty flag.
#[derive(Debug, Clone)]
pub struct FieldStore {
    data: FormData,
    errors: FieldErrors,
    dirty: bool,
}

impl FieldStore {
    pub fn new(data: FormData) -> Self {
        Self {
            data,
            errors: FieldErrors::new(),
            dirty: false,
        }
    }

    pub fn data(&self) -> &FormData {
        &self.data
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub(crate) fn errors_mut(&mut self) -> &mut FieldErrors {
        &mut self.errors
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Replace the whole draft (draft restore). Counts as an unsaved change.
    pub fn replace(&mut self, data: FormData) {
        self.data = data;
        self.errors.clear();
        self.dirty = true;
    }

    /// Forget the dirty flag after the draft was persisted or discarded.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    fn touch(&mut self) {
        self.dirty = true;
    }

    // ------------------------------------------------------------------------
    // Scalars
    // ------------------------------------------------------------------------

    pub fn update_field(&mut self, update: FieldUpdate) {
        self.errors.remove(update.field_name());
        match update {
            FieldUpdate::Title(v) => self.data.title = v,
            FieldUpdate::Description(v) => self.data.description = v,
            FieldUpdate::Servings(v) => self.data.servings = v,
            FieldUpdate::PrepTimeMinutes(v) => self.data.prep_time_minutes = v,
            FieldUpdate::IsPublic(v) => self.data.is_public = v,
        }
        self.touch();
    }

    pub fn update_nutrition(&mut self, field: NutritionField, value: f64) {
        self.errors.remove(&field_key::nutrition(field.as_str()));
        let n = &mut self.data.nutrition_per_serving;
        match field {
            NutritionField::Calories => n.calories = value,
            NutritionField::Protein => n.protein = value,
            NutritionField::Fat => n.fat = value,
            NutritionField::Carbs => n.carbs = value,
            NutritionField::Fiber => n.fiber = value,
            NutritionField::Salt => n.salt = value,
        }
        self.touch();
    }

    pub fn clear_error(&mut self, field: &str) {
        self.errors.remove(field);
    }

    // ------------------------------------------------------------------------
    // Ingredients
    // ------------------------------------------------------------------------

    /// Returns false when `index` is out of range.
    pub fn update_ingredient(&mut self, index: usize, field: IngredientField) -> bool {
        let Some(item) = self.data.ingredients.get_mut(index) else {
            debug!(index, "Ignoring update of missing ingredient");
            return false;
        };

        let key = field_key::item(field_key::INGREDIENTS, index, field.field_name());
        match field {
            IngredientField::Name(v) => item.name = v,
            IngredientField::Amount(v) => item.amount = v,
            IngredientField::Unit(v) => item.unit = v,
        }
        self.errors.remove(&key);
        self.touch();
        true
    }

    pub fn add_ingredient(&mut self) {
        self.data.ingredients.push(Ingredient::default());
        self.errors.remove(field_key::INGREDIENTS);
        self.touch();
    }

    /// Remove an ingredient row; the last remaining row cannot be removed.
    pub fn remove_ingredient(&mut self, index: usize) -> bool {
        if self.data.ingredients.len() <= 1 {
            self.errors
                .insert(field_key::INGREDIENTS, LAST_INGREDIENT_MESSAGE);
            return false;
        }
        if index >= self.data.ingredients.len() {
            return false;
        }

        self.data.ingredients.remove(index);
        // Item indices shifted; stale per-item messages would point at the wrong rows
        self.errors.clear_items(field_key::INGREDIENTS);
        self.touch();
        true
    }

    // ------------------------------------------------------------------------
    // Preparation steps
    // ------------------------------------------------------------------------

    pub fn update_step_instruction(&mut self, index: usize, text: String) -> bool {
        let Some(step) = self.data.steps.get_mut(index) else {
            debug!(index, "Ignoring update of missing preparation step");
            return false;
        };

        step.instruction = text;
        self.errors
            .remove(&field_key::item(field_key::STEPS, index, "instruction"));
        self.touch();
        true
    }

    pub fn add_step(&mut self) {
        let number = self.data.steps.len() as u32 + 1;
        self.data.steps.push(PreparationStep::blank(number));
        self.errors.remove(field_key::STEPS);
        self.touch();
    }

    /// Remove a preparation step and renumber the rest from 1.
    pub fn remove_step(&mut self, index: usize) -> bool {
        if self.data.steps.len() <= 1 {
            self.errors.insert(field_key::STEPS, LAST_STEP_MESSAGE);
            return false;
        }
        if index >= self.data.steps.len() {
            return false;
        }

        self.data.steps.remove(index);
        for (i, step) in self.data.steps.iter_mut().enumerate() {
            step.step_number = i as u32 + 1;
        }
        self.errors.clear_items(field_key::STEPS);
        self.touch();
        true
    }

    pub fn toggle_steps_enabled(&mut self, enabled: bool) {
        self.data.steps_enabled = enabled;
        if enabled && self.data.steps.is_empty() {
            self.data.steps.push(PreparationStep::blank(1));
        }
        self.touch();
    }

    // ------------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------------

    pub fn toggle_tag(&mut self, id: TagId) -> TagToggle {
        if self.data.tag_ids.shift_remove(&id) {
            self.errors.remove(field_key::TAGS);
            self.touch();
            return TagToggle::Removed;
        }

        if self.data.tag_ids.len() >= MAX_TAGS {
            self.errors.insert(
                field_key::TAGS,
                format!("You can select at most {MAX_TAGS} tags"),
            );
            return TagToggle::Rejected;
        }

        self.data.tag_ids.insert(id);
        self.errors.remove(field_key::TAGS);
        self.touch();
        TagToggle::Added
    }
}
