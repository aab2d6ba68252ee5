//! Step Validation
//!
//! Pure validation rules keyed by wizard step. [`validate`] produces the
//! complete error set for one step; [`can_proceed`] is the lighter check used
//! to enable the "Next" affordance while typing, without producing messages.

use super::fields::NutritionField;
use super::types::{field_key, FieldErrors, FormData, WizardStep, MAX_TAGS};

pub const TITLE_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MAX_CHARS: usize = 5000;
pub const PREP_TIME_MAX_MINUTES: i32 = 1440;
pub const INGREDIENT_NAME_MAX_CHARS: usize = 255;
pub const UNIT_MAX_CHARS: usize = 50;
pub const INSTRUCTION_MAX_CHARS: usize = 2000;

/// Inclusive upper bound for a nutrition value
pub fn nutrition_max(field: NutritionField) -> f64 {
    match field {
        NutritionField::Calories => 10_000.0,
        NutritionField::Salt => 100.0,
        NutritionField::Protein
        | NutritionField::Fat
        | NutritionField::Carbs
        | NutritionField::Fiber => 1_000.0,
    }
}

fn nutrition_value(data: &FormData, field: NutritionField) -> f64 {
    let n = &data.nutrition_per_serving;
    match field {
        NutritionField::Calories => n.calories,
        NutritionField::Protein => n.protein,
        NutritionField::Fat => n.fat,
        NutritionField::Carbs => n.carbs,
        NutritionField::Fiber => n.fiber,
        NutritionField::Salt => n.salt,
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

// ============================================================================
// Full validation
// ============================================================================

/// Validate one step of `data`, returning only that step's errors.
pub fn validate(step: WizardStep, data: &FormData) -> FieldErrors {
    let mut errors = FieldErrors::new();
    match step {
        WizardStep::BasicInfo => validate_basic_info(data, &mut errors),
        WizardStep::Ingredients => validate_ingredients(data, &mut errors),
        WizardStep::PreparationSteps => validate_preparation_steps(data, &mut errors),
        WizardStep::Nutrition => validate_nutrition(data, &mut errors),
        WizardStep::Tags => {
            if data.tag_ids.len() > MAX_TAGS {
                errors.insert(
                    field_key::TAGS,
                    format!("You can select at most {MAX_TAGS} tags"),
                );
            }
        }
        WizardStep::Review => {}
    }
    errors
}

fn validate_basic_info(data: &FormData, errors: &mut FieldErrors) {
    let title = data.title.trim();
    if title.is_empty() {
        errors.insert(field_key::TITLE, "Title is required");
    } else if char_len(title) > TITLE_MAX_CHARS {
        errors.insert(
            field_key::TITLE,
            format!("Title must be {TITLE_MAX_CHARS} characters or less"),
        );
    }

    if char_len(data.description.trim()) > DESCRIPTION_MAX_CHARS {
        errors.insert(
            field_key::DESCRIPTION,
            format!("Description must be {DESCRIPTION_MAX_CHARS} characters or less"),
        );
    }

    if data.servings <= 0 {
        errors.insert(field_key::SERVINGS, "Servings must be greater than 0");
    }

    if let Some(minutes) = data.prep_time_minutes {
        if minutes <= 0 {
            errors.insert(
                field_key::PREP_TIME_MINUTES,
                "Prep time must be greater than 0",
            );
        } else if minutes > PREP_TIME_MAX_MINUTES {
            errors.insert(
                field_key::PREP_TIME_MINUTES,
                format!("Prep time cannot exceed {PREP_TIME_MAX_MINUTES} minutes"),
            );
        }
    }
}

fn validate_ingredients(data: &FormData, errors: &mut FieldErrors) {
    if data.ingredients.is_empty() {
        errors.insert(field_key::INGREDIENTS, "At least one ingredient is required");
        return;
    }

    for (i, item) in data.ingredients.iter().enumerate() {
        let key = |field| field_key::item(field_key::INGREDIENTS, i, field);

        let name = item.name.trim();
        if name.is_empty() {
            errors.insert(key("name"), "Ingredient name is required");
        } else if char_len(name) > INGREDIENT_NAME_MAX_CHARS {
            errors.insert(
                key("name"),
                format!("Ingredient name must be {INGREDIENT_NAME_MAX_CHARS} characters or less"),
            );
        }

        // NaN fails this comparison too
        if !(item.amount > 0.0) {
            errors.insert(key("amount"), "Amount must be greater than 0");
        }

        let unit = item.unit.trim();
        if unit.is_empty() {
            errors.insert(key("unit"), "Unit is required");
        } else if char_len(unit) > UNIT_MAX_CHARS {
            errors.insert(
                key("unit"),
                format!("Unit must be {UNIT_MAX_CHARS} characters or less"),
            );
        }
    }
}

fn validate_preparation_steps(data: &FormData, errors: &mut FieldErrors) {
    if !data.steps_enabled {
        return;
    }

    if data.steps.is_empty() {
        errors.insert(field_key::STEPS, "At least one preparation step is required");
        return;
    }

    for (i, step) in data.steps.iter().enumerate() {
        let key = field_key::item(field_key::STEPS, i, "instruction");
        let instruction = step.instruction.trim();
        if instruction.is_empty() {
            errors.insert(key, "Instruction is required");
        } else if char_len(instruction) > INSTRUCTION_MAX_CHARS {
            errors.insert(
                key,
                format!("Instruction must be {INSTRUCTION_MAX_CHARS} characters or less"),
            );
        }
    }
}

fn validate_nutrition(data: &FormData, errors: &mut FieldErrors) {
    for field in NutritionField::ALL {
        let value = nutrition_value(data, field);
        let max = nutrition_max(field);
        if !(0.0..=max).contains(&value) {
            errors.insert(
                field_key::nutrition(field.as_str()),
                format!("{} must be between 0 and {}", field.label(), max),
            );
        }
    }
}

// ============================================================================
// Lightweight gate
// ============================================================================

/// Whether the "Next" affordance should be enabled for `step`.
///
/// Checks the shape of the step's rule (required values present, numbers in
/// range) without length limits and without touching the error map.
pub fn can_proceed(step: WizardStep, data: &FormData) -> bool {
    match step {
        WizardStep::BasicInfo => !data.title.trim().is_empty() && data.servings > 0,
        WizardStep::Ingredients => {
            !data.ingredients.is_empty()
                && data.ingredients.iter().all(|i| {
                    !i.name.trim().is_empty() && i.amount > 0.0 && !i.unit.trim().is_empty()
                })
        }
        WizardStep::PreparationSteps => {
            !data.steps_enabled
                || (!data.steps.is_empty()
                    && data.steps.iter().all(|s| !s.instruction.trim().is_empty()))
        }
        WizardStep::Nutrition => NutritionField::ALL.iter().all(|&field| {
            (0.0..=nutrition_max(field)).contains(&nutrition_value(data, field))
        }),
        WizardStep::Tags => data.tag_ids.len() <= MAX_TAGS,
        WizardStep::Review => true,
    }
}
