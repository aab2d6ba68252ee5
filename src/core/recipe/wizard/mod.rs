//! Recipe Form Wizard
//!
//! Walks a user through editing a recipe in six sequential steps, with
//! step-scoped validation, recoverable local drafts and an unsaved-changes
//! guard on page leave.
//!
//! # Overview
//!
//! 1. Basic Info - Title, description, servings, prep time, visibility
//! 2. Ingredients - Name, amount, unit per row
//! 3. Preparation Steps - Optional numbered instructions
//! 4. Nutrition - Per-serving values
//! 5. Tags - Up to five catalog tags
//! 6. Review - Final confirmation before submission
//!
//! # Components
//!
//! - [`FieldStore`]: mutable form data and per-field error map
//! - [`validator`]: pure step validation rules
//! - [`DraftStore`]: best-effort draft persistence with expiry
//! - [`NavigationGuard`]: page-leave veto while changes are unsaved
//! - [`WizardController`]: orchestration, autosave and submission

mod autosave;
mod controller;
mod draft;
mod fields;
mod navigation;
mod types;
pub mod validator;

pub use autosave::*;
pub use controller::*;
pub use draft::*;
pub use fields::*;
pub use navigation::*;
pub use types::*;
