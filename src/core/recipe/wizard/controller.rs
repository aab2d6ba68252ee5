//! Wizard Controller
//!
//! Orchestrates one recipe editing session.
//!
//! # Responsibilities
//!
//! - **Navigation**: step jumps, validated advance, unvalidated back
//! - **Editing**: routes every mutation through the [`FieldStore`] and keeps
//!   the dirty flag, navigation guard and autosave timer in sync
//! - **Drafts**: one-shot detection, restore, discard, debounced autosave
//! - **Submission**: whole-document validation, create/update command,
//!   backend call, redirect
//!
//! # Usage Example
//!
//! ```rust,ignore
//! let mut wizard = WizardController::create(deps, WizardSettings::default());
//! wizard.detect_draft().await;
//!
//! wizard.edit(|f| f.update_field(FieldUpdate::Title("Greek Salad".into())));
//! if wizard.next_step() { /* now on ingredients */ }
//!
//! // from the event loop
//! wizard.tick().await;
//!
//! let recipe_id = wizard.submit_form().await?;
//! ```
//!
//! # Concurrency
//!
//! The controller is owned by a single event loop and mutated through
//! `&mut self`. The only state shared outward is the [`LeaveInterceptor`],
//! which the host may consult at any time, including while a submission is
//! awaiting the backend.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::core::recipe::api::RecipeApi;
use crate::core::recipe::types::{Recipe, RecipeCommand, RecipeId};

use super::autosave::{AutoSaveStatus, AutoSaveTimer, DEFAULT_QUIET_WINDOW};
use super::draft::{DraftKey, DraftStore, KeyValueStore, DEFAULT_DRAFT_TTL_HOURS};
use super::fields::FieldStore;
use super::navigation::{LeaveDecision, LeaveInterceptor, NavigationGuard, Route, WizardHost};
use super::types::{FieldErrors, FormData, SessionState, SubmitError, WizardMode, WizardStep};
use super::validator;

// ============================================================================
// Settings and Dependencies
// ============================================================================

/// Tunables of a wizard session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WizardSettings {
    /// Quiet window before an autosave fires
    pub autosave_quiet: Duration,
    /// Age after which a stored draft is ignored and deleted
    pub draft_ttl: chrono::Duration,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self {
            autosave_quiet: DEFAULT_QUIET_WINDOW,
            draft_ttl: chrono::Duration::hours(DEFAULT_DRAFT_TTL_HOURS),
        }
    }
}

/// External collaborators injected into the controller.
#[derive(Clone)]
pub struct WizardDeps {
    pub store: Arc<dyn KeyValueStore>,
    pub api: Arc<dyn RecipeApi>,
    pub host: Arc<dyn WizardHost>,
}

// ============================================================================
// WizardController
// ============================================================================

pub struct WizardController {
    mode: WizardMode,
    draft_key: DraftKey,
    step: WizardStep,
    fields: FieldStore,
    /// Title the session was opened with; names the detail route on discard
    saved_title: String,
    state: SessionState,
    has_draft: bool,
    draft_checked: bool,
    autosave: AutoSaveTimer,
    autosave_status: AutoSaveStatus,
    guard: NavigationGuard,
    drafts: DraftStore,
    api: Arc<dyn RecipeApi>,
    host: Arc<dyn WizardHost>,
}

impl WizardController {
    /// Open a session in `mode`, seeded with `data`.
    pub fn new(mode: WizardMode, data: FormData, deps: WizardDeps, settings: WizardSettings) -> Self {
        let draft_key = DraftKey::for_mode(&mode);
        info!(draft_key = %draft_key, edit = mode.is_edit(), "Opening recipe wizard");

        Self {
            mode,
            draft_key,
            step: WizardStep::FIRST,
            saved_title: data.title.clone(),
            fields: FieldStore::new(data),
            state: SessionState::Editing,
            has_draft: false,
            draft_checked: false,
            autosave: AutoSaveTimer::new(settings.autosave_quiet),
            autosave_status: AutoSaveStatus::Idle,
            guard: NavigationGuard::register(),
            drafts: DraftStore::new(deps.store, settings.draft_ttl),
            api: deps.api,
            host: deps.host,
        }
    }

    /// Open a create-mode session with default form data.
    pub fn create(deps: WizardDeps, settings: WizardSettings) -> Self {
        Self::new(WizardMode::Create, FormData::default(), deps, settings)
    }

    /// Open an edit-mode session seeded from `recipe`.
    pub fn edit_recipe(recipe: &Recipe, deps: WizardDeps, settings: WizardSettings) -> Self {
        Self::new(
            WizardMode::Edit(recipe.id.clone()),
            FormData::from_recipe(recipe),
            deps,
            settings,
        )
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn mode(&self) -> &WizardMode {
        &self.mode
    }

    pub fn draft_key(&self) -> &DraftKey {
        &self.draft_key
    }

    pub fn current_step(&self) -> WizardStep {
        self.step
    }

    pub fn form_data(&self) -> &FormData {
        self.fields.data()
    }

    pub fn errors(&self) -> &FieldErrors {
        self.fields.errors()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting()
    }

    pub fn is_restoring_draft(&self) -> bool {
        self.state.is_restoring_draft()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.fields.has_unsaved_changes()
    }

    pub fn has_draft(&self) -> bool {
        self.has_draft
    }

    pub fn autosave_status(&self) -> AutoSaveStatus {
        self.autosave_status
    }

    /// Submit affordance gate; disabled while a submission is in flight.
    pub fn can_submit(&self) -> bool {
        !self.state.is_submitting()
    }

    /// "Next" affordance gate for the current step.
    pub fn can_proceed_to_next_step(&self) -> bool {
        validator::can_proceed(self.step, self.fields.data())
    }

    // ------------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------------

    /// Apply a mutation to the field store.
    ///
    /// Keeps the navigation guard in sync and re-arms autosave when the
    /// session has unsaved changes.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut FieldStore) -> R) -> R {
        let result = f(&mut self.fields);
        self.after_change();
        result
    }

    fn after_change(&mut self) {
        let dirty = self.fields.has_unsaved_changes();
        self.guard.set_unsaved(dirty);
        if dirty {
            self.autosave.arm();
            self.autosave_status = AutoSaveStatus::Pending;
        } else {
            self.autosave.cancel();
            self.autosave_status = AutoSaveStatus::Idle;
        }
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Recompute `step`'s errors into the error map; returns pass/fail.
    pub fn validate_step(&mut self, step: WizardStep) -> bool {
        let fresh = validator::validate(step, self.fields.data());
        let passed = fresh.is_empty();
        self.fields.errors_mut().replace_step(step, fresh);
        if !passed {
            debug!(step = %step, "Step validation failed");
        }
        passed
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Jump straight to `step` without validating.
    pub fn go_to_step(&mut self, step: WizardStep) {
        if step == self.step {
            return;
        }
        debug!(from = %self.step, to = %step, "Jumping to wizard step");
        self.step = step;
        self.after_step_change();
    }

    /// Validate the current step and advance on success.
    pub fn next_step(&mut self) -> bool {
        if !self.validate_step(self.step) {
            return false;
        }

        if let Some(next) = self.step.next() {
            debug!(from = %self.step, to = %next, "Advancing wizard step");
            self.step = next;
            self.after_step_change();
            self.host.scroll_to_top();
        }
        true
    }

    pub fn previous_step(&mut self) {
        if let Some(prev) = self.step.previous() {
            self.step = prev;
            self.after_step_change();
        }
    }

    fn after_step_change(&mut self) {
        if self.fields.has_unsaved_changes() {
            self.autosave.arm();
            self.autosave_status = AutoSaveStatus::Pending;
        }
    }

    // ------------------------------------------------------------------------
    // Page leave
    // ------------------------------------------------------------------------

    /// Handle for the host's page-leave hook.
    pub fn leave_interceptor(&self) -> LeaveInterceptor {
        self.guard.interceptor()
    }

    pub fn on_leave_attempt(&self) -> LeaveDecision {
        self.guard.check_leave()
    }

    // ------------------------------------------------------------------------
    // Drafts
    // ------------------------------------------------------------------------

    /// Look for a recoverable draft. Runs at most once per session.
    pub async fn detect_draft(&mut self) -> bool {
        if self.draft_checked {
            return self.has_draft;
        }
        self.draft_checked = true;

        self.has_draft = self.drafts.detect(&self.draft_key).await.is_some();
        if self.has_draft {
            info!(draft_key = %self.draft_key, "Found recoverable draft");
        }
        self.has_draft
    }

    /// Replace the form with the stored draft, if it is still there.
    pub async fn restore_draft(&mut self) -> bool {
        self.state = SessionState::RestoringDraft;

        let restored = match self.drafts.detect(&self.draft_key).await {
            Some(record) => {
                info!(draft_key = %self.draft_key, step = %record.step, "Restoring draft");
                self.fields.replace(record.data);
                self.step = record.step;
                true
            }
            None => false,
        };

        self.has_draft = false;
        self.state = SessionState::Editing;
        if restored {
            self.after_change();
        }
        restored
    }

    /// Drop the stored draft but keep the in-memory edits.
    pub async fn discard_draft(&mut self) {
        self.drafts.clear(&self.draft_key).await;
        self.has_draft = false;
    }

    /// Throw away every change and leave the wizard.
    pub async fn discard_all_changes(&mut self) {
        self.guard.mark_intentional();
        self.drafts.clear(&self.draft_key).await;
        self.has_draft = false;
        self.fields.mark_saved();
        self.after_change();

        let route = match &self.mode {
            WizardMode::Edit(id) => Route::detail(id.clone(), &self.saved_title),
            WizardMode::Create => Route::RecipeList,
        };
        info!(route = %route.path(), "Discarding all wizard changes");
        self.host.redirect(route);
    }

    /// Earliest instant at which [`tick`](Self::tick) will write a draft.
    pub fn next_autosave_deadline(&self) -> Option<Instant> {
        self.autosave.deadline()
    }

    /// Persist a draft if the quiet window has elapsed. Returns whether a
    /// save was attempted.
    ///
    /// Suppressed while a submission is in flight; the timer stays armed.
    pub async fn tick(&mut self) -> bool {
        if self.state.is_submitting() || !self.fields.has_unsaved_changes() {
            return false;
        }
        if !self.autosave.take_due() {
            return false;
        }

        let saved = self
            .drafts
            .save(&self.draft_key, self.step, self.fields.data())
            .await;
        self.autosave_status = if saved {
            AutoSaveStatus::Saved
        } else {
            AutoSaveStatus::Failed
        };
        true
    }

    // ------------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------------

    /// Build the create/update body from the current form.
    pub fn build_command(&self) -> RecipeCommand {
        let data = self.fields.data();
        let description = data.description.trim();

        RecipeCommand {
            title: data.title.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            ingredients: data.ingredients.clone(),
            steps: if data.steps_enabled {
                data.steps.clone()
            } else {
                Vec::new()
            },
            servings: data.servings,
            nutrition_per_serving: data.nutrition_per_serving,
            prep_time_minutes: data.prep_time_minutes,
            is_public: data.is_public,
            tag_ids: (!data.tag_ids.is_empty()).then(|| data.tag_ids.clone()),
        }
    }

    /// Validate every data step, save through the backend and leave.
    ///
    /// On a validation failure the wizard jumps to the first failing step and
    /// no request is sent. Backend failures are shown to the user through the
    /// host alert and returned; the session stays editable for a retry.
    pub async fn submit_form(&mut self) -> Result<RecipeId, SubmitError> {
        self.state = SessionState::Submitting;

        for step in WizardStep::DATA_STEPS {
            if !self.validate_step(step) {
                self.go_to_step(step);
                self.state = SessionState::Editing;
                return Err(SubmitError::Validation { step });
            }
        }

        let command = self.build_command();
        let result = match &self.mode {
            WizardMode::Create => self.api.create_recipe(&command).await,
            WizardMode::Edit(id) => self.api.update_recipe(id, &command).await,
        };

        let recipe_id = match result {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Recipe submission failed");
                self.host.alert(&e.user_message());
                self.state = SessionState::Editing;
                return Err(SubmitError::Api(e));
            }
        };

        info!(recipe_id = %recipe_id, "Recipe saved");
        self.guard.mark_intentional();
        self.drafts.clear(&self.draft_key).await;
        self.has_draft = false;
        self.fields.mark_saved();
        self.after_change();
        self.state = SessionState::Editing;

        self.host
            .redirect(Route::detail(recipe_id.clone(), &command.title));
        Ok(recipe_id)
    }
}

impl Drop for WizardController {
    fn drop(&mut self) {
        // Draft stays in storage for later recovery
        self.guard.unregister();
    }
}
