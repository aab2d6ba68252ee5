//! Wizard Controller Unit Tests
//!
//! Drives full sessions through the controller with an in-memory draft store,
//! a mocked recipe backend and a recording host.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;

use crate::core::recipe::api::{ApiError, MockRecipeApi};
use crate::core::recipe::types::{RecipeCommand, RecipeId, TagId};
use crate::core::recipe::wizard::{
    field_key, AutoSaveStatus, DraftKey, DraftRecord, DraftStore, FieldUpdate, FormData,
    IngredientField, KeyValueStore, LeaveDecision, LeaveInterceptor, MemoryStore,
    NutritionField, Route, SessionState, SubmitError, TagToggle, WizardController, WizardMode,
    WizardSettings, WizardStep,
};
use crate::tests::common::*;
use crate::tests::mocks::{unavailable_backend, MockDraftBackend};

fn create_key() -> DraftKey {
    DraftKey::for_mode(&WizardMode::Create)
}

async fn seed_draft(store: &MemoryStore, key: &DraftKey, record: &DraftRecord) {
    store
        .set(key.as_str(), &serde_json::to_string(record).unwrap())
        .await
        .unwrap();
}

// ============================================================================
// Submission
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_submit_valid_form_posts_once_and_clears_session() {
    let store = MemoryStore::new();
    let mut api = MockRecipeApi::new();
    api.expect_create_recipe()
        .times(1)
        .withf(|command: &RecipeCommand| {
            let body = serde_json::to_value(command).unwrap();
            body["title"] == "Greek Salad"
                && body["steps"] == serde_json::json!([])
                && body.get("tagIds").is_none()
                && body.get("description").is_none()
                && body["ingredients"][0]["name"] == "Feta"
        })
        .returning(|_| Ok(RecipeId::new("r-1")));
    api.expect_update_recipe().never();

    let TestWizard { mut wizard, host } = create_wizard(api, &store);
    wizard.edit(|f| f.replace(greek_salad()));

    tokio::time::advance(Duration::from_millis(2_500)).await;
    assert!(wizard.tick().await);
    assert!(store.get(create_key().as_str()).await.unwrap().is_some());

    let id = wizard.submit_form().await.expect("submission should succeed");

    assert_eq!(id, RecipeId::new("r-1"));
    assert!(!wizard.has_unsaved_changes());
    assert!(!wizard.is_submitting());
    assert!(wizard.next_autosave_deadline().is_none());
    assert!(store.get(create_key().as_str()).await.unwrap().is_none());
    assert_eq!(wizard.on_leave_attempt(), LeaveDecision::Allow);

    let redirects = host.redirects();
    assert_eq!(redirects.len(), 1);
    assert_eq!(redirects[0].path(), "/recipes/r-1/greek-salad");
    assert!(host.alerts().is_empty());
}

#[tokio::test]
async fn test_submit_stops_at_first_failing_step() {
    let store = MemoryStore::new();
    let mut api = MockRecipeApi::new();
    api.expect_create_recipe().never();

    let TestWizard { mut wizard, host } = create_wizard(api, &store);
    wizard.edit(|f| {
        f.replace(greek_salad());
        f.update_ingredient(0, IngredientField::Name("  ".to_string()));
        f.update_nutrition(NutritionField::Calories, 20_000.0);
    });
    wizard.go_to_step(WizardStep::Review);

    let err = wizard.submit_form().await.unwrap_err();

    assert_eq!(
        err,
        SubmitError::Validation {
            step: WizardStep::Ingredients
        }
    );
    assert_eq!(wizard.current_step(), WizardStep::Ingredients);
    assert_eq!(wizard.state(), SessionState::Editing);
    assert!(wizard.errors().contains("ingredients[0].name"));
    assert!(wizard.has_unsaved_changes());
    assert!(host.redirects().is_empty());
}

#[tokio::test]
async fn test_submit_reports_nutrition_step() {
    let store = MemoryStore::new();
    let mut api = MockRecipeApi::new();
    api.expect_create_recipe().never();

    let TestWizard { mut wizard, .. } = create_wizard(api, &store);
    wizard.edit(|f| {
        f.replace(greek_salad());
        f.update_nutrition(NutritionField::Salt, 150.0);
    });
    wizard.go_to_step(WizardStep::Review);

    let err = wizard.submit_form().await.unwrap_err();

    assert_eq!(
        err,
        SubmitError::Validation {
            step: WizardStep::Nutrition
        }
    );
    assert_eq!(wizard.current_step(), WizardStep::Nutrition);
    assert!(wizard.errors().contains(&field_key::nutrition("salt")));
}

#[tokio::test]
async fn test_submit_api_failure_alerts_and_stays_editable() {
    let store = MemoryStore::new();
    let mut api = MockRecipeApi::new();
    api.expect_create_recipe().times(1).returning(|_| {
        Err(ApiError::Status {
            status: 500,
            message: "Database unavailable".to_string(),
        })
    });

    let TestWizard { mut wizard, host } = create_wizard(api, &store);
    wizard.edit(|f| f.replace(greek_salad()));
    wizard.go_to_step(WizardStep::Review);

    let err = wizard.submit_form().await.unwrap_err();

    assert!(matches!(err, SubmitError::Api(ApiError::Status { status: 500, .. })));
    assert_eq!(host.alerts(), vec!["Database unavailable".to_string()]);
    assert!(host.redirects().is_empty());
    assert!(!wizard.is_submitting());
    assert!(wizard.can_submit());
    assert_eq!(wizard.current_step(), WizardStep::Review);
    assert!(wizard.has_unsaved_changes());
    assert_eq!(wizard.on_leave_attempt(), LeaveDecision::Confirm);
}

#[tokio::test]
async fn test_submit_bad_request_surfaces_server_message() {
    let store = MemoryStore::new();
    let mut api = MockRecipeApi::new();
    api.expect_create_recipe()
        .returning(|_| Err(ApiError::from_status(400, "Title already taken".to_string())));

    let TestWizard { mut wizard, host } = create_wizard(api, &store);
    wizard.edit(|f| f.replace(greek_salad()));

    assert!(wizard.submit_form().await.is_err());

    let alerts = host.alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("Title already taken"));
}

#[tokio::test]
async fn test_edit_mode_submit_updates_recipe() {
    let store = MemoryStore::new();
    let recipe = stored_recipe("r-9", 2);

    let mut api = MockRecipeApi::new();
    api.expect_create_recipe().never();
    api.expect_update_recipe()
        .times(1)
        .withf(|id: &RecipeId, command: &RecipeCommand| {
            id.as_str() == "r-9"
                && command.description.as_deref() == Some("Hearty and cheap")
                && command.steps.len() == 2
                && command.steps[0].instruction == "Rinse the lentils"
                && command.tag_ids.as_ref().map(|t| t.len()) == Some(2)
        })
        .returning(|id, _| Ok(id.clone()));

    let TestWizard { mut wizard, host } = edit_wizard(api, &store, &recipe);
    wizard.edit(|f| f.update_field(FieldUpdate::Servings(6)));

    let id = wizard.submit_form().await.unwrap();

    assert_eq!(id.as_str(), "r-9");
    assert_eq!(host.redirects()[0].path(), "/recipes/r-9/lentil-soup");
}

#[test]
fn test_build_command_trims_and_omits_empty_fields() {
    let store = MemoryStore::new();
    let TestWizard { mut wizard, .. } = create_wizard(MockRecipeApi::new(), &store);
    wizard.edit(|f| {
        f.replace(greek_salad());
        f.update_field(FieldUpdate::Title("  Greek Salad  ".to_string()));
        f.update_field(FieldUpdate::Description("   ".to_string()));
        f.toggle_steps_enabled(true);
        f.update_step_instruction(0, "Chop".to_string());
        f.toggle_steps_enabled(false);
    });

    let command = wizard.build_command();
    assert_eq!(command.title, "Greek Salad");
    assert_eq!(command.description, None);
    assert!(command.steps.is_empty());
    assert_eq!(command.tag_ids, None);

    wizard.edit(|f| {
        f.toggle_steps_enabled(true);
        f.toggle_tag(TagId::new("vegetarian"));
    });
    let command = wizard.build_command();
    assert_eq!(command.steps.len(), 1);
    assert_eq!(command.tag_ids.map(|t| t.len()), Some(1));
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_next_step_requires_valid_current_step() {
    let store = MemoryStore::new();
    let TestWizard { mut wizard, host } = create_wizard(MockRecipeApi::new(), &store);

    assert!(!wizard.can_proceed_to_next_step());
    assert!(!wizard.next_step());
    assert_eq!(wizard.current_step(), WizardStep::BasicInfo);
    assert_eq!(wizard.errors().get(field_key::TITLE), Some("Title is required"));
    assert_eq!(host.scroll_count(), 0);

    wizard.edit(|f| f.update_field(FieldUpdate::Title("Pancakes".to_string())));
    assert!(!wizard.errors().contains(field_key::TITLE));
    assert!(wizard.can_proceed_to_next_step());
    assert!(wizard.next_step());

    assert_eq!(wizard.current_step(), WizardStep::Ingredients);
    assert_eq!(host.scroll_count(), 1);
}

#[test]
fn test_previous_step_never_validates() {
    let store = MemoryStore::new();
    let TestWizard { mut wizard, .. } = create_wizard(MockRecipeApi::new(), &store);

    wizard.go_to_step(WizardStep::Nutrition);
    wizard.previous_step();
    assert_eq!(wizard.current_step(), WizardStep::PreparationSteps);
    assert!(wizard.errors().is_empty());

    wizard.go_to_step(WizardStep::BasicInfo);
    wizard.previous_step();
    assert_eq!(wizard.current_step(), WizardStep::BasicInfo);
}

#[test]
fn test_next_step_clamps_at_review() {
    let store = MemoryStore::new();
    let TestWizard { mut wizard, host } = create_wizard(MockRecipeApi::new(), &store);

    wizard.go_to_step(WizardStep::Review);
    assert!(wizard.next_step());
    assert_eq!(wizard.current_step(), WizardStep::Review);
    assert_eq!(host.scroll_count(), 0);
}

#[test]
fn test_disabled_steps_pass_and_clear_old_errors() {
    let store = MemoryStore::new();
    let TestWizard { mut wizard, .. } = create_wizard(MockRecipeApi::new(), &store);

    wizard.edit(|f| f.toggle_steps_enabled(true));
    assert!(!wizard.validate_step(WizardStep::PreparationSteps));
    assert!(wizard.errors().contains("steps[0].instruction"));

    wizard.edit(|f| f.toggle_steps_enabled(false));
    assert!(wizard.validate_step(WizardStep::PreparationSteps));
    assert!(!wizard.errors().contains("steps[0].instruction"));
}

// ============================================================================
// Drafts
// ============================================================================

#[tokio::test]
async fn test_draft_detection_runs_once() {
    let record = DraftRecord {
        timestamp: Utc::now(),
        step: WizardStep::Tags,
        data: greek_salad(),
    };
    let payload = serde_json::to_string(&record).unwrap();

    let mut backend = MockDraftBackend::new();
    backend
        .expect_get()
        .times(1)
        .returning(move |_| Ok(Some(payload.clone())));

    let (deps, _host) = wizard_deps(MockRecipeApi::new(), Arc::new(backend));
    let mut wizard = WizardController::create(deps, WizardSettings::default());

    assert!(wizard.detect_draft().await);
    assert!(wizard.detect_draft().await);
    assert!(wizard.has_draft());
}

#[tokio::test]
async fn test_restore_draft_replaces_form_and_step() {
    let store = MemoryStore::new();
    let mut saved = greek_salad();
    saved.title = "Tomato Soup".to_string();
    seed_draft(
        &store,
        &create_key(),
        &DraftRecord {
            timestamp: Utc::now(),
            step: WizardStep::Nutrition,
            data: saved.clone(),
        },
    )
    .await;

    let TestWizard { mut wizard, .. } = create_wizard(MockRecipeApi::new(), &store);
    assert!(wizard.detect_draft().await);

    assert!(wizard.restore_draft().await);

    assert_eq!(wizard.current_step(), WizardStep::Nutrition);
    assert_eq!(wizard.form_data(), &saved);
    assert!(wizard.has_unsaved_changes());
    assert!(!wizard.has_draft());
    assert!(!wizard.is_restoring_draft());
    assert!(wizard.next_autosave_deadline().is_some());
    assert_eq!(wizard.on_leave_attempt(), LeaveDecision::Confirm);
}

#[tokio::test]
async fn test_restore_draft_miss_resets_flags() {
    let store = MemoryStore::new();
    let TestWizard { mut wizard, .. } = create_wizard(MockRecipeApi::new(), &store);

    assert!(!wizard.detect_draft().await);
    assert!(!wizard.restore_draft().await);

    assert_eq!(wizard.state(), SessionState::Editing);
    assert_eq!(wizard.current_step(), WizardStep::BasicInfo);
    assert_eq!(wizard.form_data(), &FormData::default());
    assert!(!wizard.has_unsaved_changes());
}

#[tokio::test]
async fn test_discard_draft_keeps_in_memory_edits() {
    let store = MemoryStore::new();
    seed_draft(
        &store,
        &create_key(),
        &DraftRecord {
            timestamp: Utc::now(),
            step: WizardStep::Ingredients,
            data: greek_salad(),
        },
    )
    .await;

    let TestWizard { mut wizard, host } = create_wizard(MockRecipeApi::new(), &store);
    assert!(wizard.detect_draft().await);
    wizard.edit(|f| f.update_field(FieldUpdate::Title("Fresh start".to_string())));

    wizard.discard_draft().await;

    assert!(!wizard.has_draft());
    assert_eq!(wizard.form_data().title, "Fresh start");
    assert!(wizard.has_unsaved_changes());
    assert!(store.get(create_key().as_str()).await.unwrap().is_none());
    assert!(host.redirects().is_empty());
}

#[tokio::test]
async fn test_discard_all_changes_in_create_mode_goes_to_list() {
    let store = MemoryStore::new();
    let TestWizard { mut wizard, host } = create_wizard(MockRecipeApi::new(), &store);
    wizard.edit(|f| f.replace(greek_salad()));

    wizard.discard_all_changes().await;

    assert!(!wizard.has_unsaved_changes());
    assert!(wizard.next_autosave_deadline().is_none());
    assert_eq!(wizard.on_leave_attempt(), LeaveDecision::Allow);
    assert_eq!(host.redirects(), vec![Route::RecipeList]);
}

#[tokio::test]
async fn test_discard_all_changes_in_edit_mode_goes_to_detail() {
    let store = MemoryStore::new();
    let recipe = stored_recipe("r-7", 0);
    let key = DraftKey::for_recipe(&recipe.id);

    let TestWizard { mut wizard, host } = edit_wizard(MockRecipeApi::new(), &store, &recipe);
    wizard.edit(|f| f.update_field(FieldUpdate::IsPublic(false)));
    DraftStore::with_default_ttl(Arc::new(store.clone()))
        .save(&key, WizardStep::BasicInfo, wizard.form_data())
        .await;

    wizard.discard_all_changes().await;

    assert!(store.get(key.as_str()).await.unwrap().is_none());
    assert_eq!(host.redirects()[0].path(), "/recipes/r-7/lentil-soup");
}

#[tokio::test]
async fn test_discard_all_changes_ignores_unsaved_title() {
    let store = MemoryStore::new();
    let recipe = stored_recipe("r-8", 0);

    let TestWizard { mut wizard, host } = edit_wizard(MockRecipeApi::new(), &store, &recipe);
    wizard.edit(|f| f.update_field(FieldUpdate::Title("Spicy Lentil Stew".to_string())));

    wizard.discard_all_changes().await;

    assert_eq!(host.redirects()[0].path(), "/recipes/r-8/lentil-soup");
}

#[tokio::test]
async fn test_expired_edit_draft_is_absent_and_deleted() {
    let store = MemoryStore::new();
    let recipe = stored_recipe("r-3", 0);
    let key = DraftKey::for_recipe(&recipe.id);
    seed_draft(
        &store,
        &key,
        &DraftRecord {
            timestamp: Utc::now() - chrono::Duration::hours(25),
            step: WizardStep::Tags,
            data: FormData::from_recipe(&recipe),
        },
    )
    .await;

    let TestWizard { mut wizard, .. } = edit_wizard(MockRecipeApi::new(), &store, &recipe);

    assert!(!wizard.detect_draft().await);
    assert!(store.get(key.as_str()).await.unwrap().is_none());
    assert_eq!(wizard.current_step(), WizardStep::BasicInfo);
}

#[tokio::test]
async fn test_unavailable_storage_never_blocks_editing() {
    let (deps, _host) = wizard_deps(MockRecipeApi::new(), Arc::new(unavailable_backend()));
    let mut wizard = WizardController::create(deps, WizardSettings::default());

    assert!(!wizard.detect_draft().await);
    assert!(!wizard.restore_draft().await);
    wizard.discard_draft().await;

    wizard.edit(|f| f.update_field(FieldUpdate::Title("Still editable".to_string())));
    assert_eq!(wizard.form_data().title, "Still editable");
}

// ============================================================================
// Autosave
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_autosave_persists_latest_snapshot_after_quiet_window() {
    let store = MemoryStore::new();
    let TestWizard { mut wizard, .. } = create_wizard(MockRecipeApi::new(), &store);

    wizard.edit(|f| f.update_field(FieldUpdate::Title("Pan".to_string())));
    assert_eq!(wizard.autosave_status(), AutoSaveStatus::Pending);

    tokio::time::advance(Duration::from_millis(2_000)).await;
    wizard.edit(|f| f.update_field(FieldUpdate::Title("Pancakes".to_string())));

    tokio::time::advance(Duration::from_millis(2_000)).await;
    assert!(!wizard.tick().await);
    assert!(store.get(create_key().as_str()).await.unwrap().is_none());

    tokio::time::advance(Duration::from_millis(500)).await;
    assert!(wizard.tick().await);
    assert_eq!(wizard.autosave_status(), AutoSaveStatus::Saved);
    assert!(wizard.next_autosave_deadline().is_none());

    let record = DraftStore::with_default_ttl(Arc::new(store.clone()))
        .detect(&create_key())
        .await
        .expect("draft should be saved");
    assert_eq!(record.data.title, "Pancakes");
    assert_eq!(record.step, WizardStep::BasicInfo);
}

#[tokio::test(start_paused = true)]
async fn test_step_change_rearms_autosave() {
    let store = MemoryStore::new();
    let TestWizard { mut wizard, .. } = create_wizard(MockRecipeApi::new(), &store);
    wizard.edit(|f| f.replace(greek_salad()));

    tokio::time::advance(Duration::from_millis(2_000)).await;
    assert!(wizard.next_step());

    tokio::time::advance(Duration::from_millis(2_000)).await;
    assert!(!wizard.tick().await);

    tokio::time::advance(Duration::from_millis(500)).await;
    assert!(wizard.tick().await);

    let record = DraftStore::with_default_ttl(Arc::new(store.clone()))
        .detect(&create_key())
        .await
        .unwrap();
    assert_eq!(record.step, WizardStep::Ingredients);
}

#[tokio::test(start_paused = true)]
async fn test_autosave_idle_without_changes() {
    let store = MemoryStore::new();
    let TestWizard { mut wizard, .. } = create_wizard(MockRecipeApi::new(), &store);

    wizard.go_to_step(WizardStep::Tags);
    tokio::time::advance(Duration::from_secs(10)).await;

    assert!(wizard.next_autosave_deadline().is_none());
    assert!(!wizard.tick().await);
    assert_eq!(wizard.autosave_status(), AutoSaveStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_autosave_failure_is_reported_not_raised() {
    let (deps, _host) = wizard_deps(MockRecipeApi::new(), Arc::new(unavailable_backend()));
    let mut wizard = WizardController::create(deps, WizardSettings::default());

    wizard.edit(|f| f.update_field(FieldUpdate::Title("Offline".to_string())));
    tokio::time::advance(Duration::from_millis(2_500)).await;

    assert!(wizard.tick().await);
    assert_eq!(wizard.autosave_status(), AutoSaveStatus::Failed);
    assert!(wizard.has_unsaved_changes());
}

#[test]
fn test_rejected_tag_does_not_dirty_session() {
    let store = MemoryStore::new();
    let recipe = stored_recipe("r-5", 5);
    let TestWizard { mut wizard, .. } = edit_wizard(MockRecipeApi::new(), &store, &recipe);

    let outcome = wizard.edit(|f| f.toggle_tag(TagId::new("sixth")));

    assert_eq!(outcome, TagToggle::Rejected);
    assert_eq!(wizard.form_data().tag_ids.len(), 5);
    assert!(wizard.errors().contains(field_key::TAGS));
    assert!(!wizard.has_unsaved_changes());
    assert!(wizard.next_autosave_deadline().is_none());

    let outcome = wizard.edit(|f| f.toggle_tag(TagId::new("tag-0")));
    assert_eq!(outcome, TagToggle::Removed);
    assert!(wizard.has_unsaved_changes());
}

// ============================================================================
// Page leave
// ============================================================================

#[test]
fn test_leave_prompt_follows_unsaved_changes() {
    let store = MemoryStore::new();
    let TestWizard { mut wizard, host } = create_wizard(MockRecipeApi::new(), &store);
    let interceptor = wizard.leave_interceptor();

    assert_eq!(interceptor.on_leave_attempt(), LeaveDecision::Allow);
    wizard.edit(|f| f.replace(greek_salad()));
    assert_eq!(interceptor.on_leave_attempt(), LeaveDecision::Confirm);

    drop(wizard);
    assert!(!interceptor.is_registered());
    assert_eq!(interceptor.on_leave_attempt(), LeaveDecision::Allow);
    assert!(host.redirects().is_empty());
}

#[tokio::test]
async fn test_leave_is_guarded_while_submission_in_flight() {
    let store = MemoryStore::new();
    let shared: Arc<Mutex<Option<LeaveInterceptor>>> = Arc::new(Mutex::new(None));
    let observed: Arc<Mutex<Option<LeaveDecision>>> = Arc::new(Mutex::new(None));

    let mut api = MockRecipeApi::new();
    let (slot, seen) = (shared.clone(), observed.clone());
    api.expect_create_recipe().returning(move |_| {
        let decision = slot
            .lock()
            .unwrap()
            .as_ref()
            .map(LeaveInterceptor::on_leave_attempt);
        *seen.lock().unwrap() = decision;
        Ok(RecipeId::new("r-2"))
    });

    let TestWizard { mut wizard, .. } = create_wizard(api, &store);
    let interceptor = wizard.leave_interceptor();
    *shared.lock().unwrap() = Some(interceptor.clone());
    wizard.edit(|f| f.replace(greek_salad()));

    wizard.submit_form().await.unwrap();

    assert_eq!(*observed.lock().unwrap(), Some(LeaveDecision::Confirm));
    assert_eq!(interceptor.on_leave_attempt(), LeaveDecision::Allow);
}
