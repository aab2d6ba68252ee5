//! Navigation Guard
//!
//! Keeps the user from leaving the wizard with unsaved edits. The host asks
//! a [`LeaveInterceptor`] on every page-leave attempt; the interceptor vetoes
//! the leave while the session has unsaved changes, unless the controller
//! flagged the exit as intentional (successful submit, discard-all).
//!
//! The interceptor shares its flags with the guard through atomics, so the
//! host can consult it while the controller is busy awaiting a submission.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::recipe::slug::slugify;
use crate::core::recipe::types::RecipeId;

// ============================================================================
// Host Port
// ============================================================================

/// Pages the wizard can send the user to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    RecipeList,
    RecipeDetail { id: RecipeId, slug: String },
}

impl Route {
    pub fn detail(id: RecipeId, title: &str) -> Self {
        Route::RecipeDetail {
            id,
            slug: slugify(title),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::RecipeList => "/recipes".to_string(),
            Route::RecipeDetail { id, slug } if slug.is_empty() => format!("/recipes/{id}"),
            Route::RecipeDetail { id, slug } => format!("/recipes/{id}/{slug}"),
        }
    }
}

/// UI environment the controller drives.
pub trait WizardHost: Send + Sync {
    /// Leave the wizard for `route`.
    fn redirect(&self, route: Route);

    /// Scroll the wizard view back to the top after a step change.
    fn scroll_to_top(&self);

    /// Show a blocking alert with a user-facing message.
    fn alert(&self, message: &str);
}

// ============================================================================
// Guard
// ============================================================================

/// Outcome of a leave attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveDecision {
    Allow,
    /// Ask the user to confirm (native prompt)
    Confirm,
}

#[derive(Debug, Default)]
struct GuardFlags {
    registered: AtomicBool,
    unsaved: AtomicBool,
    intentional: AtomicBool,
}

/// Controller-side handle of the navigation guard.
#[derive(Debug, Default)]
pub struct NavigationGuard {
    flags: Arc<GuardFlags>,
}

impl NavigationGuard {
    /// Create a guard whose interceptor is registered for the session.
    pub fn register() -> Self {
        let guard = Self::default();
        guard.flags.registered.store(true, Ordering::SeqCst);
        guard
    }

    /// Host-side handle to consult on leave attempts.
    pub fn interceptor(&self) -> LeaveInterceptor {
        LeaveInterceptor {
            flags: Arc::clone(&self.flags),
        }
    }

    pub fn set_unsaved(&self, unsaved: bool) {
        self.flags.unsaved.store(unsaved, Ordering::SeqCst);
    }

    /// Mark the upcoming exit as intentional; the prompt is skipped from now on.
    pub fn mark_intentional(&self) {
        self.flags.intentional.store(true, Ordering::SeqCst);
    }

    pub fn is_intentional(&self) -> bool {
        self.flags.intentional.load(Ordering::SeqCst)
    }

    pub fn unregister(&self) {
        self.flags.registered.store(false, Ordering::SeqCst);
    }

    pub fn check_leave(&self) -> LeaveDecision {
        self.interceptor().on_leave_attempt()
    }
}

/// Page-leave interceptor handed to the host.
#[derive(Debug, Clone)]
pub struct LeaveInterceptor {
    flags: Arc<GuardFlags>,
}

impl LeaveInterceptor {
    pub fn is_registered(&self) -> bool {
        self.flags.registered.load(Ordering::SeqCst)
    }

    pub fn on_leave_attempt(&self) -> LeaveDecision {
        let flags = &self.flags;
        if flags.registered.load(Ordering::SeqCst)
            && flags.unsaved.load(Ordering::SeqCst)
            && !flags.intentional.load(Ordering::SeqCst)
        {
            LeaveDecision::Confirm
        } else {
            LeaveDecision::Allow
        }
    }
}
