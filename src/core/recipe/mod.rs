//! Recipe domain model, backend client and the editing wizard.

pub mod api;
pub mod slug;
pub mod types;
pub mod wizard;

pub use api::{load_tags, ApiError, ApiResult, HttpRecipeApi, RecipeApi, TagCatalog};
pub use slug::slugify;
pub use types::*;
