//! Recipe Backend Ports
//!
//! The wizard consumes two backend endpoints and never reimplements them:
//!
//! - recipe persistence (`POST /recipes`, `PUT /recipes/{id}`)
//! - the tag catalog (`GET /tags`)
//!
//! Both are modelled as async traits so the controller can be driven against
//! mocks in tests. [`HttpRecipeApi`] is the production implementation over
//! `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use super::types::{RecipeCommand, RecipeId, Tag};

// ============================================================================
// Errors
// ============================================================================

/// Failures reported by the recipe backend or the transport.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Validation failed: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build an error from a non-success status and the server's message.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            _ => ApiError::Status { status, message },
        }
    }

    /// Text shown to the user in the submission alert.
    ///
    /// Falls back to the server's message verbatim when there is no more
    /// specific mapping.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) if msg.is_empty() => {
                "The recipe could not be saved because some fields are invalid.".to_string()
            }
            ApiError::BadRequest(msg) => format!("The recipe could not be saved: {msg}"),
            ApiError::Unauthorized(_) => "Please sign in again to save this recipe.".to_string(),
            ApiError::Forbidden(_) => "You do not have permission to edit this recipe.".to_string(),
            ApiError::NotFound(_) => "This recipe no longer exists.".to_string(),
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Network(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ApiError::Decode(msg) => msg.clone(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// Ports
// ============================================================================

/// Recipe persistence endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeApi: Send + Sync {
    /// `POST /recipes`; returns the id of the created recipe
    async fn create_recipe(&self, command: &RecipeCommand) -> ApiResult<RecipeId>;

    /// `PUT /recipes/{id}`; returns the id echoed by the backend
    async fn update_recipe(&self, id: &RecipeId, command: &RecipeCommand) -> ApiResult<RecipeId>;
}

/// Tag catalog endpoint.
#[async_trait]
pub trait TagCatalog: Send + Sync {
    async fn list_tags(&self) -> ApiResult<Vec<Tag>>;
}

/// Fetch the tag catalog, degrading to an empty list on any failure so the
/// tag step stays usable.
pub async fn load_tags(catalog: &dyn TagCatalog) -> Vec<Tag> {
    match catalog.list_tags().await {
        Ok(tags) => tags,
        Err(e) => {
            warn!(error = %e, "Failed to load tag catalog, continuing without tags");
            Vec::new()
        }
    }
}

// ============================================================================
// HTTP Implementation
// ============================================================================

#[derive(Deserialize)]
struct CreatedRecipe {
    id: RecipeId,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// `reqwest` client for the recipe backend.
pub struct HttpRecipeApi {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpRecipeApi {
    pub fn new(
        base_url: impl Into<String>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_recipe(&self, request: reqwest::RequestBuilder) -> ApiResult<RecipeId> {
        let response = self.authorize(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(error_from_response(status, response).await);
        }

        let created: CreatedRecipe = response.json().await?;
        Ok(created.id)
    }
}

async fn error_from_response(status: StatusCode, response: reqwest::Response) -> ApiError {
    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = body
        .message
        .or(body.error)
        .unwrap_or_else(|| {
            if text.is_empty() {
                status.canonical_reason().unwrap_or("Request failed").to_string()
            } else {
                text
            }
        });

    ApiError::from_status(status.as_u16(), message)
}

#[async_trait]
impl RecipeApi for HttpRecipeApi {
    async fn create_recipe(&self, command: &RecipeCommand) -> ApiResult<RecipeId> {
        debug!(title = %command.title, "POST /recipes");
        self.send_recipe(self.client.post(self.url("/recipes")).json(command))
            .await
    }

    async fn update_recipe(&self, id: &RecipeId, command: &RecipeCommand) -> ApiResult<RecipeId> {
        debug!(recipe_id = %id, "PUT /recipes/{{id}}");
        let path = format!("/recipes/{}", urlencoding::encode(id.as_str()));
        self.send_recipe(self.client.put(self.url(&path)).json(command))
            .await
    }
}

#[async_trait]
impl TagCatalog for HttpRecipeApi {
    async fn list_tags(&self) -> ApiResult<Vec<Tag>> {
        let response = self.authorize(self.client.get(self.url("/tags"))).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(error_from_response(status, response).await);
        }

        Ok(response.json().await?)
    }
}
