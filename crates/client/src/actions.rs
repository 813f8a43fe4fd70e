//! Server actions as seen from the client.

use std::time::Duration;

use async_trait::async_trait;
use buzzify_common::RelationKind;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::cache::ToggleView;
use crate::config::ClientConfig;
use crate::error::ActionError;

/// The server half of a toggle.
#[async_trait]
pub trait ServerActions: Send + Sync {
    /// Flip the relation and return the committed view.
    async fn toggle(&self, kind: RelationKind, target_id: &str) -> Result<ToggleView, ActionError>;

    /// Read the current view without changing anything.
    async fn fetch_view(
        &self,
        kind: RelationKind,
        target_id: &str,
    ) -> Result<ToggleView, ActionError>;

    /// Read a user's follower count. The count rides in [`ToggleView::count`].
    async fn fetch_follower_count(&self, user_id: &str) -> Result<ToggleView, ActionError>;
}

/// Endpoint paths relative to the API base.
const fn toggle_path(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Follow => "following/toggle",
        RelationKind::Like => "likes/toggle",
        RelationKind::Save => "saved/toggle",
    }
}

const FOLLOWER_COUNT_PATH: &str = "following/counts";

const fn view_path(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Follow => "following/status",
        RelationKind::Like => "likes/info",
        RelationKind::Save => "saved/status",
    }
}

fn request_body(kind: RelationKind, target_id: &str) -> Value {
    if kind.targets_user() {
        json!({ "userId": target_id })
    } else {
        json!({ "postId": target_id })
    }
}

#[derive(Debug, Deserialize)]
struct DataEnvelope {
    data: WireView,
}

/// Union of the follow, like, save and follow-count payloads.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireView {
    is_following: Option<bool>,
    is_liked_by_user: Option<bool>,
    is_saved: Option<bool>,
    likes: Option<u64>,
    followers: Option<u64>,
}

impl From<WireView> for ToggleView {
    fn from(wire: WireView) -> Self {
        let active = wire
            .is_following
            .or(wire.is_liked_by_user)
            .or(wire.is_saved)
            .unwrap_or(false);
        Self {
            active,
            count: wire.likes.or(wire.followers),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Decode an API response body into a view or an error.
fn decode(status: u16, body: &str) -> Result<ToggleView, ActionError> {
    if (200..300).contains(&status) {
        let envelope: DataEnvelope = serde_json::from_str(body)
            .map_err(|e| ActionError::TransientFailure(format!("Malformed response: {e}")))?;
        return Ok(envelope.data.into());
    }

    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => Err(ActionError::from_code(
            &envelope.error.code,
            envelope.error.message,
        )),
        Err(_) if status == 401 => Err(ActionError::Unauthenticated),
        Err(_) => Err(ActionError::TransientFailure(format!(
            "Server responded with {status}"
        ))),
    }
}

/// [`ServerActions`] over the buzzify HTTP API.
#[derive(Clone)]
pub struct HttpServerActions {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl HttpServerActions {
    /// Create a client for the configured API.
    pub fn new(config: &ClientConfig) -> Result<Self, ActionError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("buzzify-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base: config.api_base.clone(),
            token: config.token.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ActionError> {
        self.base
            .join(path)
            .map_err(|e| ActionError::TransientFailure(format!("Invalid endpoint {path}: {e}")))
    }

    async fn post(&self, path: &str, body: Value) -> Result<ToggleView, ActionError> {
        let url = self.endpoint(path)?;
        let mut request = self.client.post(url.clone()).json(&body);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Server action request failed");
            ActionError::from(e)
        })?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        debug!(url = %url, status, "Server action response");

        decode(status, &text)
    }
}

#[async_trait]
impl ServerActions for HttpServerActions {
    async fn toggle(&self, kind: RelationKind, target_id: &str) -> Result<ToggleView, ActionError> {
        if self.token.is_none() {
            return Err(ActionError::Unauthenticated);
        }
        self.post(toggle_path(kind), request_body(kind, target_id))
            .await
    }

    async fn fetch_view(
        &self,
        kind: RelationKind,
        target_id: &str,
    ) -> Result<ToggleView, ActionError> {
        self.post(view_path(kind), request_body(kind, target_id))
            .await
    }

    async fn fetch_follower_count(&self, user_id: &str) -> Result<ToggleView, ActionError> {
        self.post(
            FOLLOWER_COUNT_PATH,
            request_body(RelationKind::Follow, user_id),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_per_kind() {
        assert_eq!(
            request_body(RelationKind::Follow, "u1"),
            json!({ "userId": "u1" })
        );
        assert_eq!(
            request_body(RelationKind::Like, "p1"),
            json!({ "postId": "p1" })
        );
    }

    #[test]
    fn test_decode_like_info() {
        let view = decode(200, r#"{"data":{"likes":6,"isLikedByUser":true}}"#).unwrap();
        assert_eq!(view, ToggleView::counted(true, 6));
    }

    #[test]
    fn test_decode_follow_and_save() {
        let view = decode(200, r#"{"data":{"isFollowing":false}}"#).unwrap();
        assert_eq!(view, ToggleView::status(false));

        let view = decode(200, r#"{"data":{"isSaved":true}}"#).unwrap();
        assert_eq!(view, ToggleView::status(true));
    }

    #[test]
    fn test_decode_follow_counts() {
        let view = decode(200, r#"{"data":{"followers":12,"following":3}}"#).unwrap();
        assert_eq!(view, ToggleView::counted(false, 12));
    }

    #[test]
    fn test_decode_api_error() {
        let body = r#"{"error":{"code":"INVALID_OPERATION","message":"You cannot follow yourself"}}"#;
        assert_eq!(
            decode(400, body),
            Err(ActionError::InvalidOperation(
                "You cannot follow yourself".to_string()
            ))
        );
    }

    #[test]
    fn test_decode_unstructured_errors() {
        assert_eq!(decode(401, "nope"), Err(ActionError::Unauthenticated));
        assert!(matches!(
            decode(502, "<html>bad gateway</html>"),
            Err(ActionError::TransientFailure(_))
        ));
        assert!(matches!(
            decode(200, "not json"),
            Err(ActionError::TransientFailure(_))
        ));
    }

    #[test]
    fn test_endpoint_joins_base() {
        let config = ClientConfig::new(Url::parse("https://buzzify.example/api/").unwrap());
        let actions = HttpServerActions::new(&config).unwrap();

        assert_eq!(
            actions.endpoint(toggle_path(RelationKind::Save)).unwrap().as_str(),
            "https://buzzify.example/api/saved/toggle"
        );
        assert_eq!(
            actions.endpoint(view_path(RelationKind::Follow)).unwrap().as_str(),
            "https://buzzify.example/api/following/status"
        );
        assert_eq!(
            actions.endpoint(FOLLOWER_COUNT_PATH).unwrap().as_str(),
            "https://buzzify.example/api/following/counts"
        );
    }

    #[tokio::test]
    async fn test_toggle_without_token_is_unauthenticated() {
        let config = ClientConfig::new(Url::parse("https://buzzify.example/api/").unwrap());
        let actions = HttpServerActions::new(&config).unwrap();

        let result = actions.toggle(RelationKind::Like, "p1").await;
        assert_eq!(result, Err(ActionError::Unauthenticated));
    }
}
