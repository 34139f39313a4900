//! Feedback submission endpoint
//!
//! `POST /api/feedback` decodes the body, normalizes it, stamps it with
//! server metadata and makes exactly one insert attempt.

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde_json::Value;
use std::borrow::Cow;
use std::net::SocketAddr;

use crate::{
    api::{AppState, FeedbackAccepted},
    error::{Error, Result},
    logging::Timer,
    models::{normalize, ClientMetadata, PersistedFeedback, ValidationError},
};

/// Header consulted before the transport address
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Map a body extraction failure onto a `body` validation error
fn reject_body(rejection: JsonRejection) -> Error {
    tracing::debug!(rejection = %rejection, "Undecodable request body");

    match rejection {
        JsonRejection::MissingJsonContentType(_) => ValidationError::body_not_json().into(),
        _ => ValidationError::body_not_object().into(),
    }
}

/// Header value as text; bytes outside visible ASCII are decoded lossily
fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cow<'a, str>> {
    headers.get(name).map(|v| String::from_utf8_lossy(v.as_bytes()))
}

/// Collect caller address and user agent from the request
pub fn client_metadata(headers: &HeaderMap, remote_addr: Option<SocketAddr>) -> ClientMetadata {
    let forwarded_for = header_text(headers, FORWARDED_FOR_HEADER);
    let user_agent = header_text(headers, header::USER_AGENT.as_str());

    ClientMetadata::new(
        forwarded_for.as_deref(),
        remote_addr.map(|addr| addr.ip()),
        user_agent.as_deref(),
    )
}

/// Accept one feedback submission.
///
/// Validation failures answer 400 with the failing field; a storage failure
/// answers 500 with field `server` and a generic message.
pub async fn submit_feedback(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<FeedbackAccepted>)> {
    let Json(raw) = payload.map_err(reject_body)?;

    let feedback = normalize(&raw)?;

    let client = client_metadata(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    let doc = PersistedFeedback::new(feedback, client);

    let timer = Timer::start("feedback_insert");
    let inserted = state.repository.insert(&doc).await;
    timer.stop();
    let id = inserted?;

    tracing::info!(
        id = %id,
        rating = doc.feedback.rating,
        research_optin = %doc.feedback.research_optin,
        "Feedback accepted"
    );

    Ok((StatusCode::CREATED, Json(FeedbackAccepted::new(id))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResearchOptIn;
    use crate::test_utils::{shape_a_payload, MockFeedbackRepository};
    use axum::http::HeaderValue;
    use axum::response::IntoResponse;
    use std::sync::Arc;

    fn state_with(repo: &MockFeedbackRepository) -> AppState {
        AppState::new(Arc::new(repo.clone()))
    }

    #[test]
    fn test_client_metadata_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR_HEADER, "203.0.113.9".parse().unwrap());
        headers.insert(header::USER_AGENT, "Mozilla/5.0".parse().unwrap());

        let peer: SocketAddr = "10.1.2.3:40000".parse().unwrap();
        let meta = client_metadata(&headers, Some(peer));
        assert_eq!(meta.ip.as_deref(), Some("203.0.113.9"));
        assert_eq!(meta.user_agent.as_deref(), Some("Mozilla/5.0"));

        let meta = client_metadata(&HeaderMap::new(), Some(peer));
        assert_eq!(meta.ip.as_deref(), Some("10.1.2.3"));
        assert!(meta.user_agent.is_none());
    }

    #[test]
    fn test_client_metadata_keeps_non_ascii_forwarded_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            FORWARDED_FOR_HEADER,
            HeaderValue::from_bytes(b"203.0.113.7, caf\xc3\xa9").unwrap(),
        );
        headers.insert(header::USER_AGENT, HeaderValue::from_bytes(b"agent \xff").unwrap());

        let peer: SocketAddr = "10.1.2.3:40000".parse().unwrap();
        let meta = client_metadata(&headers, Some(peer));
        assert_eq!(meta.ip.as_deref(), Some("203.0.113.7, caf\u{e9}"));
        assert_eq!(meta.user_agent.as_deref(), Some("agent \u{fffd}"));
    }

    #[tokio::test]
    async fn test_submit_feedback_stores_record() {
        let repo = MockFeedbackRepository::new();
        let peer: SocketAddr = "127.0.0.1:5555".parse().unwrap();

        let (status, Json(body)) = submit_feedback(
            State(state_with(&repo)),
            Some(ConnectInfo(peer)),
            HeaderMap::new(),
            Ok(Json(shape_a_payload())),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.message, "Feedback accepted");

        let stored = repo.get_all().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].0.to_string(), body.id);
        assert_eq!(stored[0].1.feedback.research_optin, ResearchOptIn::Interested);
        assert_eq!(stored[0].1.ip.as_deref(), Some("127.0.0.1"));
    }

    #[tokio::test]
    async fn test_submit_feedback_validation_failure_skips_storage() {
        let repo = MockFeedbackRepository::new();

        let err = submit_feedback(
            State(state_with(&repo)),
            None,
            HeaderMap::new(),
            Ok(Json(serde_json::json!({ "rating": 0 }))),
        )
        .await
        .unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(repo.insert_attempts(), 0);
    }

    #[tokio::test]
    async fn test_submit_feedback_storage_failure() {
        let repo = MockFeedbackRepository::new();
        repo.fail_next_operation("disk full");

        let err = submit_feedback(
            State(state_with(&repo)),
            None,
            HeaderMap::new(),
            Ok(Json(shape_a_payload())),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Database(_)));
        assert_eq!(repo.insert_attempts(), 1);
    }
}
