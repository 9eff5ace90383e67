use axum::{
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;

use crate::application::SyncError;
use crate::domain::entities::Room;

/// Header a client uses to tag a command so it can recognize the echo
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Convert Unix millis to ISO 8601 string
pub fn timestamp_to_rfc3339(ts: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ts)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "1970-01-01T00:00:00Z".to_string())
}

/// Optional client request id, echoed in responses and event origins
pub fn request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= 128)
        .map(String::from)
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.to_string(),
            details: None,
        }),
    )
}

/// Map a core error onto an HTTP status and error body
pub fn api_error(err: SyncError) -> ApiError {
    let status = match &err {
        SyncError::NotFound(_) => StatusCode::NOT_FOUND,
        SyncError::Forbidden(_) | SyncError::InvalidPassword => StatusCode::FORBIDDEN,
        SyncError::InvalidConfig(_)
        | SyncError::InvalidRequest(_)
        | SyncError::PasswordRequired => StatusCode::BAD_REQUEST,
        SyncError::AlreadyMember | SyncError::RoomFull | SyncError::ConflictState(_) => {
            StatusCode::CONFLICT
        }
        SyncError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };

    if status.is_server_error() {
        tracing::warn!("Request failed: {}", err);
    }

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: err.code().to_string(),
            details: err.is_retryable().then(|| "retryable".to_string()),
        }),
    )
}

/// Room summary as returned to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub visibility: String,
    pub is_public: bool,
    pub has_password: bool,
    pub max_members: u32,
    pub host_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_count: Option<usize>,
    pub created_at: String,
    pub updated_at: String,
}

impl RoomResponse {
    pub fn from_room(room: &Room, member_count: Option<usize>) -> Self {
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            description: room.description.clone(),
            visibility: room.visibility().as_str().to_string(),
            is_public: room.is_public,
            has_password: room.has_password(),
            max_members: room.max_members,
            host_id: room.host_id.clone(),
            member_count,
            created_at: timestamp_to_rfc3339(room.created_at),
            updated_at: timestamp_to_rfc3339(room.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(api_error(SyncError::RoomFull).0, StatusCode::CONFLICT);
        assert_eq!(api_error(SyncError::InvalidPassword).0, StatusCode::FORBIDDEN);
        assert_eq!(
            api_error(SyncError::InvalidConfig("x".into())).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            api_error(SyncError::Unavailable("db".into())).0,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_request_id_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), None);

        headers.insert(REQUEST_ID_HEADER, "req-1".parse().unwrap());
        assert_eq!(request_id(&headers), Some("req-1".to_string()));
    }
}
