use crate::domain::repositories::RepositoryError;
use crate::domain::value_objects::SettingsError;

/// Coarse error category surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InvalidConfig,
    InvalidRequest,
    ConflictState,
    Unavailable,
}

/// Error returned by every room, playlist and playback operation
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    InvalidConfig(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Already a member of this room")]
    AlreadyMember,
    #[error("Room is full")]
    RoomFull,
    #[error("Password is required for private rooms")]
    PasswordRequired,
    #[error("Invalid password")]
    InvalidPassword,
    #[error("Concurrent modification, retry with fresh state: {0}")]
    ConflictState(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::NotFound(_) => ErrorKind::NotFound,
            SyncError::Forbidden(_) => ErrorKind::Forbidden,
            SyncError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            SyncError::InvalidRequest(_)
            | SyncError::AlreadyMember
            | SyncError::RoomFull
            | SyncError::PasswordRequired
            | SyncError::InvalidPassword => ErrorKind::InvalidRequest,
            SyncError::ConflictState(_) => ErrorKind::ConflictState,
            SyncError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            SyncError::NotFound(_) => "NOT_FOUND",
            SyncError::Forbidden(_) => "FORBIDDEN",
            SyncError::InvalidConfig(_) => "INVALID_CONFIG",
            SyncError::InvalidRequest(_) => "INVALID_REQUEST",
            SyncError::AlreadyMember => "ALREADY_MEMBER",
            SyncError::RoomFull => "ROOM_FULL",
            SyncError::PasswordRequired => "PASSWORD_REQUIRED",
            SyncError::InvalidPassword => "INVALID_PASSWORD",
            SyncError::ConflictState(_) => "CONFLICT_STATE",
            SyncError::Unavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    /// Transient failures a caller may retry against fresh state.
    /// Validation errors are never retried by the core.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ConflictState | ErrorKind::Unavailable
        )
    }

    pub(crate) fn room_not_found() -> Self {
        SyncError::NotFound("Room".to_string())
    }
}

impl From<RepositoryError> for SyncError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => SyncError::NotFound(what),
            RepositoryError::AlreadyExists(_) => SyncError::AlreadyMember,
            RepositoryError::Conflict(msg) => SyncError::ConflictState(msg),
            RepositoryError::Database(msg) => SyncError::Unavailable(msg),
        }
    }
}

impl From<SettingsError> for SyncError {
    fn from(err: SettingsError) -> Self {
        SyncError::InvalidConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_failures_are_invalid_requests() {
        for err in [
            SyncError::AlreadyMember,
            SyncError::RoomFull,
            SyncError::PasswordRequired,
            SyncError::InvalidPassword,
        ] {
            assert_eq!(err.kind(), ErrorKind::InvalidRequest);
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn test_repository_errors_map_to_transient_kinds() {
        let err: SyncError = RepositoryError::Conflict("database is locked".into()).into();
        assert_eq!(err.kind(), ErrorKind::ConflictState);
        assert!(err.is_retryable());

        let err: SyncError = RepositoryError::Database("pool timed out".into()).into();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_missing_password_is_invalid_config() {
        let err: SyncError = SettingsError::MissingPassword.into();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert_eq!(err.to_string(), "Password is required for private rooms");
    }
}
