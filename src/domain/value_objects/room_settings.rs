use serde::{Deserialize, Serialize};

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;
pub const PASSWORD_MIN_LEN: usize = 4;
pub const PASSWORD_MAX_LEN: usize = 50;
pub const MIN_MEMBERS: u32 = 2;
pub const MAX_MEMBERS: u32 = 100;
pub const DEFAULT_MAX_MEMBERS: u32 = 50;

/// Settings supplied when creating a room. `password` is plaintext here and is
/// hashed before it reaches a [`crate::domain::entities::Room`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomSettings {
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub max_members: u32,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            is_public: true,
            password: None,
            max_members: DEFAULT_MAX_MEMBERS,
        }
    }
}

/// Structural problem with room settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Field value out of its allowed shape or range
    Invalid(&'static str),
    /// Private room without a password
    MissingPassword,
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Invalid(msg) => f.write_str(msg),
            SettingsError::MissingPassword => {
                f.write_str("Password is required for private rooms")
            }
        }
    }
}

impl RoomSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_name(&self.name)?;
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        validate_max_members(self.max_members)?;
        match &self.password {
            Some(password) => validate_password(password)?,
            None if !self.is_public => return Err(SettingsError::MissingPassword),
            None => {}
        }
        Ok(())
    }
}

/// Partial update applied by host or moderators
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub max_members: Option<u32>,
}

impl RoomPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.is_public.is_none()
            && self.password.is_none()
            && self.max_members.is_none()
    }

    /// Shape checks only; consistency with the stored room is checked by the caller
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        if let Some(max_members) = self.max_members {
            validate_max_members(max_members)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), SettingsError> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err(SettingsError::Invalid("Room name is required"));
    }
    if len > NAME_MAX_LEN {
        return Err(SettingsError::Invalid("Room name must be at most 100 characters"));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), SettingsError> {
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(SettingsError::Invalid(
            "Description must be at most 500 characters",
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), SettingsError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        return Err(SettingsError::Invalid(
            "Password must be between 4 and 50 characters",
        ));
    }
    Ok(())
}

fn validate_max_members(max_members: u32) -> Result<(), SettingsError> {
    if !(MIN_MEMBERS..=MAX_MEMBERS).contains(&max_members) {
        return Err(SettingsError::Invalid("Max members must be between 2 and 100"));
    }
    Ok(())
}
