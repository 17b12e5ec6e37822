use serde::{Deserialize, Serialize};

use crate::error::{StackchatError, StackchatResult};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Sign-up payload. The password is only ever sent, never read back.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> StackchatResult<()> {
        require("first_name", &self.first_name)?;
        require("last_name", &self.last_name)?;
        require("email", &self.email)?;
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl UserUpdate {
    pub fn validate(&self) -> StackchatResult<()> {
        require("first_name", &self.first_name)?;
        require("last_name", &self.last_name)?;
        require("email", &self.email)?;
        validate_email(&self.email)
    }
}

impl From<&User> for UserUpdate {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

fn require(field: &str, value: &str) -> StackchatResult<()> {
    if value.trim().is_empty() {
        return Err(StackchatError::ValidationError(format!(
            "{} is required",
            field
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> StackchatResult<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid {
        return Err(StackchatError::ValidationError(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    Ok(())
}

/// Mirrors the backend's password rules so sign-up fails fast.
pub fn validate_password(password: &str) -> StackchatResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(StackchatError::ValidationError(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(StackchatError::ValidationError(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(StackchatError::ValidationError(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(StackchatError::ValidationError(
            "Password must contain at least one digit".to_string(),
        ));
    }
    if !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        return Err(StackchatError::ValidationError(
            "Password must contain at least one special character".to_string(),
        ));
    }
    Ok(())
}
