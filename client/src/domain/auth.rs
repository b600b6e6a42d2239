//! Authentication primitives such as login credentials.
//!
//! [`LoginCredentials`] enforces what the gateway needs: a username and a
//! password. [`validate_login_form`] adds the stricter rules applied to
//! interactive input before a login is issued.

use std::fmt;

use zeroize::Zeroizing;

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
    /// Password was shorter than [`PASSWORD_MIN`].
    PasswordTooShort {
        /// Required minimum length.
        min: usize,
    },
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "Username is required"),
            Self::EmptyPassword => write!(f, "Password is required"),
            Self::PasswordTooShort { min } => {
                write!(f, "Password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by the session service.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use client::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" emilys ", "emilyspass").unwrap();
/// assert_eq!(creds.username(), "emilys");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string sent to the gateway.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validate interactive login input, including the password length rule.
///
/// # Examples
/// ```
/// use client::domain::{validate_login_form, LoginValidationError};
///
/// let err = validate_login_form("emilys", "abc").unwrap_err();
/// assert_eq!(err, LoginValidationError::PasswordTooShort { min: 6 });
/// ```
pub fn validate_login_form(
    username: &str,
    password: &str,
) -> Result<LoginCredentials, LoginValidationError> {
    let credentials = LoginCredentials::try_from_parts(username, password)?;
    if credentials.password().chars().count() < PASSWORD_MIN {
        return Err(LoginValidationError::PasswordTooShort { min: PASSWORD_MIN });
    }
    Ok(credentials)
}
