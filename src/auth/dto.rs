use serde::{Deserialize, Serialize};

use crate::auth::repo::PublicUser;
use crate::recipes::repo::Recipe;

/// Request body for user registration. Fields default to empty so validation
/// can report every missing field instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Echo copy with credential fields blanked; plaintext never leaves the
    /// request scope.
    pub fn redacted(&self) -> Self {
        Self {
            password: String::new(),
            confirm_password: String::new(),
            ..self.clone()
        }
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Echoed back on a rejected login; the password is never returned.
#[derive(Debug, Serialize)]
pub struct LoginEcho {
    pub email: String,
}

/// Partial profile edit. `profile_image` is a stored path produced by the
/// external upload service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub profile_image: Option<String>,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct ProfileData {
    pub user: PublicUser,
    pub recipes: Vec<Recipe>,
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdate {
    pub updated: bool,
    pub user: Option<PublicUser>,
}
