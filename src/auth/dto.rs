use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::IdentifierMode;
use crate::error::ApiError;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Stored and reported sex attribute. Defaults to `other` when the client
/// omits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "sex", rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    #[default]
    Other,
}

/// Raw registration body. Every field is optional at the wire level so that
/// missing fields surface as a 400 validation error rather than a
/// deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub sex: Option<Sex>,
}

/// Registration input after validation; the only path into `User::create`.
#[derive(Debug)]
pub struct RegisterInput {
    pub email: String,
    pub username: Option<String>,
    pub password: String,
    pub name: String,
    pub age: i32,
    pub sex: Sex,
}

impl RegisterRequest {
    pub fn validate(self, mode: IdentifierMode) -> Result<RegisterInput, ApiError> {
        let email = self
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ApiError::Validation("email is required".into()))?;
        if !is_valid_email(&email) {
            return Err(ApiError::Validation("invalid email".into()));
        }

        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::Validation("password is required".into()))?;
        if password.len() < 8 {
            return Err(ApiError::Validation("password too short".into()));
        }

        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ApiError::Validation("name is required".into()))?;

        let age = self
            .age
            .ok_or_else(|| ApiError::Validation("age is required".into()))?;

        // A username only exists in the email-or-username flow; the email-only
        // flow never stores one.
        let username = match mode {
            IdentifierMode::Email => None,
            IdentifierMode::EmailOrUsername => Some(
                self.username
                    .map(|u| u.trim().to_string())
                    .filter(|u| !u.is_empty())
                    .ok_or_else(|| ApiError::Validation("username is required".into()))?,
            ),
        };

        Ok(RegisterInput {
            email,
            username,
            password,
            name,
            age,
            sex: self.sex.unwrap_or_default(),
        })
    }
}

/// Login body. Clients of the email-only flow send `email`; clients of the
/// email-or-username flow send `emailOrUsername`. Both land in `identifier`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "email", alias = "emailOrUsername")]
    pub identifier: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct LoginInput {
    pub identifier: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(self) -> Result<LoginInput, ApiError> {
        let identifier = self
            .identifier
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .ok_or_else(|| ApiError::Validation("email is required".into()))?;
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::Validation("password is required".into()))?;
        Ok(LoginInput {
            identifier,
            password,
        })
    }
}

/// Public part of a user returned to the client. The password hash never
/// appears here; `User::find_public_by_id` also excludes it from the fetched
/// projection.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub name: String,
    pub age: i32,
    pub sex: Sex,
}

/// Response for register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub user: PublicUser,
}

/// Response for the token-gated profile endpoints.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> RegisterRequest {
        RegisterRequest {
            email: Some("a@x.com".into()),
            username: Some("ann".into()),
            password: Some("Secr3t!!".into()),
            name: Some("A".into()),
            age: Some(30),
            sex: Some(Sex::Other),
        }
    }

    #[test]
    fn register_accepts_full_input() {
        let input = full_request().validate(IdentifierMode::Email).unwrap();
        assert_eq!(input.email, "a@x.com");
        assert_eq!(input.username, None);
        assert_eq!(input.sex, Sex::Other);
    }

    #[test]
    fn register_keeps_username_in_email_or_username_mode() {
        let input = full_request()
            .validate(IdentifierMode::EmailOrUsername)
            .unwrap();
        assert_eq!(input.username.as_deref(), Some("ann"));
    }

    #[test]
    fn register_requires_username_in_email_or_username_mode() {
        let mut req = full_request();
        req.username = None;
        let err = req.validate(IdentifierMode::EmailOrUsername).unwrap_err();
        assert_eq!(err.to_string(), "username is required");
    }

    #[test]
    fn register_rejects_missing_and_malformed_fields() {
        let mut req = full_request();
        req.email = None;
        assert!(req.validate(IdentifierMode::Email).is_err());

        let mut req = full_request();
        req.email = Some("not-an-email".into());
        assert_eq!(
            req.validate(IdentifierMode::Email).unwrap_err().to_string(),
            "invalid email"
        );

        let mut req = full_request();
        req.password = Some("short".into());
        assert_eq!(
            req.validate(IdentifierMode::Email).unwrap_err().to_string(),
            "password too short"
        );

        let mut req = full_request();
        req.age = None;
        assert!(req.validate(IdentifierMode::Email).is_err());
    }

    #[test]
    fn register_defaults_sex_when_omitted() {
        let mut req = full_request();
        req.sex = None;
        let input = req.validate(IdentifierMode::Email).unwrap();
        assert_eq!(input.sex, Sex::Other);
    }

    #[test]
    fn login_accepts_either_identifier_field() {
        let from_email: LoginRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"pw"}"#).unwrap();
        assert_eq!(from_email.identifier.as_deref(), Some("a@x.com"));

        let from_alias: LoginRequest =
            serde_json::from_str(r#"{"emailOrUsername":"ann","password":"pw"}"#).unwrap();
        assert_eq!(from_alias.identifier.as_deref(), Some("ann"));
    }

    #[test]
    fn public_user_serializes_without_password_fields() {
        let user = PublicUser {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            username: None,
            name: "A".into(),
            age: 30,
            sex: Sex::Other,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("a@x.com"));
        assert!(!json.contains("password"));
        assert!(!json.contains("username"));
    }
}
