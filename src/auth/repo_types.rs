use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::{PublicUser, Sex};

/// User record in the database. Email is unique and stored as sent;
/// username is only populated by the email-or-username registration flow and
/// is unique when present.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub age: i32,
    pub sex: Sex,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id,
            email: user.email,
            username: user.username,
            name: user.name,
            age: user.age,
            sex: user.sex,
        }
    }
}
