use sqlx::PgPool;

use crate::auth::dto::{PublicUser, RegisterInput};
use crate::auth::repo_types::User;
use crate::config::IdentifierMode;

const USER_COLUMNS: &str =
    "id, email, username, password_hash, name, age, sex, created_at, updated_at";

impl User {
    /// Find a user by the login identifier. In email mode only the email
    /// column is consulted; in email-or-username mode either column may match.
    pub async fn find_by_identifier(
        db: &PgPool,
        identifier: &str,
        mode: IdentifierMode,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = match mode {
            IdentifierMode::Email => format!(
                "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
            ),
            IdentifierMode::EmailOrUsername => format!(
                "SELECT {USER_COLUMNS} FROM users WHERE email = $1 OR username = $1"
            ),
        };
        sqlx::query_as::<_, User>(&query)
            .bind(identifier)
            .fetch_optional(db)
            .await
    }

    /// Insert a new user. Duplicate email or username is caught by the unique
    /// indexes, so two racing registrations cannot both commit.
    pub async fn create(
        db: &PgPool,
        input: &RegisterInput,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, username, password_hash, name, age, sex)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&input.email)
        .bind(&input.username)
        .bind(password_hash)
        .bind(&input.name)
        .bind(input.age)
        .bind(input.sex)
        .fetch_one(db)
        .await
    }

    /// Resolve a token subject to its public projection. The password hash is
    /// excluded from the fetched columns, not just from serialization.
    pub async fn find_public_by_id(
        db: &PgPool,
        id: uuid::Uuid,
    ) -> Result<Option<PublicUser>, sqlx::Error> {
        sqlx::query_as::<_, PublicUser>(
            r#"
            SELECT id, email, username, name, age, sex
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }
}
