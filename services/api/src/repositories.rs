//! Repositories for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::info;
use uuid::Uuid;

use crate::models::user::{NewUser, Presence, Role, User};

/// Persistent store of user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; a taken email yields `DatabaseError::Duplicate`
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User>;

    /// Find a user by normalized email
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    /// Find the user linked to a Discord account
    async fn find_by_discord_id(&self, discord_id: &str) -> DatabaseResult<Option<User>>;
}

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, email, user_name, password_hash, role, discord_id, \
     discord_name, presence, created_at";

fn user_from_row(row: &PgRow) -> DatabaseResult<User> {
    let role: String = row.try_get("role").map_err(DatabaseError::Query)?;
    let role = role
        .parse::<Role>()
        .map_err(|e| DatabaseError::Query(sqlx::Error::Decode(e.into())))?;
    let presence: Option<Json<Presence>> =
        row.try_get("presence").map_err(DatabaseError::Query)?;

    Ok(User {
        id: row.try_get("id").map_err(DatabaseError::Query)?,
        email: row.try_get("email").map_err(DatabaseError::Query)?,
        user_name: row.try_get("user_name").map_err(DatabaseError::Query)?,
        password_hash: row.try_get("password_hash").map_err(DatabaseError::Query)?,
        role,
        discord_id: row.try_get("discord_id").map_err(DatabaseError::Query)?,
        discord_name: row.try_get("discord_name").map_err(DatabaseError::Query)?,
        presence: presence.map(|p| p.0),
        created_at: row.try_get("created_at").map_err(DatabaseError::Query)?,
    })
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.user_name);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, email, user_name, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.email)
        .bind(&new_user.user_name)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        user_from_row(&row)
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE email = $1
            "#
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_discord_id(&self, discord_id: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE discord_id = $1
            "#
        ))
        .bind(discord_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref().map(user_from_row).transpose()
    }
}
