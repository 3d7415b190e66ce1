//! User Repository
//!
//! Persistence seam for users. The PostgreSQL implementation relies on the
//! `users.email` unique index for duplicate detection.

use crate::error::{is_unique_violation, AuthError};
use crate::models::{NewUser, User, UserChanges, UserQuery};

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    /// Insert a user; a taken email is `EmailExists`
    async fn create(&self, user: NewUser) -> Result<User, AuthError>;

    /// Apply profile changes; `None` when the user does not exist
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AuthError>;

    /// Store or clear the hash of the currently valid refresh token
    async fn set_refresh_token_hash(&self, id: Uuid, hash: Option<String>) -> Result<(), AuthError>;

    /// One page of users plus the total matching count
    async fn list(&self, query: &UserQuery) -> Result<(Vec<User>, i64), AuthError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AuthError>;
}

/// PostgreSQL-backed user repository
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &UserQuery) {
    if let Some(q) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
        let pattern = format!("%{}%", q.trim());
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(role) = query.role {
        qb.push(" AND ").push_bind(role).push(" = ANY(roles)");
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, AuthError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, name)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::EmailExists
            } else {
                e.into()
            }
        })
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AuthError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                avatar_url = COALESCE($4, avatar_url),
                bio = COALESCE($5, bio),
                roles = COALESCE($6, roles),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.avatar_url)
        .bind(changes.bio)
        .bind(changes.roles)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::EmailExists
            } else {
                e.into()
            }
        })
    }

    async fn set_refresh_token_hash(&self, id: Uuid, hash: Option<String>) -> Result<(), AuthError> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(hash)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!(user_id = %id, "Refresh token hash not stored, user is gone");
        }

        Ok(())
    }

    async fn list(&self, query: &UserQuery) -> Result<(Vec<User>, i64), AuthError> {
        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM users WHERE TRUE");
        push_filters(&mut select, query);
        select
            .push(" ORDER BY ")
            .push(query.sort_column())
            .push(" ASC LIMIT ")
            .push_bind(query.limit())
            .push(" OFFSET ")
            .push_bind(query.offset());

        let users = select.build_query_as::<User>().fetch_all(&self.db).await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE TRUE");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.db).await?;

        Ok((users, total))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AuthError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Create the user role type and the users table
pub async fn run_migrations(db: &PgPool) -> Result<(), AuthError> {
    tracing::info!("Running authentication database migrations");

    sqlx::query(
        r#"
        DO $$ BEGIN
            CREATE TYPE user_role AS ENUM ('attendee', 'organizer', 'admin');
        EXCEPTION
            WHEN duplicate_object THEN null;
        END $$;
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email VARCHAR(255) NOT NULL UNIQUE,
            password_hash VARCHAR(255) NOT NULL,
            name VARCHAR(100) NOT NULL,
            avatar_url VARCHAR(500),
            bio VARCHAR(280),
            roles user_role[] NOT NULL DEFAULT ARRAY['attendee']::user_role[]
                CHECK (cardinality(roles) > 0),
            refresh_token_hash VARCHAR(255),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_roles ON users USING GIN (roles);")
        .execute(db)
        .await?;

    tracing::info!("Authentication migrations completed successfully");
    Ok(())
}
