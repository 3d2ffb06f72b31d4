//! User Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{User, UserCreate, UserRole};
use crate::utils::time::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let user: Option<User> = self.base.db().select(thing).await?;
        Ok(user)
    }

    /// Find user by record id
    pub async fn find_by_record(&self, id: &RecordId) -> RepoResult<Option<User>> {
        let user: Option<User> = self.base.db().select(id.clone()).await?;
        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email_owned = email.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user account
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        // Check duplicate email
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' is already registered",
                data.email
            )));
        }

        // Hash password
        let hash_pass = User::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let role = data.role.unwrap_or_default();

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    name = $name,
                    email = $email,
                    hash_pass = $hash_pass,
                    phone = $phone,
                    role = $role,
                    created_at = $now
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("email", data.email))
            .bind(("hash_pass", hash_pass))
            .bind(("phone", data.phone))
            .bind(("role", role))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Hard delete a user. Idempotent: deleting a missing user returns false.
    pub async fn delete_by_record(&self, id: &RecordId) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query("DELETE $thing RETURN BEFORE")
            .bind(("thing", id.clone()))
            .await?;
        let deleted: Vec<User> = result.take(0)?;
        Ok(!deleted.is_empty())
    }

    /// Count admins, used by the startup seed
    pub async fn count_by_role(&self, role: UserRole) -> RepoResult<usize> {
        let mut result = self
            .base
            .db()
            .query("SELECT VALUE id FROM user WHERE role = $role")
            .bind(("role", role))
            .await?;
        let ids: Vec<RecordId> = result.take(0)?;
        Ok(ids.len())
    }
}
