//! User Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{User, UserCreate, UserRole, UserUpdate};
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
    pub async fn create(&self, data: UserCreate, role: UserRole) -> RepoResult<User> {
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

        let now = chrono::Utc::now().to_rfc3339();

        // hashPass is skip_serializing on the model, so the record is written
        // with an explicit statement instead of .content()
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    name = $name,
                    email = $email,
                    hashPass = $hash_pass,
                    role = $role,
                    createdAt = $now,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("email", data.email))
            .bind(("hash_pass", hash_pass))
            .bind(("role", role))
            .bind(("now", now))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Update profile fields (name, email, shipping details)
    pub async fn update_profile(&self, id: &str, data: UserUpdate) -> RepoResult<User> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))?;

        // Check duplicate email if changing
        if data.email != existing.email && self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' is already registered",
                data.email
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    name = $name,
                    email = $email,
                    phone = IF $has_phone THEN $phone ELSE phone END,
                    address = IF $has_address THEN $address ELSE address END,
                    city = IF $has_city THEN $city ELSE city END,
                    postalCode = IF $has_postal_code THEN $postal_code ELSE postalCode END,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("name", data.name))
            .bind(("email", data.email))
            .bind(("has_phone", data.phone.is_some()))
            .bind(("phone", data.phone))
            .bind(("has_address", data.address.is_some()))
            .bind(("address", data.address))
            .bind(("has_city", data.city.is_some()))
            .bind(("city", data.city))
            .bind(("has_postal_code", data.postal_code.is_some()))
            .bind(("postal_code", data.postal_code))
            .bind(("now", chrono::Utc::now().to_rfc3339()))
            .await?;

        result
            .take::<Option<User>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Replace the stored password hash
    pub async fn update_password(&self, id: &str, hash_pass: String) -> RepoResult<User> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))?;

        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET hashPass = $hash_pass, updatedAt = $now RETURN AFTER")
            .bind(("thing", thing))
            .bind(("hash_pass", hash_pass))
            .bind(("now", chrono::Utc::now().to_rfc3339()))
            .await?;

        result
            .take::<Option<User>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }
}
