//! User account model and password handling.

use anyhow::Result;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored user record.
///
/// The password hash is persisted with the record but never sent to clients;
/// handlers respond with [`SessionUser`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub fullname: String,
    #[serde(default)]
    pub is_admin: bool,
    pub pass: String,
}

/// The public view of a user, as returned by login/signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub fullname: String,
    pub is_admin: bool,
}

/// Input for creating a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub fullname: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    /// Build a new user record, hashing the supplied password.
    pub fn new(input: CreateUser) -> Result<Self> {
        Ok(Self {
            id: Uuid::now_v7().simple().to_string(),
            pass: hash_password(&input.password)?,
            username: input.username,
            fullname: input.fullname,
            is_admin: input.is_admin,
        })
    }

    /// Verify a password against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        if self.pass.is_empty() {
            return false;
        }

        let Ok(parsed_hash) = PasswordHash::new(&self.pass) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    pub fn to_session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id.clone(),
            fullname: self.fullname.clone(),
            is_admin: self.is_admin,
        }
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
