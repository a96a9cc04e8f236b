//! Credential checks and account creation.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{CreateUser, User};
use crate::store::UserStore;

/// Shortest password accepted at signup.
const MIN_PASSWORD_LEN: usize = 3;

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Check a username/password pair.
    ///
    /// Unknown users and wrong passwords both yield [`AppError::Unauthorized`].
    pub async fn login(&self, username: &str, password: &str) -> AppResult<User> {
        let Some(user) = self.users.find_by_username(username).await? else {
            warn!(username = %username, "login failed: unknown user");
            return Err(AppError::Unauthorized);
        };

        if !user.verify_password(password) {
            warn!(username = %username, "login failed: invalid password");
            return Err(AppError::Unauthorized);
        }

        info!(user_id = %user.id, username = %user.username, "user logged in");
        Ok(user)
    }

    /// Register a regular (non-admin) account.
    pub async fn signup(&self, mut input: CreateUser) -> AppResult<User> {
        input.is_admin = false;
        self.create(input).await
    }

    /// Register an admin account. Only reachable from the command line.
    pub async fn create_admin(&self, mut input: CreateUser) -> AppResult<User> {
        input.is_admin = true;
        self.create(input).await
    }

    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.find_by_id(id).await?)
    }

    async fn create(&self, input: CreateUser) -> AppResult<User> {
        validate(&input)?;

        if self.users.find_by_username(&input.username).await?.is_some() {
            return Err(AppError::BadRequest(format!(
                "username {} is already taken",
                input.username
            )));
        }

        let user = self.users.create(User::new(input)?).await?;
        info!(
            user_id = %user.id,
            username = %user.username,
            is_admin = user.is_admin,
            "user created"
        );
        Ok(user)
    }
}

fn validate(input: &CreateUser) -> AppResult<()> {
    if input.username.trim().is_empty() {
        return Err(AppError::BadRequest("username is required".to_string()));
    }
    if input.fullname.trim().is_empty() {
        return Err(AppError::BadRequest("fullname is required".to_string()));
    }
    if input.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
