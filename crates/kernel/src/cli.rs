//! Command-line interface.
//!
//! `serve` (the default) runs the HTTP server; the other commands operate on
//! the configured store directly without starting it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::models::CreateUser;
use crate::state::AppState;

/// Toy store backend.
#[derive(Debug, Parser)]
#[command(name = "toystore", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Create an administrator account.
    CreateAdmin {
        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,

        /// Display name (defaults to the username).
        #[arg(long)]
        fullname: Option<String>,
    },
}

/// Create an admin account in the configured store.
pub async fn cmd_create_admin(
    state: &AppState,
    username: &str,
    password: &str,
    fullname: Option<&str>,
) -> Result<()> {
    let user = state
        .auth()
        .create_admin(CreateUser {
            username: username.to_string(),
            password: password.to_string(),
            fullname: fullname.unwrap_or(username).to_string(),
            is_admin: true,
        })
        .await
        .with_context(|| format!("failed to create admin '{username}'"))?;

    println!("Created admin '{}' ({})", user.username, user.id);
    Ok(())
}
