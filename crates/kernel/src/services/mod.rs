//! Services between the HTTP handlers and the stores.
//!
//! Handlers never reach into a store directly; validation, the label
//! catalogue and credential checks live here.

pub mod auth;
pub mod toy;

pub use auth::AuthService;
pub use toy::{TOY_LABELS, ToyService, count_labels};
