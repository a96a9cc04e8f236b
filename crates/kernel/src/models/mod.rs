//! Data models.

pub mod toy;
pub mod user;

pub use toy::{LabelCount, Message, MessageAuthor, NewMessage, NewToy, Toy, ToyUpdate};
pub use user::{CreateUser, SessionUser, User};
