//! Request types for HTTP handlers.

mod chats;
mod paths;
mod validations;

pub use chats::*;
pub use paths::*;
