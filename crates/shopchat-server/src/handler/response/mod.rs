//! Response types for HTTP handlers.

mod chats;
mod errors;
mod monitors;

pub use chats::*;
pub use errors::*;
pub use monitors::*;
