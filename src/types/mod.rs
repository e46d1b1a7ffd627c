//! Core types for toolchat.

pub mod message;
pub mod response;
pub mod result;
pub mod usage;

pub use message::*;
pub use response::*;
pub use result::*;
pub use usage::*;
