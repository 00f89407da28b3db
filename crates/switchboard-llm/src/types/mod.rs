//! Canonical vendor-agnostic types
//!
//! Every adapter translates from these into its own wire format and back.
//! None of them carry vendor-specific fields.

pub mod message;
pub mod options;
pub mod response;
pub mod tool;

pub use message::{Message, Role, ToolCallRequest};
pub use options::Options;
pub use response::CompletionResponse;
pub use tool::{InputSchema, PropertySchema, Tool};
