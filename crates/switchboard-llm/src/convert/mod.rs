//! Conversion between canonical types and vendor wire formats
//!
//! Each submodule handles one vendor protocol.

pub mod anthropic;
pub mod google;
pub mod openai;

use crate::types::{Message, Role, ToolCallRequest};

/// Pairs tool results with the assistant calls they answer
///
/// Tool messages carry no call id, so the n-th tool message after an
/// assistant turn answers that turn's n-th call.
#[derive(Debug, Default)]
pub(crate) struct PendingCalls<'a> {
    calls: &'a [ToolCallRequest],
    answered: usize,
}

impl<'a> PendingCalls<'a> {
    /// Track `message`, returning the call it answers if it is a tool result
    pub(crate) fn observe(&mut self, message: &'a Message) -> Option<&'a ToolCallRequest> {
        match message.role {
            Role::Assistant => {
                self.calls = &message.tool_calls;
                self.answered = 0;
                None
            }
            Role::Tool => {
                let call = self.calls.get(self.answered);
                self.answered += 1;
                call
            }
            Role::System | Role::User => None,
        }
    }
}
