use crate::domain::errors::CommandError;
use std::fmt;

/// Messaging-platform user id of whoever sent a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequesterId(pub u64);

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owner-only authorization predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessGuard {
    owner: RequesterId,
}

impl AccessGuard {
    pub fn new(owner: RequesterId) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> RequesterId {
        self.owner
    }

    pub fn is_owner(&self, requester: Option<RequesterId>) -> bool {
        requester == Some(self.owner)
    }

    /// Anonymous senders (e.g. channel posts) are always rejected.
    pub fn authorize(&self, requester: Option<RequesterId>) -> Result<RequesterId, CommandError> {
        if self.is_owner(requester) {
            return Ok(self.owner);
        }
        Err(CommandError::Unauthorized {
            requester: requester.map(|id| id.0),
        })
    }
}
