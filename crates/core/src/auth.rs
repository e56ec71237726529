use serde::{Deserialize, Serialize};

use crate::RoleId;

/// Actor identity established upstream and forwarded to every decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    display_name: String,
    role_id: RoleId,
}

impl UserIdentity {
    /// Creates an actor identity from authentication and role assignment data.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        role_id: RoleId,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            role_id,
        }
    }

    /// Returns the stable subject claim from the identity provider.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current actor.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the role whose permission snapshot governs this actor.
    #[must_use]
    pub fn role_id(&self) -> &RoleId {
        &self.role_id
    }
}
