//! Identity shapes.

use serde::{Deserialize, Serialize};

use crate::ids::IdentityId;

/// `identity.getSelf` input. Carries nothing; the session says who is asking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityQuerySelf {}

/// Who the caller is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Identity {
    /// Nothing known about the caller.
    Anonymous,
    /// Tracked across requests but not signed in.
    Guest { id: IdentityId },
    /// Signed in.
    Registered { id: IdentityId, email: String },
}

impl Identity {
    pub fn id(&self) -> Option<&IdentityId> {
        match self {
            Identity::Anonymous => None,
            Identity::Guest { id } | Identity::Registered { id, .. } => Some(id),
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, Identity::Registered { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_wire_shape() {
        assert_eq!(serde_json::to_value(Identity::Anonymous).unwrap(), json!({ "type": "anonymous" }));
        let guest = Identity::Guest { id: "g-1".into() };
        assert_eq!(serde_json::to_value(&guest).unwrap(), json!({ "type": "guest", "id": "g-1" }));
        assert_eq!(guest.id().unwrap().as_str(), "g-1");
        assert!(!guest.is_registered());
    }
}
