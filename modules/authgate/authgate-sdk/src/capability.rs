//! Hook capability announcement.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Events a broker may dispatch to a hook.
///
/// The host asks each registered hook whether it provides a capability
/// before dispatching the matching event to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookCapability {
    OnConnect,
    OnConnectAuthenticate,
    OnAclCheck,
    OnSubscribe,
    OnPublish,
    OnDisconnect,
}

impl HookCapability {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnConnect => "on_connect",
            Self::OnConnectAuthenticate => "on_connect_authenticate",
            Self::OnAclCheck => "on_acl_check",
            Self::OnSubscribe => "on_subscribe",
            Self::OnPublish => "on_publish",
            Self::OnDisconnect => "on_disconnect",
        }
    }
}

impl fmt::Display for HookCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fixed set of capabilities, checked by membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySet(&'static [HookCapability]);

impl CapabilitySet {
    #[must_use]
    pub const fn new(capabilities: &'static [HookCapability]) -> Self {
        Self(capabilities)
    }

    #[must_use]
    pub fn contains(&self, capability: HookCapability) -> bool {
        self.0.contains(&capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = HookCapability> + '_ {
        self.0.iter().copied()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const DECISIONS: CapabilitySet = CapabilitySet::new(&[
        HookCapability::OnConnectAuthenticate,
        HookCapability::OnAclCheck,
    ]);

    #[test]
    fn membership_is_exact() {
        assert!(DECISIONS.contains(HookCapability::OnConnectAuthenticate));
        assert!(DECISIONS.contains(HookCapability::OnAclCheck));
        assert!(!DECISIONS.contains(HookCapability::OnPublish));
        assert!(!DECISIONS.contains(HookCapability::OnConnect));
        assert_eq!(DECISIONS.iter().count(), 2);
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&HookCapability::OnAclCheck).unwrap();
        assert_eq!(json, "\"on_acl_check\"");
        assert_eq!(HookCapability::OnAclCheck.to_string(), "on_acl_check");
    }
}
