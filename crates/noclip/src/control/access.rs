#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessPolicy {
    #[default]
    Unrestricted,
    Allowlisted,
}

/// Allow/deny check applied whenever noclip is about to turn on.
///
/// `local_identity_allowed` caches `evaluate(local identity)` and is refreshed
/// by every mutation. It is never consulted as the source of the list itself.
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    policy: AccessPolicy,
    allowed_identities: Vec<String>,
    debug_bypass: bool,
    local_identity_allowed: bool,
}

impl AccessGate {
    pub fn new(
        policy: AccessPolicy,
        identities: impl IntoIterator<Item = String>,
        debug_bypass: bool,
        local_identity: &str,
    ) -> Self {
        let mut gate = Self {
            policy,
            allowed_identities: Vec::new(),
            debug_bypass,
            local_identity_allowed: false,
        };
        for identity in identities {
            gate.insert_unique(identity);
        }
        gate.refresh(local_identity);
        gate
    }

    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }

    pub fn allowed_identities(&self) -> &[String] {
        &self.allowed_identities
    }

    pub fn debug_bypass(&self) -> bool {
        self.debug_bypass
    }

    pub fn evaluate(&self, identity: &str) -> bool {
        match self.policy {
            AccessPolicy::Unrestricted => true,
            AccessPolicy::Allowlisted => self.contains(identity),
        }
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.allowed_identities
            .iter()
            .any(|allowed| allowed == identity)
    }

    pub fn local_identity_allowed(&self) -> bool {
        self.local_identity_allowed
    }

    pub fn permits_activation(&self) -> bool {
        self.debug_bypass || self.local_identity_allowed
    }

    /// Returns true when the identity was appended.
    pub fn add(&mut self, identity: &str, local_identity: &str) -> bool {
        let added = self.insert_unique(identity.to_string());
        self.refresh(local_identity);
        added
    }

    /// Returns true when the identity was present and removed.
    pub fn remove(&mut self, identity: &str, local_identity: &str) -> bool {
        let before = self.allowed_identities.len();
        if !identity.is_empty() {
            self.allowed_identities.retain(|allowed| allowed != identity);
        }
        self.refresh(local_identity);
        self.allowed_identities.len() != before
    }

    pub fn clear(&mut self, local_identity: &str) {
        self.allowed_identities.clear();
        self.refresh(local_identity);
    }

    pub fn set_policy(&mut self, policy: AccessPolicy, local_identity: &str) {
        self.policy = policy;
        self.refresh(local_identity);
    }

    pub fn refresh(&mut self, local_identity: &str) {
        self.local_identity_allowed = self.evaluate(local_identity);
    }

    fn insert_unique(&mut self, identity: String) -> bool {
        if identity.is_empty() || self.contains(&identity) {
            return false;
        }
        self.allowed_identities.push(identity);
        true
    }
}
