use async_trait::async_trait;
use exam_core::model::Identity;

/// Supplies the signed-in user. Used for display and to key attempts.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `None` when nobody is signed in.
    async fn current_identity(&self) -> Option<Identity>;
}

/// Identity fixed at construction, for hosts without a sign-in flow.
#[derive(Debug, Clone)]
pub struct StaticIdentity(Identity);

impl StaticIdentity {
    #[must_use]
    pub fn new(identity: Identity) -> Self {
        Self(identity)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current_identity(&self) -> Option<Identity> {
        Some(self.0.clone())
    }
}
