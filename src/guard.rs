//! Session guard: single source of truth for "is the caller authenticated,
//! and what can they do." Protected views call [`SessionGuard::require_capability`]
//! at mount and on every route change; nothing here performs network I/O or
//! blocks, the only side effects are the storage slot and navigation.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::identity::{can, Capability, Credential, Identity};
use crate::store::CredentialStore;

/// Implemented by the hosting router. Route transitions are serialized by
/// the host, so `navigate` is never re-entered for the same navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeniedReason {
    /// No credential, or one that does not decode. The two are collapsed on
    /// purpose; the UI consequence is the same either way.
    Unauthenticated,
    /// Valid identity, insufficient role.
    Forbidden,
}

impl DeniedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeniedReason::Unauthenticated => "unauthenticated",
            DeniedReason::Forbidden => "forbidden",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Unauthenticated landing.
    pub login_route: String,
    /// Default authenticated landing, the target of Forbidden redirects.
    pub landing_route: String,
    /// User-visible pause before a Forbidden redirect fires, so the denial
    /// message is readable.
    pub denial_delay: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_route: "/login".into(),
            landing_route: "/dashboard".into(),
            denial_delay: Duration::from_secs(3),
        }
    }
}

/// Handle to a pending denial redirect. The page owns it: dropping the
/// handle (unmount, navigation-away) cancels the redirect, as does an
/// explicit [`RedirectHandle::cancel`].
#[derive(Debug)]
pub struct RedirectHandle {
    task: JoinHandle<()>,
}

impl RedirectHandle {
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RedirectHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Debug)]
pub enum GuardOutcome {
    Granted(Identity),
    Denied {
        reason: DeniedReason,
        /// Present only on the Forbidden path; `None` when the navigation
        /// already happened (Unauthenticated redirects immediately).
        redirect: Option<RedirectHandle>,
    },
}

impl GuardOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, GuardOutcome::Granted(_))
    }

    pub fn identity(self) -> Option<Identity> {
        match self {
            GuardOutcome::Granted(identity) => Some(identity),
            GuardOutcome::Denied { .. } => None,
        }
    }
}

pub struct SessionGuard {
    store: Arc<dyn CredentialStore>,
    config: GuardConfig,
}

impl SessionGuard {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self::with_config(store, GuardConfig::default())
    }

    pub fn with_config(store: Arc<dyn CredentialStore>, config: GuardConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Read the persisted credential. No side effects beyond the read.
    pub fn load_credential(&self) -> Option<Credential> {
        self.store.load()
    }

    /// Load + decode composition. Re-derived on every call, never cached, so
    /// a logout performed in one view is immediately visible in another.
    pub fn current_identity(&self) -> Option<Identity> {
        let credential = self.store.load()?;
        Identity::from_credential(&credential)
    }

    pub fn can(&self, identity: &Identity, capability: Capability) -> bool {
        can(identity.role, capability)
    }

    /// Pure decision without navigation side effects.
    pub fn check(&self, capability: Capability) -> Result<Identity, DeniedReason> {
        match self.current_identity() {
            None => Err(DeniedReason::Unauthenticated),
            Some(identity) if !can(identity.role, capability) => Err(DeniedReason::Forbidden),
            Some(identity) => Ok(identity),
        }
    }

    /// Gate for a protected view. Unauthenticated callers are sent to the
    /// login route at once; forbidden callers get `on_denied` plus a delayed,
    /// cancellable redirect to the landing route. Must run inside the hosting
    /// runtime: the Forbidden path schedules its timer on it.
    pub fn require_capability<F>(
        &self,
        capability: Capability,
        navigator: &Arc<dyn Navigator>,
        on_denied: F,
    ) -> GuardOutcome
    where
        F: FnOnce(DeniedReason),
    {
        let eval = Uuid::new_v4();
        match self.check(capability) {
            Ok(identity) => {
                tracing::debug!("guard.check eval={} cap={} role={} allow=true", eval, capability, identity.role);
                GuardOutcome::Granted(identity)
            }
            Err(reason @ DeniedReason::Unauthenticated) => {
                tracing::info!("guard.check eval={} cap={} allow=false reason={}", eval, capability, reason.as_str());
                on_denied(reason);
                navigator.navigate(&self.config.login_route);
                GuardOutcome::Denied { reason, redirect: None }
            }
            Err(reason @ DeniedReason::Forbidden) => {
                tracing::info!("guard.check eval={} cap={} allow=false reason={}", eval, capability, reason.as_str());
                on_denied(reason);
                let redirect = self.schedule_redirect(navigator);
                GuardOutcome::Denied { reason, redirect: Some(redirect) }
            }
        }
    }

    fn schedule_redirect(&self, navigator: &Arc<dyn Navigator>) -> RedirectHandle {
        let route = self.config.landing_route.clone();
        let delay = self.config.denial_delay;
        let nav = Arc::clone(navigator);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            nav.navigate(&route);
        });
        RedirectHandle { task }
    }

    /// Clear the slot and return to the login route. Idempotent: logging out
    /// an already empty slot is a no-op, not an error.
    pub fn logout(&self, navigator: &Arc<dyn Navigator>) {
        if let Err(err) = self.store.clear() {
            tracing::warn!("guard.logout clear failed: {:#}", err);
        } else {
            tracing::info!("guard.logout cleared");
        }
        navigator.navigate(&self.config.login_route);
    }
}
