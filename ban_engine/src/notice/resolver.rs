use crate::id::AccountId;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::{collections::HashMap, fmt, time::Duration};
use thiserror::Error;

/// Display name shown when an admin's name can't be determined
pub const UNKNOWN_ADMIN: &str = "Unknown";

/// Reasons a display name lookup can fail. None of these ever reach the
/// banned client; they all render as [`UNKNOWN_ADMIN`].
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("No issuing admin recorded")]
    NoAdmin,
    #[error("Lookup timed out after {0:?}")]
    Timeout(Duration),
    #[error("Transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),
    #[error("Lookup returned status {0}")]
    Status(u16),
    #[error("Malformed response: {0}")]
    MalformedPayload(String),
    #[error("No display name for account")]
    NoDisplayName,
}

/// Looks up the display name of an account with the identity service
#[async_trait]
pub trait DisplayNameResolver: Send + Sync {
    async fn resolve_display_name(&self, account: AccountId) -> Result<String, ResolutionError>;
}

/// The name to attribute a ban to in a ban notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminName {
    Resolved(String),
    Unknown,
}

impl AdminName {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Resolved(name) => name,
            Self::Unknown => UNKNOWN_ADMIN,
        }
    }
}

impl fmt::Display for AdminName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

async fn try_resolve<R: DisplayNameResolver + ?Sized>(
    resolver: &R,
    admin: Option<AccountId>,
    timeout: Duration,
) -> Result<String, ResolutionError> {
    let admin = admin.ok_or(ResolutionError::NoAdmin)?;
    tokio::time::timeout(timeout, resolver.resolve_display_name(admin))
        .await
        .map_err(|_| ResolutionError::Timeout(timeout))?
}

/// Resolve an admin's display name with a single bounded attempt.
///
/// Never fails: any problem, including there being no admin at all, gives
/// [`AdminName::Unknown`].
#[tracing::instrument(skip(resolver))]
pub async fn resolve_admin_name<R: DisplayNameResolver + ?Sized>(
    resolver: &R,
    admin: Option<AccountId>,
    timeout: Duration,
) -> AdminName {
    match try_resolve(resolver, admin, timeout).await {
        Ok(name) => AdminName::Resolved(name),
        Err(ResolutionError::NoAdmin) => AdminName::Unknown,
        Err(e) => {
            tracing::warn!("Couldn't resolve admin display name: {}", e);
            AdminName::Unknown
        }
    }
}

/// Resolves admin display names ahead of time and remembers them, so that
/// building a ban notice doesn't have to wait on the identity service.
///
/// Only successful lookups are cached; a failed one is retried on the next
/// prefetch.
pub struct DisplayNameCache<R> {
    resolver: R,
    timeout: Duration,
    names: RwLock<HashMap<AccountId, String>>,
}

impl<R: DisplayNameResolver> DisplayNameCache<R> {
    pub fn new(resolver: R, timeout: Duration) -> Self {
        Self {
            resolver,
            timeout,
            names: RwLock::new(HashMap::new()),
        }
    }

    /// Look up and cache the given admin's name, if it isn't already known
    pub async fn prefetch(&self, admin: Option<AccountId>) -> AdminName {
        let cached = self.cached(admin);
        if cached != AdminName::Unknown {
            return cached;
        }

        let resolved = resolve_admin_name(&self.resolver, admin, self.timeout).await;
        if let (Some(admin), AdminName::Resolved(name)) = (admin, &resolved) {
            self.names.write().insert(admin, name.clone());
        }
        resolved
    }

    /// The cached name for the given admin, without performing a lookup
    pub fn cached(&self, admin: Option<AccountId>) -> AdminName {
        admin
            .and_then(|admin| self.names.read().get(&admin).cloned())
            .map_or(AdminName::Unknown, AdminName::Resolved)
    }

    /// Drop a cached name, for example after the account is renamed
    pub fn forget(&self, admin: &AccountId) {
        self.names.write().remove(admin);
    }
}
