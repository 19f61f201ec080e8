use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::credential_store::{CredentialPair, CredentialStore};
use super::token_introspection;
use crate::api::{ApiRequest, ApiResponse, IdentitySummary, Transport};
use crate::error::{FailureKind, SessionError, SessionResult};

/// Result of one renewal, shared by every caller that waited on it.
#[derive(Debug, Clone)]
enum RenewalOutcome {
    Renewed(String),
    Failed(SessionError),
}

type RenewalHandle = Shared<BoxFuture<'static, RenewalOutcome>>;

/// A running renewal and the renewal credential it was started with.
struct InFlightRenewal {
    renewal_credential: String,
    handle: RenewalHandle,
}

struct Inner<T> {
    transport: T,
    store: CredentialStore,
    pair: RwLock<Option<CredentialPair>>,
    /// Single in-flight renewal, if any
    in_flight: Mutex<Option<InFlightRenewal>>,
}

/// Holds the session's credential pair, attaches the access credential to
/// outgoing calls and hides access credential expiry from callers.
///
/// Cheap to clone; clones share one session.
pub struct SessionAgent<T: Transport> {
    inner: Arc<Inner<T>>,
}

impl<T: Transport> Clone for SessionAgent<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> SessionAgent<T> {
    pub fn new(transport: T, store: CredentialStore) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                store,
                pair: RwLock::new(None),
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Loads a persisted pair, if one exists. Returns whether a session was restored.
    pub async fn restore(&self) -> SessionResult<bool> {
        let loaded = self.inner.store.load().await?;
        let restored = loaded.is_some();
        *self.inner.pair.write().await = loaded;
        if restored {
            info!("Restored persisted session");
        }
        Ok(restored)
    }

    pub async fn login(&self, email: &str, password: &str) -> SessionResult<IdentitySummary> {
        let response = self.inner.transport.login(email, password).await?;
        let pair = CredentialPair {
            access_credential: response.access_credential,
            renewal_credential: response.renewal_credential,
        };

        let mut guard = self.inner.pair.write().await;
        if let Err(e) = self.inner.store.save(&pair).await {
            warn!("Failed to persist credential pair: {}. Session held in memory only", e);
        }
        *guard = Some(pair);

        info!("Logged in as {}", response.identity_summary.subject_id);
        Ok(response.identity_summary)
    }

    pub async fn logout(&self) -> SessionResult<()> {
        let mut guard = self.inner.pair.write().await;
        *guard = None;
        self.inner.store.clear().await?;
        info!("Logged out");
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.pair.read().await.is_some()
    }

    /// Snapshot of the currently held pair
    pub async fn credentials(&self) -> Option<CredentialPair> {
        self.inner.pair.read().await.clone()
    }

    /// Performs a call, renewing and retrying at most once on an expired access credential.
    pub async fn call(&self, request: &ApiRequest) -> SessionResult<ApiResponse> {
        let sent = self.access_credential().await;
        let response = self.inner.transport.send(request, sent.as_deref()).await?;

        let Some(failure) = response.auth_failure() else {
            return Ok(response);
        };

        match failure.kind() {
            FailureKind::Forbidden => return Err(SessionError::Forbidden(failure)),
            FailureKind::InvalidOrExpiredCredential => {}
            _ => return Err(SessionError::Unauthorized(failure)),
        }

        let Some(stale) = sent else {
            return Err(SessionError::Unauthorized(failure));
        };

        if !failure.is_renewable() {
            warn!("Access credential rejected as {}; ending session", failure);
            self.inner.end_session_holding(&stale).await;
            return Err(SessionError::Unauthorized(failure));
        }

        let fresh = match self.inner.renewed_access(&stale).await {
            RenewalOutcome::Renewed(token) => token,
            RenewalOutcome::Failed(e) => {
                debug!("Renewal failed ({}); propagating original failure", e);
                self.inner.end_session_holding(&stale).await;
                return Err(SessionError::Unauthorized(failure));
            }
        };

        debug!("Retrying {} {} with renewed access credential", request.method, request.path);
        let retry = self.inner.transport.send(request, Some(&fresh)).await?;
        match retry.auth_failure() {
            None => Ok(retry),
            Some(again) if again.kind() == FailureKind::Forbidden => Err(SessionError::Forbidden(again)),
            Some(again) => {
                warn!("Renewed access credential rejected as {}; ending session", again);
                self.inner.end_session_holding(&fresh).await;
                Err(SessionError::Unauthorized(again))
            }
        }
    }

    /// Renews ahead of time if the held access credential expires within `min_ttl_secs`.
    pub async fn ensure_fresh(&self, min_ttl_secs: i64) -> SessionResult<()> {
        let current = self
            .access_credential()
            .await
            .ok_or(SessionError::NotAuthenticated)?;

        if !token_introspection::is_expiring_within(&current, min_ttl_secs) {
            return Ok(());
        }

        debug!("Access credential expiring within {} seconds, renewing proactively", min_ttl_secs);
        match self.inner.renewed_access(&current).await {
            RenewalOutcome::Renewed(_) => Ok(()),
            RenewalOutcome::Failed(e) => Err(e),
        }
    }

    async fn access_credential(&self) -> Option<String> {
        self.inner
            .pair
            .read()
            .await
            .as_ref()
            .map(|p| p.access_credential.clone())
    }
}

impl<T: Transport> Inner<T> {
    /// Returns a renewed access credential replacing `stale`, joining the
    /// in-flight renewal if there is one and starting one otherwise.
    async fn renewed_access(self: &Arc<Self>, stale: &str) -> RenewalOutcome {
        let handle = {
            let mut slot = self.in_flight.lock().await;

            let renewal_credential = match self.pair.read().await.as_ref() {
                None => return RenewalOutcome::Failed(SessionError::NotAuthenticated),
                // Already replaced by a renewal that finished before we got here
                Some(pair) if pair.access_credential != stale => {
                    return RenewalOutcome::Renewed(pair.access_credential.clone());
                }
                Some(pair) => pair.renewal_credential.clone(),
            };

            // A renewal left over from a previous session is never joined.
            match slot.as_ref() {
                Some(running) if running.renewal_credential == renewal_credential => {
                    debug!("Joining in-flight renewal");
                    running.handle.clone()
                }
                _ => {
                    let handle = Self::spawn_renewal(Arc::clone(self), renewal_credential.clone());
                    *slot = Some(InFlightRenewal {
                        renewal_credential,
                        handle: handle.clone(),
                    });
                    handle
                }
            }
        };

        handle.await
    }

    /// Runs the renewal on its own task so it completes even if every caller
    /// awaiting it is cancelled.
    fn spawn_renewal(inner: Arc<Self>, renewal_credential: String) -> RenewalHandle {
        let task = tokio::spawn(async move {
            let outcome = inner.run_renewal(&renewal_credential).await;
            let mut slot = inner.in_flight.lock().await;
            if slot
                .as_ref()
                .is_some_and(|running| running.renewal_credential == renewal_credential)
            {
                slot.take();
            }
            outcome
        });

        task.map(|joined| {
            joined.unwrap_or_else(|e| {
                RenewalOutcome::Failed(SessionError::InternalError(format!("Renewal task failed: {}", e)))
            })
        })
        .boxed()
        .shared()
    }

    async fn run_renewal(&self, renewal_credential: &str) -> RenewalOutcome {
        info!("Renewing access credential");
        match self.transport.renew(renewal_credential).await {
            Ok(access_credential) => {
                let mut guard = self.pair.write().await;
                match guard.as_mut() {
                    Some(pair) if pair.renewal_credential == renewal_credential => {
                        pair.access_credential = access_credential.clone();
                        if let Err(e) = self.store.save_access(&access_credential).await {
                            warn!("Failed to persist renewed access credential: {}", e);
                        }
                        info!("Access credential renewed");
                        RenewalOutcome::Renewed(access_credential)
                    }
                    // Logged out or logged in again while the renewal was in flight
                    _ => RenewalOutcome::Failed(SessionError::NotAuthenticated),
                }
            }
            Err(e) => {
                warn!("Renewal failed: {}; clearing session", e);
                let mut guard = self.pair.write().await;
                if guard
                    .as_ref()
                    .is_some_and(|p| p.renewal_credential == renewal_credential)
                {
                    *guard = None;
                    if let Err(e) = self.store.clear().await {
                        warn!("Failed to clear persisted credentials: {}", e);
                    }
                }
                RenewalOutcome::Failed(e)
            }
        }
    }

    /// Clears the session, unless it has moved on from `access_credential`.
    async fn end_session_holding(&self, access_credential: &str) {
        let mut guard = self.pair.write().await;
        if guard
            .as_ref()
            .is_some_and(|p| p.access_credential == access_credential)
        {
            *guard = None;
            if let Err(e) = self.store.clear().await {
                warn!("Failed to clear persisted credentials: {}", e);
            }
        }
    }
}
