//! Broker hook that authenticates connects and checks topic ACLs over HTTP.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use authgate_sdk::{
    AuthHook, AuthenticateRequest, AuthorizeRequest, CapabilitySet, DecisionAuthority,
    HookCapability,
};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use crate::config::{HttpAuthHookConfig, PipelineConfig};
use crate::domain::cache::{CacheMetrics, DecisionCache};
use crate::domain::error::HookError;
use crate::domain::fingerprint::FingerprintScheme;
use crate::domain::pipeline::DecisionPipeline;
use crate::infra::http_authority::HttpAuthority;

/// Identifier announced to the host.
pub const HOOK_ID: &str = "http-auth-hook";

const PROVIDES: CapabilitySet = CapabilitySet::new(&[
    HookCapability::OnConnectAuthenticate,
    HookCapability::OnAclCheck,
]);

/// Caching HTTP auth hook.
///
/// Holds one decision pipeline per enabled authority. A pipeline whose URL
/// is empty is absent and its callback allows everything.
///
/// Lifecycle:
/// 1. [`HttpAuthHook::configure`] builds caches and the HTTP client,
/// 2. [`HttpAuthHook::start`] spawns the expiry sweepers on the runtime,
/// 3. [`HttpAuthHook::shutdown`] stops and joins them.
pub struct HttpAuthHook {
    authority: Arc<dyn DecisionAuthority>,
    scheme: FingerprintScheme,
    auth: Option<DecisionPipeline>,
    acl: Option<DecisionPipeline>,
    sweep_interval: Duration,
    cancel: CancellationToken,
    sweepers: Mutex<Vec<JoinHandle<()>>>,
}

impl HttpAuthHook {
    /// Build the hook against the HTTP authorities named in `config`.
    ///
    /// # Errors
    ///
    /// - `InvalidUrl` if a non-empty authority URL is not an absolute
    ///   `http`/`https` URL
    /// - `ZeroSweepInterval` if the sweep interval is zero
    /// - `HttpClient` if the HTTP client cannot be built
    pub fn configure(config: &HttpAuthHookConfig) -> Result<Self, HookError> {
        let auth_url = parse_authority_url("authentication", &config.auth)?;
        let acl_url = parse_authority_url("authorization", &config.acl)?;
        let client = HttpAuthority::build_client(config.client_timeout())?;

        let authority = Arc::new(HttpAuthority::new(client, auth_url, acl_url));
        Self::with_authority(config, authority)
    }

    /// Build the hook against an arbitrary authority.
    ///
    /// Only the emptiness of the configured URLs is read here; they decide
    /// which pipelines exist.
    ///
    /// # Errors
    ///
    /// `ZeroSweepInterval` if the sweep interval is zero.
    pub fn with_authority(
        config: &HttpAuthHookConfig,
        authority: Arc<dyn DecisionAuthority>,
    ) -> Result<Self, HookError> {
        if config.sweep_interval_seconds == 0 {
            return Err(HookError::ZeroSweepInterval);
        }

        let auth = config.auth.is_enabled().then(|| {
            DecisionPipeline::new(Arc::new(DecisionCache::new(
                "auth",
                config.auth_ttl(),
                config.max_entries,
            )))
        });
        let acl = config.acl.is_enabled().then(|| {
            DecisionPipeline::new(Arc::new(DecisionCache::new(
                "acl",
                config.acl_ttl(),
                config.max_entries,
            )))
        });

        if auth.is_none() {
            warn!("Authentication authority not configured, all connections will be allowed");
        }
        if acl.is_none() {
            warn!("Authorization authority not configured, all topic access will be allowed");
        }

        info!(
            auth_enabled = auth.is_some(),
            auth_cache_secs = config.auth_ttl().as_secs(),
            acl_enabled = acl.is_some(),
            acl_cache_secs = config.acl_ttl().as_secs(),
            client_timeout_secs = config.client_timeout_seconds,
            max_entries = config.max_entries,
            fingerprint = ?config.fingerprint,
            "Configured {HOOK_ID}"
        );

        Ok(Self {
            authority,
            scheme: config.fingerprint,
            auth,
            acl,
            sweep_interval: config.sweep_interval(),
            cancel: CancellationToken::new(),
            sweepers: Mutex::new(Vec::new()),
        })
    }

    /// Spawn the background expiry sweepers. Calling it again while they run
    /// does nothing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut sweepers = self.sweepers.lock();
        if !sweepers.is_empty() || self.cancel.is_cancelled() {
            return;
        }

        for pipeline in self.auth.iter().chain(self.acl.iter()) {
            sweepers.push(
                pipeline
                    .cache()
                    .spawn_sweeper(self.sweep_interval, self.cancel.child_token()),
            );
        }
    }

    /// Stop the sweepers and wait for them to exit.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let sweepers = std::mem::take(&mut *self.sweepers.lock());
        for handle in sweepers {
            if let Err(e) = handle.await {
                warn!(error = %e, "Decision cache sweeper ended abnormally");
            }
        }
        info!("{HOOK_ID} stopped");
    }

    #[must_use]
    pub fn auth_metrics(&self) -> Option<CacheMetrics> {
        self.auth.as_ref().map(|p| p.cache().metrics())
    }

    #[must_use]
    pub fn acl_metrics(&self) -> Option<CacheMetrics> {
        self.acl.as_ref().map(|p| p.cache().metrics())
    }
}

impl Drop for HttpAuthHook {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[async_trait]
impl AuthHook for HttpAuthHook {
    fn id(&self) -> &'static str {
        HOOK_ID
    }

    fn provides(&self, capability: HookCapability) -> bool {
        PROVIDES.contains(capability)
    }

    #[tracing::instrument(skip_all, fields(client_id = request.client_id()))]
    async fn on_connect_authenticate(&self, request: &AuthenticateRequest) -> bool {
        let Some(pipeline) = &self.auth else {
            return true;
        };

        let key = self.scheme.authenticate(request);
        pipeline
            .decide(key, || self.authority.authenticate(request))
            .await
            .is_allowed()
    }

    #[tracing::instrument(
        skip_all,
        fields(client_id = request.client_id(), write = request.is_write())
    )]
    async fn on_acl_check(&self, request: &AuthorizeRequest) -> bool {
        let Some(pipeline) = &self.acl else {
            return true;
        };

        let key = self.scheme.authorize(request);
        pipeline
            .decide(key, || self.authority.authorize(request))
            .await
            .is_allowed()
    }
}

fn parse_authority_url(
    pipeline: &'static str,
    config: &PipelineConfig,
) -> Result<Option<Url>, HookError> {
    if !config.is_enabled() {
        return Ok(None);
    }

    let raw = config.url.trim();
    let invalid = |reason: String| HookError::InvalidUrl {
        pipeline,
        url: raw.to_owned(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(Some(url)),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}
