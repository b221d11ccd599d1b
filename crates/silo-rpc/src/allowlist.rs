//! Only region silos may call control's internal endpoints.

use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context as _;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio::sync::OnceCell;

use silo_core::error::AppError;
use silo_domain::region::RegionRegistry;

/// Resolves every registered region address once and answers membership
/// queries against the resulting IP set.
///
/// Resolution failures are logged and the request is refused; the lookup is
/// retried on the next request.
pub struct RegionAddressValidator {
    hosts: Vec<(String, u16)>,
    resolved: OnceCell<HashSet<IpAddr>>,
}

impl RegionAddressValidator {
    pub fn from_registry(registry: &RegionRegistry) -> Self {
        let hosts = registry
            .iter()
            .filter_map(|region| match reqwest::Url::parse(&region.address) {
                Ok(url) => {
                    let host = url.host_str()?.trim_matches(['[', ']']).to_owned();
                    let port = url.port_or_known_default().unwrap_or(80);
                    Some((host, port))
                }
                Err(e) => {
                    tracing::error!(region = %region.name, error = %e, "unparseable region address");
                    None
                }
            })
            .collect();
        Self {
            hosts,
            resolved: OnceCell::new(),
        }
    }

    /// Validator over a fixed address set, skipping DNS.
    pub fn with_addresses(addresses: impl IntoIterator<Item = IpAddr>) -> Self {
        let set = addresses.into_iter().map(|ip| ip.to_canonical()).collect();
        Self {
            hosts: vec![],
            resolved: OnceCell::new_with(Some(set)),
        }
    }

    async fn resolve(&self) -> anyhow::Result<HashSet<IpAddr>> {
        let mut addresses = HashSet::new();
        for (host, port) in &self.hosts {
            let resolved = tokio::net::lookup_host((host.as_str(), *port))
                .await
                .with_context(|| format!("resolve region host {host}"))?;
            addresses.extend(resolved.map(|addr| addr.ip().to_canonical()));
        }
        Ok(addresses)
    }

    pub async fn is_allowed(&self, ip: IpAddr) -> bool {
        match self.resolved.get_or_try_init(|| self.resolve()).await {
            Ok(allowed) => allowed.contains(&ip.to_canonical()),
            Err(e) => {
                tracing::error!(error = %e, "region address resolution failed");
                false
            }
        }
    }
}

/// Reject callers whose peer address is not a registered region (403).
///
/// Requires the server to be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub async fn require_region_ip(
    State(validator): State<Arc<RegionAddressValidator>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if validator.is_allowed(peer.ip()).await {
        Ok(next.run(request).await)
    } else {
        tracing::warn!(peer = %peer.ip(), path = %request.uri().path(), "rejected non-region caller");
        Err(AppError::Forbidden)
    }
}
