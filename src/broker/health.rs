//! Health aggregation - concurrent liveness probes for every provider

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use super::Broker;
use super::provider::{Endpoint, ProviderDescriptor};

/// Liveness of every registered provider at one point in time
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub providers: BTreeMap<String, bool>,
    pub checked_at: DateTime<Utc>,
}

impl HealthSnapshot {
    pub fn new(providers: BTreeMap<String, bool>) -> Self {
        Self {
            providers,
            checked_at: Utc::now(),
        }
    }

    /// Liveness of one provider, `None` if it was not part of the pass
    pub fn is_healthy(&self, provider: &str) -> Option<bool> {
        self.providers.get(provider).copied()
    }

    pub fn healthy_count(&self) -> usize {
        self.providers.values().filter(|healthy| **healthy).count()
    }

    /// True when no provider is healthy, including when there are none at all
    pub fn all_down(&self) -> bool {
        self.healthy_count() == 0
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Probe a single provider; any error, timeout or non-200 status is unhealthy
pub(crate) async fn probe(http: &Client, provider: &ProviderDescriptor, timeout: Duration) -> bool {
    match http.get(provider.url(Endpoint::Health)).timeout(timeout).send().await {
        Ok(response) => {
            let healthy = response.status() == StatusCode::OK;
            if !healthy {
                tracing::debug!(provider = %provider.name, status = %response.status(), "Health probe failed");
            }
            healthy
        }
        Err(e) => {
            tracing::debug!(provider = %provider.name, error = %e, "Health probe failed");
            false
        }
    }
}

impl Broker {
    /// Probe every provider concurrently; never cached
    pub async fn check_all(&self) -> HealthSnapshot {
        let providers = self.registry.all();
        let timeout = self.timeouts.health;

        let results = join_all(providers.iter().map(|p| probe(&self.http, p, timeout))).await;

        let statuses: BTreeMap<String, bool> = providers
            .into_iter()
            .map(|p| p.name)
            .zip(results)
            .collect();

        let snapshot = HealthSnapshot::new(statuses);
        log::info!(
            "Health check: {}/{} providers healthy",
            snapshot.healthy_count(),
            snapshot.len()
        );
        snapshot
    }
}
