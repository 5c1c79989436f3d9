use crate::error::{GatewayError, GatewayResult};
use crate::gateway::AvailabilityGateway;
use crate::models::{AvailabilityResult, PropertyInfo, PropertyRegistry, StayRequest, VillaAvailability};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Fans availability checks out over the registry.
///
/// All per-property calls are in flight at once on the calling task and
/// results come back in registry order, whatever order they settle in.
pub struct AvailabilityAggregator {
    gateway: Arc<dyn AvailabilityGateway>,
    registry: Arc<PropertyRegistry>,
    timeout: Duration,
}

impl AvailabilityAggregator {
    pub fn new(
        gateway: Arc<dyn AvailabilityGateway>,
        registry: Arc<PropertyRegistry>,
        timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            registry,
            timeout,
        }
    }

    pub fn registry(&self) -> &PropertyRegistry {
        &self.registry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// One property, bounded by the per-call timeout
    pub async fn check_property(
        &self,
        property_id: u64,
        stay: &StayRequest,
    ) -> GatewayResult<AvailabilityResult> {
        match tokio::time::timeout(self.timeout, self.gateway.check_availability(property_id, stay)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Availability check for {} timed out", property_id);
                Err(GatewayError::Timeout(self.timeout))
            }
        }
    }

    /// Check several properties at once. A failure only degrades its own entry,
    /// except a configuration error, which fails the whole batch.
    pub async fn check_properties(
        &self,
        properties: &[PropertyInfo],
        stay: &StayRequest,
    ) -> GatewayResult<Vec<VillaAvailability>> {
        let checks = properties.iter().map(|villa| async move {
            let availability = match self.check_property(villa.external_id, stay).await {
                Ok(result) => result,
                Err(err @ GatewayError::Config(_)) => return Err(err),
                Err(err) => {
                    warn!("Availability check failed for {}: {}", villa.slug, err);
                    AvailabilityResult::unavailable(Some(err.public_message()))
                }
            };
            Ok(VillaAvailability {
                availability,
                villa: villa.clone(),
            })
        });

        let results = join_all(checks)
            .await
            .into_iter()
            .collect::<GatewayResult<Vec<_>>>()?;
        debug!(
            "Checked {} villas, {} available",
            results.len(),
            results.iter().filter(|r| r.availability.available).count()
        );
        Ok(results)
    }

    pub async fn check_all(&self, stay: &StayRequest) -> GatewayResult<Vec<VillaAvailability>> {
        info!(
            "Checking all {} villas for {} to {}",
            self.registry.properties().len(),
            stay.arrival_date,
            stay.departure_date
        );
        self.check_properties(self.registry.properties(), stay).await
    }

    /// Every villa except the one `slug` refers to (aliases included)
    pub async fn check_others(
        &self,
        slug: &str,
        stay: &StayRequest,
    ) -> GatewayResult<Vec<VillaAvailability>> {
        let siblings = self.registry.siblings_of(slug);
        self.check_properties(&siblings, stay).await
    }

    /// The current villa and its siblings in one round trip.
    /// The primary error is kept so the caller can tell failure from "unavailable".
    /// Siblings are dropped when the batch cannot be checked at all.
    pub async fn check_with_siblings(
        &self,
        property_id: u64,
        slug: &str,
        stay: &StayRequest,
    ) -> (GatewayResult<AvailabilityResult>, Vec<VillaAvailability>) {
        let (primary, others) = tokio::join!(
            self.check_property(property_id, stay),
            self.check_others(slug, stay)
        );
        let others = others.unwrap_or_else(|err| {
            error!("Sibling availability check failed: {}", err);
            Vec::new()
        });
        (primary, others)
    }
}

/// Search results split for display
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct CatalogBuckets {
    pub available: Vec<VillaAvailability>,
    pub unavailable: Vec<VillaAvailability>,
}

impl CatalogBuckets {
    pub fn from_results(results: Vec<VillaAvailability>) -> Self {
        let (available, unavailable): (Vec<_>, Vec<_>) = results
            .into_iter()
            .partition(|r| r.availability.available);
        Self {
            available,
            unavailable,
        }
    }
}
