//! Monitor response types.

use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shopchat_core::{ServiceHealth, ServiceStatus};

/// Health of a single dependency.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DependencyStatus {
    /// Name of the dependency.
    pub name: String,
    /// Status reported by the dependency check.
    pub status: ServiceStatus,
    /// Reason for an unhealthy status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Duration of the check in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_ms: Option<u64>,
}

impl DependencyStatus {
    /// Creates a dependency status from a health report.
    pub fn from_health(name: impl Into<String>, health: ServiceHealth) -> Self {
        Self {
            name: name.into(),
            status: health.status,
            message: health.message,
            response_ms: health
                .response
                .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)),
        }
    }
}

/// System monitoring status response.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    /// Timestamp when this status was generated.
    pub checked_at: Timestamp,
    /// Overall system health status.
    pub status: ServiceStatus,
    /// Application version.
    pub version: String,
    /// Health of each dependency.
    pub dependencies: Vec<DependencyStatus>,
}

impl MonitorStatus {
    /// Aggregates dependency reports; the system is healthy when all of them are.
    pub fn from_dependencies(dependencies: Vec<DependencyStatus>) -> Self {
        let status = if dependencies
            .iter()
            .all(|dependency| dependency.status == ServiceStatus::Healthy)
        {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Unhealthy
        };

        Self {
            checked_at: Timestamp::now(),
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            dependencies,
        }
    }

    /// Returns true if every dependency is healthy.
    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}
