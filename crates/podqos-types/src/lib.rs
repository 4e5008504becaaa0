//! Shared types for kubectl-podqos
//!
//! This crate contains the resource model, the QoS classifier and namespace
//! selection used across the kubectl-podqos crates.

mod quantity;

use std::fmt;

use serde::Serialize;

pub use quantity::{QuantityError, QuantityFormat, ResourceQuantity};

/// Namespace used when neither the flag nor the kubeconfig context sets one
pub const DEFAULT_NAMESPACE: &str = "default";

// ============================================================================
// QoS Classification
// ============================================================================

/// Quality-of-Service class of a container
///
/// Only the CPU dimension is considered. The cluster's own QoS rule also
/// compares memory across every container of the pod, so a pod may be
/// reported differently here than in `status.qosClass`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum QosClass {
    /// No CPU limit or request is set
    BestEffort,
    /// CPU request is below the limit
    Burstable,
    /// CPU request equals the limit
    Guaranteed,
}

impl QosClass {
    /// Classify a container from its CPU limit and CPU request
    ///
    /// Rules are checked in order: both zero, equal, request below limit.
    /// A request above its limit is rejected by API validation in a real
    /// cluster and falls back to `BestEffort`.
    pub fn classify(limit: &ResourceQuantity, request: &ResourceQuantity) -> Self {
        if limit.is_zero() && request.is_zero() {
            return Self::BestEffort;
        }

        let limit = limit.milli_value();
        let request = request.milli_value();
        if limit == request {
            return Self::Guaranteed;
        }
        if request < limit {
            return Self::Burstable;
        }
        Self::BestEffort
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BestEffort => "BestEffort",
            Self::Burstable => "Burstable",
            Self::Guaranteed => "Guaranteed",
        }
    }
}

impl fmt::Display for QosClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Kubernetes Resource Types
// ============================================================================

/// CPU and memory amounts for either limits or requests
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourcePair {
    pub cpu: ResourceQuantity,
    pub memory: ResourceQuantity,
}

impl ResourcePair {
    pub fn new(cpu: ResourceQuantity, memory: ResourceQuantity) -> Self {
        Self { cpu, memory }
    }
}

/// Resource limits and requests of a single container
#[derive(Clone, Debug)]
pub struct ContainerResourceSpec {
    pub name: String,
    pub limits: ResourcePair,
    pub requests: ResourcePair,
}

impl ContainerResourceSpec {
    pub fn new(name: String, limits: ResourcePair, requests: ResourcePair) -> Self {
        Self {
            name,
            limits,
            requests,
        }
    }

    pub fn qos_class(&self) -> QosClass {
        QosClass::classify(&self.limits.cpu, &self.requests.cpu)
    }
}

/// A pod and its containers in declaration order
#[derive(Clone, Debug)]
pub struct PodResourceReport {
    pub name: String,
    pub namespace: String,
    pub containers: Vec<ContainerResourceSpec>,
}

impl PodResourceReport {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            containers: Vec::new(),
        }
    }
}

// ============================================================================
// Namespace Selection
// ============================================================================

/// Namespaces a pod listing covers
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NamespaceSelector {
    /// Every namespace in the cluster
    All,
    /// A single namespace
    Named(String),
}

impl NamespaceSelector {
    /// Namespace as used by the list API, empty for all namespaces
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "",
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for NamespaceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("<all namespaces>"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Pick the namespace to list pods from
///
/// `all_namespaces` wins over everything, then the flag value, then the
/// namespace of the kubeconfig context, then [`DEFAULT_NAMESPACE`]. Empty
/// strings count as unset.
pub fn resolve_namespace(
    flag: Option<&str>,
    context_namespace: Option<&str>,
    all_namespaces: bool,
) -> NamespaceSelector {
    if all_namespaces {
        return NamespaceSelector::All;
    }

    let name = flag
        .filter(|ns| !ns.is_empty())
        .or_else(|| context_namespace.filter(|ns| !ns.is_empty()))
        .unwrap_or(DEFAULT_NAMESPACE);

    NamespaceSelector::Named(name.to_string())
}
