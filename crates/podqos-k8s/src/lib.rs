//! Kubernetes client for kubectl-podqos
//!
//! This crate provides kubeconfig handling and the pod listing that feeds
//! the QoS report.

mod client;
mod error;

pub use client::KubeClient;
pub use error::ClusterError;

// Re-export types that are used in our public API
pub use podqos_types::{ContainerResourceSpec, NamespaceSelector, PodResourceReport};
