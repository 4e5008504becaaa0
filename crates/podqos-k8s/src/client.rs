//! Kubernetes client for kubectl-podqos

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Container, Pod};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use kube::Api;
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use tracing::debug;

use podqos_types::{
    ContainerResourceSpec, NamespaceSelector, PodResourceReport, ResourcePair, ResourceQuantity,
};

use crate::error::ClusterError;

const CPU: &str = "cpu";
const MEMORY: &str = "memory";

/// Kubernetes client wrapper
pub struct KubeClient {
    kubeconfig: Kubeconfig,
    current_context: Option<String>,
}

impl KubeClient {
    /// Load the kubeconfig from `KUBECONFIG` or `~/.kube/config`
    pub fn new() -> Result<Self, ClusterError> {
        let kubeconfig = Kubeconfig::read().map_err(ClusterError::ReadKubeconfig)?;
        Ok(Self::from_kubeconfig(kubeconfig))
    }

    pub fn from_kubeconfig(kubeconfig: Kubeconfig) -> Self {
        let current_context = kubeconfig.current_context.clone();
        Self {
            kubeconfig,
            current_context,
        }
    }

    /// Context to use: the requested one, else the kubeconfig's current context
    pub fn active_context<'a>(
        &'a self,
        requested: Option<&'a str>,
    ) -> Result<&'a str, ClusterError> {
        let name = requested
            .filter(|name| !name.is_empty())
            .or(self.current_context.as_deref())
            .ok_or(ClusterError::NoCurrentContext)?;

        if !self.kubeconfig.contexts.iter().any(|ctx| ctx.name == name) {
            return Err(ClusterError::ContextNotFound(name.to_string()));
        }
        Ok(name)
    }

    /// Default namespace configured on a context, if any
    pub fn context_namespace(&self, context_name: &str) -> Result<Option<String>, ClusterError> {
        let context = self
            .kubeconfig
            .contexts
            .iter()
            .find(|ctx| ctx.name == context_name)
            .ok_or_else(|| ClusterError::ContextNotFound(context_name.to_string()))?;

        Ok(context
            .context
            .as_ref()
            .and_then(|c| c.namespace.clone())
            .filter(|ns| !ns.is_empty()))
    }

    /// Create a kube::Client for a specific context
    pub async fn client_for_context(
        &self,
        context_name: &str,
    ) -> Result<kube::Client, ClusterError> {
        let config = kube::Config::from_custom_kubeconfig(
            self.kubeconfig.clone(),
            &KubeConfigOptions {
                context: Some(context_name.to_string()),
                ..Default::default()
            },
        )
        .await
        .map_err(|source| ClusterError::ClientConfig {
            context: context_name.to_string(),
            source,
        })?;

        debug!(context = context_name, cluster = %config.cluster_url, "connecting");

        kube::Client::try_from(config).map_err(|source| ClusterError::CreateClient {
            context: context_name.to_string(),
            source,
        })
    }

    /// List pods once and extract their container resources in API order
    pub async fn list_pod_reports(
        &self,
        client: &kube::Client,
        selector: &NamespaceSelector,
    ) -> Result<Vec<PodResourceReport>, ClusterError> {
        let pods: Api<Pod> = match selector {
            NamespaceSelector::All => Api::all(client.clone()),
            NamespaceSelector::Named(namespace) => Api::namespaced(client.clone(), namespace),
        };

        let list = pods
            .list(&ListParams::default())
            .await
            .map_err(|source| ClusterError::ListPods {
                namespace: selector.to_string(),
                source,
            })?;

        debug!(namespace = %selector, pods = list.items.len(), "listed pods");

        list.items.into_iter().map(Self::pod_to_report).collect()
    }

    /// Convert a k8s Pod to a PodResourceReport
    fn pod_to_report(pod: Pod) -> Result<PodResourceReport, ClusterError> {
        let name = pod.metadata.name.unwrap_or_default();
        let namespace = pod.metadata.namespace.unwrap_or_default();
        let mut report = PodResourceReport::new(name, namespace);

        if let Some(spec) = pod.spec {
            report.containers = spec
                .containers
                .into_iter()
                .map(|c| Self::container_to_spec(&report.name, c))
                .collect::<Result<_, _>>()?;
        }

        Ok(report)
    }

    fn container_to_spec(
        pod_name: &str,
        container: Container,
    ) -> Result<ContainerResourceSpec, ClusterError> {
        let resources = container.resources.unwrap_or_default();
        let read = |list: Option<&BTreeMap<String, Quantity>>, resource: &str| {
            let Some(quantity) = list.and_then(|l| l.get(resource)) else {
                return Ok(ResourceQuantity::zero());
            };
            quantity
                .0
                .parse::<ResourceQuantity>()
                .map_err(|source| ClusterError::InvalidQuantity {
                    pod: pod_name.to_string(),
                    container: container.name.clone(),
                    resource: resource.to_string(),
                    source,
                })
        };

        let limits = resources.limits.as_ref();
        let requests = resources.requests.as_ref();
        let limits = ResourcePair::new(read(limits, CPU)?, read(limits, MEMORY)?);
        let requests = ResourcePair::new(read(requests, CPU)?, read(requests, MEMORY)?);

        Ok(ContainerResourceSpec::new(container.name, limits, requests))
    }
}
