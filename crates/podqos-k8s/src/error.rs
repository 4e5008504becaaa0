use kube::config::KubeconfigError;
use podqos_types::QuantityError;
use thiserror::Error;

/// Failures talking to the cluster, all fatal for a report run
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("failed to read kubeconfig, is kubectl configured?")]
    ReadKubeconfig(#[source] KubeconfigError),

    #[error("kubeconfig has no current context")]
    NoCurrentContext,

    #[error("context '{0}' not found in kubeconfig")]
    ContextNotFound(String),

    #[error("failed to create config for context '{context}'")]
    ClientConfig {
        context: String,
        #[source]
        source: KubeconfigError,
    },

    #[error("failed to create client for context '{context}'")]
    CreateClient {
        context: String,
        #[source]
        source: kube::Error,
    },

    #[error("failed to list pods in {namespace}")]
    ListPods {
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("invalid {resource} quantity on container '{container}' of pod '{pod}'")]
    InvalidQuantity {
        pod: String,
        container: String,
        resource: String,
        #[source]
        source: QuantityError,
    },
}
