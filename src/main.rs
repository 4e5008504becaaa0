use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use podqos_k8s::KubeClient;
use podqos_report::{OutputFormat, assemble_rows, render};
use podqos_types::{NamespaceSelector, resolve_namespace};

/// kubectl-podqos - Report the CPU QoS class of every container
#[derive(Parser, Debug)]
#[command(name = "kubectl-podqos")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Namespace to query (defaults to the context namespace, then "default")
    #[arg(short = 'n', long, value_name = "NAMESPACE")]
    namespace: Option<String>,

    /// Query all namespaces
    #[arg(short = 'A', long = "all-namespaces")]
    all_namespaces: bool,

    /// Kubeconfig context to use instead of the current context
    #[arg(long, value_name = "CONTEXT")]
    context: Option<String>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

/// Settings for a single report run, fixed once arguments are parsed
#[derive(Debug, Clone, PartialEq, Eq)]
struct ReportConfig {
    namespace: Option<String>,
    all_namespaces: bool,
    context: Option<String>,
    output: OutputFormat,
}

impl From<Args> for ReportConfig {
    fn from(args: Args) -> Self {
        // An empty value means the flag was not set
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        Self {
            namespace: non_empty(args.namespace),
            all_namespaces: args.all_namespaces,
            context: non_empty(args.context),
            output: args.output,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr so stdout only carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ReportConfig::from(args);

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &ReportConfig) -> Result<()> {
    let kube_client = KubeClient::new()?;
    let context = kube_client.active_context(config.context.as_deref())?;
    let selector = namespace_selector(config, kube_client.context_namespace(context)?);
    debug!(context, namespace = %selector, "resolved report target");

    let client = kube_client.client_for_context(context).await?;
    let pods = kube_client.list_pod_reports(&client, &selector).await?;

    let rows = assemble_rows(&pods);
    let report = render(&rows, config.output).context("Failed to render report")?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(report.as_bytes())
        .and_then(|()| stdout.flush())
        .context("Failed to write report")?;

    Ok(())
}

fn namespace_selector(
    config: &ReportConfig,
    context_namespace: Option<String>,
) -> NamespaceSelector {
    resolve_namespace(
        config.namespace.as_deref(),
        context_namespace.as_deref(),
        config.all_namespaces,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> ReportConfig {
        let argv = std::iter::once("kubectl-podqos").chain(args.iter().copied());
        ReportConfig::from(Args::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(
            config(&[]),
            ReportConfig {
                namespace: None,
                all_namespaces: false,
                context: None,
                output: OutputFormat::Table,
            }
        );
    }

    #[test]
    fn test_namespace_flags() {
        assert_eq!(
            config(&["-n", "kube-system"]).namespace.as_deref(),
            Some("kube-system")
        );
        assert_eq!(
            config(&["--namespace", "apps"]).namespace.as_deref(),
            Some("apps")
        );
        assert_eq!(config(&["-n", ""]).namespace, None);
        assert!(config(&["-A"]).all_namespaces);
        assert!(config(&["--all-namespaces"]).all_namespaces);
    }

    #[test]
    fn test_output_and_context_flags() {
        assert_eq!(config(&["-o", "wide"]).output, OutputFormat::Wide);
        assert_eq!(config(&["--output", "json"]).output, OutputFormat::Json);
        assert_eq!(
            config(&["--context", "prod"]).context.as_deref(),
            Some("prod")
        );
        assert!(Args::try_parse_from(["kubectl-podqos", "-o", "yaml"]).is_err());
    }

    #[test]
    fn test_namespace_selector_precedence() {
        let ns = |s: &str| NamespaceSelector::Named(s.to_string());

        assert_eq!(
            namespace_selector(&config(&["-n", "apps"]), Some("team".to_string())),
            ns("apps")
        );
        assert_eq!(
            namespace_selector(&config(&[]), Some("team".to_string())),
            ns("team")
        );
        assert_eq!(namespace_selector(&config(&[]), None), ns("default"));
        assert_eq!(
            namespace_selector(&config(&["-A", "-n", "apps"]), Some("team".to_string())),
            NamespaceSelector::All
        );
    }
}
