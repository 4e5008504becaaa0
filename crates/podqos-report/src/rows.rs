use serde::Serialize;

use podqos_types::{PodResourceReport, QosClass};

/// One line of the report: a single container of a pod
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub namespace: String,
    pub pod: String,
    pub container: String,
    pub cpu_limit: String,
    pub cpu_request: String,
    pub memory_limit: String,
    pub memory_request: String,
    pub class: QosClass,
}

impl ReportRow {
    /// Table cells in column order, memory columns only when `wide`
    pub fn cells(&self, wide: bool) -> Vec<String> {
        let mut cells = vec![
            self.namespace.clone(),
            self.pod.clone(),
            self.container.clone(),
            self.cpu_limit.clone(),
            self.cpu_request.clone(),
        ];
        if wide {
            cells.push(self.memory_limit.clone());
            cells.push(self.memory_request.clone());
        }
        cells.push(self.class.to_string());
        cells
    }
}

/// Flatten pods into rows, pods then containers, in input order
pub fn assemble_rows(pods: &[PodResourceReport]) -> Vec<ReportRow> {
    pods.iter()
        .flat_map(|pod| {
            pod.containers.iter().map(move |c| ReportRow {
                namespace: pod.namespace.clone(),
                pod: pod.name.clone(),
                container: c.name.clone(),
                cpu_limit: c.limits.cpu.to_string(),
                cpu_request: c.requests.cpu.to_string(),
                memory_limit: c.limits.memory.to_string(),
                memory_request: c.requests.memory.to_string(),
                class: c.qos_class(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use podqos_types::{ContainerResourceSpec, ResourcePair, ResourceQuantity};

    fn container(name: &str, limit: &str, request: &str) -> ContainerResourceSpec {
        ContainerResourceSpec::new(
            name.to_string(),
            ResourcePair::new(limit.parse().unwrap(), ResourceQuantity::zero()),
            ResourcePair::new(request.parse().unwrap(), "64Mi".parse().unwrap()),
        )
    }

    fn pod(name: &str, containers: Vec<ContainerResourceSpec>) -> PodResourceReport {
        let mut pod = PodResourceReport::new(name.to_string(), "default".to_string());
        pod.containers = containers;
        pod
    }

    #[test]
    fn test_rows_follow_pod_then_container_order() {
        let pods = vec![
            pod(
                "p1",
                vec![container("a", "1", "500m"), container("b", "0", "0")],
            ),
            pod("p2", vec![]),
        ];

        let rows = assemble_rows(&pods);
        let keys: Vec<_> = rows
            .iter()
            .map(|r| (r.pod.as_str(), r.container.as_str()))
            .collect();
        assert_eq!(keys, [("p1", "a"), ("p1", "b")]);
    }

    #[test]
    fn test_row_values() {
        let pods = vec![pod("p1", vec![container("a", "1000m", "500m")])];
        let row = &assemble_rows(&pods)[0];

        assert_eq!(row.namespace, "default");
        assert_eq!(row.cpu_limit, "1");
        assert_eq!(row.cpu_request, "500m");
        assert_eq!(row.memory_limit, "0");
        assert_eq!(row.memory_request, "64Mi");
        assert_eq!(row.class, QosClass::Burstable);
    }

    #[test]
    fn test_no_pods_no_rows() {
        assert!(assemble_rows(&[]).is_empty());
    }

    #[test]
    fn test_cells() {
        let pods = vec![pod("p1", vec![container("a", "250m", "250m")])];
        let row = &assemble_rows(&pods)[0];

        assert_eq!(
            row.cells(false),
            ["default", "p1", "a", "250m", "250m", "Guaranteed"]
        );
        assert_eq!(
            row.cells(true),
            ["default", "p1", "a", "250m", "250m", "0", "64Mi", "Guaranteed"]
        );
    }
}
