//! Box-drawing rendering of the cluster tree

use crate::cli::output::colors::colorize_status;
use crate::domain::models::{ClusterRecord, ServiceRecord};

/// Unicode box-drawing characters for tree visualization
const TREE_BRANCH: &str = "├── ";
const TREE_LAST: &str = "└── ";
const TREE_PIPE: &str = "│   ";
const TREE_SPACE: &str = "    ";

/// Render several clusters separated by blank lines
pub fn render_clusters(clusters: &[ClusterRecord], use_colors: bool) -> String {
    clusters
        .iter()
        .map(|cluster| render_cluster(cluster, use_colors))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render one cluster with its services and tasks
pub fn render_cluster(cluster: &ClusterRecord, use_colors: bool) -> String {
    let name = console::style(&cluster.name).bold().force_styling(use_colors);
    let mut output = format!(
        "{name} (running {}, pending {})\n",
        cluster.running, cluster.pending
    );

    for (i, service) in cluster.services.iter().enumerate() {
        let is_last = i + 1 == cluster.services.len();
        render_service(&mut output, service, is_last, use_colors);
    }

    output
}

fn render_service(output: &mut String, service: &ServiceRecord, is_last: bool, use_colors: bool) {
    let (connector, child_prefix) = if is_last {
        (TREE_LAST, TREE_SPACE)
    } else {
        (TREE_BRANCH, TREE_PIPE)
    };

    output.push_str(&format!(
        "{connector}{} (running {}, pending {})\n",
        service.name, service.running, service.pending
    ));

    for (i, task) in service.tasks.iter().enumerate() {
        let task_connector = if i + 1 == service.tasks.len() {
            TREE_LAST
        } else {
            TREE_BRANCH
        };
        output.push_str(&format!(
            "{child_prefix}{task_connector}rev {} {} -> {}\n",
            task.revision,
            colorize_status(&task.desired_status, use_colors),
            colorize_status(&task.last_status, use_colors),
        ));
    }
}
