//! Table output for the cluster tree
//!
//! Three columns (Name / Running / Pending). Clusters are bold, services
//! are prefixed ` - ` and tasks `  * <revision> (<desired> -> <last>)`.

use comfy_table::{presets, Attribute, Cell, CellAlignment, ContentArrangement, Table};

use crate::cli::output::colors::{colorize_status, pending_color};
use crate::domain::models::{ClusterRecord, ServiceRecord, TaskRecord};

/// Table formatter for cluster trees
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
}

impl TableFormatter {
    pub const fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Format every cluster into one table
    pub fn format_clusters(&self, clusters: &[ClusterRecord]) -> String {
        let mut table = self.create_base_table(true);
        for cluster in clusters {
            self.push_cluster(&mut table, cluster);
        }
        table.to_string()
    }

    /// Format a single cluster without the header, as used by streaming output
    pub fn format_cluster(&self, cluster: &ClusterRecord) -> String {
        let mut table = self.create_base_table(false);
        self.push_cluster(&mut table, cluster);
        table.to_string()
    }

    fn push_cluster(&self, table: &mut Table, cluster: &ClusterRecord) {
        table.add_row(vec![
            Cell::new(&cluster.name).add_attribute(Attribute::Bold),
            self.count_cell(cluster.running, None),
            self.count_cell(cluster.pending, pending_color(cluster.pending)),
        ]);

        for service in &cluster.services {
            self.push_service(table, service);
        }
    }

    fn push_service(&self, table: &mut Table, service: &ServiceRecord) {
        table.add_row(vec![
            Cell::new(format!(" - {}", service.name)),
            self.count_cell(service.running, None),
            self.count_cell(service.pending, pending_color(service.pending)),
        ]);

        for task in &service.tasks {
            table.add_row(vec![
                Cell::new(self.task_label(task)),
                Cell::new(""),
                Cell::new(""),
            ]);
        }
    }

    fn task_label(&self, task: &TaskRecord) -> String {
        format!(
            "  * {} ({} -> {})",
            task.revision,
            colorize_status(&task.desired_status, self.use_colors),
            colorize_status(&task.last_status, self.use_colors),
        )
    }

    fn count_cell(&self, count: i64, color: Option<comfy_table::Color>) -> Cell {
        let cell = Cell::new(count).set_alignment(CellAlignment::Right);
        match color {
            Some(color) if self.use_colors => cell.fg(color),
            _ => cell,
        }
    }

    fn create_base_table(&self, with_header: bool) -> Table {
        let mut table = Table::new();

        table
            .load_preset(presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if with_header {
            table.set_header(vec![
                Cell::new("Name").add_attribute(Attribute::Bold),
                Cell::new("Running").add_attribute(Attribute::Bold),
                Cell::new("Pending").add_attribute(Attribute::Bold),
            ]);
        }

        if self.use_colors {
            table.enforce_styling();
        } else {
            table.force_no_tty();
        }

        table
    }
}
