//! Output formatting for query command results.

use super::execute::QueryOutput;
use crate::output::{render_grid, Outputable};

impl Outputable for QueryOutput {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Query: {}", self.sql));
        lines.push(String::new());

        if self.columns.is_empty() {
            lines.push("No columns.".to_string());
            return lines.join("\n");
        }

        let header: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} ({})", c.name, c.type_name))
            .collect();
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();
        lines.extend(render_grid(&header, &cells));
        lines.push(String::new());

        let mut summary = if self.truncated {
            format!("{} of {} rows", self.rows.len(), self.row_count)
        } else {
            format!("{} rows", self.row_count)
        };
        if self.rows_changed > 0 {
            summary.push_str(&format!(", {} changed", self.rows_changed));
        }
        lines.push(summary);

        lines.join("\n")
    }
}
