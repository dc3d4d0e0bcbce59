//! Output formatting for interval command results.

use super::execute::IntervalOutput;
use crate::output::Outputable;

impl Outputable for IntervalOutput {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        if let Some(input) = &self.input {
            lines.push(format!("Input:    {}", input));
        }
        lines.push(format!("ISO 8601: {}", self.iso8601));
        lines.push(format!("Months:   {}", self.months));
        lines.push(format!("Days:     {}", self.days));
        lines.push(format!("Micros:   {}", self.micros));

        lines.join("\n")
    }
}
