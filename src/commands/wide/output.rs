//! Output formatting for wide command results.

use super::execute::WideOutput;
use crate::output::Outputable;

impl Outputable for WideOutput {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("{} {}", self.type_name, self.value));
        lines.push(String::new());
        lines.push(format!("  upper:  {} (0x{})", self.upper, self.upper_hex));
        lines.push(format!("  lower:  {} (0x{})", self.lower, self.lower_hex));
        lines.push(format!("  bignum: {}", self.bignum_hex));
        lines.push(format!("  engine: {}", self.engine_value));
        if !self.words_agree {
            lines.push(String::new());
            lines.push("WARNING: raw word split disagrees".to_string());
        }

        lines.join("\n")
    }
}
