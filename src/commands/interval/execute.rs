use std::error::Error;

use serde::Serialize;
use tracing::debug;

use super::{IntervalAction, IntervalCmd};
use crate::commands::Execute;
use crate::connection::Database;
use crate::error::DuckError;
use crate::value::{IntervalValue, RowValue};

/// Result of the interval command
#[derive(Debug, Serialize)]
pub struct IntervalOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    pub months: i32,
    pub days: i32,
    pub micros: i64,
    pub iso8601: String,
}

impl IntervalOutput {
    fn new(input: Option<String>, interval: IntervalValue) -> Self {
        Self {
            input,
            months: interval.months,
            days: interval.days,
            micros: interval.micros,
            iso8601: interval.to_iso8601(),
        }
    }
}

/// Bind `interval` as a parameter and read it back from a result cell.
fn through_engine(db: &Database, interval: IntervalValue) -> Result<IntervalValue, DuckError> {
    let mut conn = db.connect()?;
    let result = conn.query("SELECT ?::INTERVAL AS i", &[interval.into()])?;
    match result.fetch_row(0, 0)? {
        RowValue::Interval(fetched) => Ok(fetched),
        other => Err(DuckError::invalid_state(format!(
            "expected an INTERVAL cell, got {}",
            other
        ))),
    }
}

impl Execute for IntervalCmd {
    type Output = IntervalOutput;

    fn execute(self, db: &Database) -> Result<Self::Output, Box<dyn Error>> {
        match self.action {
            IntervalAction::Parse { input } => {
                let parsed = IntervalValue::parse_iso8601(&input)?;
                let fetched = through_engine(db, parsed)?;
                debug!(input = %input, interval = %fetched, "interval parsed");
                Ok(IntervalOutput::new(Some(input), fetched))
            }
            IntervalAction::Format {
                months,
                days,
                micros,
            } => Ok(IntervalOutput::new(
                None,
                IntervalValue::new(months, days, micros),
            )),
        }
    }
}
