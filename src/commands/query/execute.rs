use std::error::Error;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use num_bigint::BigInt;
use serde::Serialize;
use tracing::info;

use super::QueryCmd;
use crate::commands::Execute;
use crate::connection::Database;
use crate::value::{HostValue, RowValue};

/// A result column as shown to the user
#[derive(Debug, Clone, Serialize)]
pub struct QueryColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Result of the query command execution
#[derive(Debug, Default, Serialize)]
pub struct QueryOutput {
    pub sql: String,
    pub columns: Vec<QueryColumn>,
    pub rows: Vec<Vec<RowValue>>,
    pub row_count: usize,
    #[serde(skip_serializing_if = "is_zero")]
    pub rows_changed: u64,
    /// True when `rows` holds fewer rows than `row_count`
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// Interpret one `--param` value.
pub fn parse_param(raw: &str) -> HostValue {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "null" => return HostValue::Null,
        "true" => return HostValue::Bool(true),
        "false" => return HostValue::Bool(false),
        _ => {}
    }
    if let Ok(n) = BigInt::from_str(trimmed) {
        return HostValue::Integer(n);
    }
    let numeric = trimmed
        .trim_start_matches('-')
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.');
    if numeric && trimmed.contains('.') {
        if let Ok(d) = BigDecimal::from_str(trimmed) {
            return HostValue::Decimal(d);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return HostValue::Date(date);
    }
    HostValue::Str(raw.to_string())
}

impl Execute for QueryCmd {
    type Output = QueryOutput;

    fn execute(self, db: &Database) -> Result<Self::Output, Box<dyn Error>> {
        let params: Vec<HostValue> = self.params.iter().map(|p| parse_param(p)).collect();
        let mut conn = db.connect()?;
        let mut statement = conn.prepare(&self.sql)?;
        statement.bind_all(&params)?;

        let result = if self.pending {
            statement.pending()?.execute_pending()?
        } else {
            statement.execute()?
        };
        info!(rows = result.row_count(), pending = self.pending, "query finished");

        let limit = self.limit as usize;
        let rows = result.rows().take(limit).collect::<Result<Vec<_>, _>>()?;
        let columns = result
            .columns()
            .iter()
            .map(|c| QueryColumn {
                name: c.name.clone(),
                type_name: c.logical_type.to_string(),
            })
            .collect();

        Ok(QueryOutput {
            sql: self.sql,
            columns,
            truncated: rows.len() < result.row_count(),
            rows,
            row_count: result.row_count(),
            rows_changed: result.rows_changed(),
        })
    }
}
