use std::error::Error;
use std::str::FromStr;

use engine::UWideInt;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::Serialize;
use tracing::debug;

use super::WideCmd;
use crate::codec::wide;
use crate::commands::Execute;
use crate::connection::Database;
use crate::error::{DuckError, Result};
use crate::statement::PreparedStatement;
use crate::value::RowValue;

/// Result of the wide command
#[derive(Debug, Serialize)]
pub struct WideOutput {
    pub value: String,
    #[serde(rename = "type")]
    pub type_name: &'static str,
    /// Upper word in decimal; signed for HUGEINT
    pub upper: String,
    pub lower: u64,
    pub upper_hex: String,
    pub lower_hex: String,
    /// BIGNUM encoding of the same value
    pub bignum_hex: String,
    /// The value after binding the words and fetching them back
    pub engine_value: String,
    /// Whether the raw 128-bit word split agrees with the arbitrary-precision one
    pub words_agree: bool,
}

/// Run a one-parameter statement and read back its single wide cell.
fn fetch_back<F>(db: &Database, sql: &str, bind: F) -> Result<BigInt>
where
    F: FnOnce(&mut PreparedStatement<'_>) -> Result<()>,
{
    let mut conn = db.connect()?;
    let mut statement = conn.prepare(sql)?;
    bind(&mut statement)?;
    let result = statement.execute()?;
    match result.fetch_row(0, 0)? {
        RowValue::HugeInt(v) => Ok(v),
        other => Err(DuckError::invalid_state(format!(
            "expected a wide integer cell, got {}",
            other
        ))),
    }
}

impl Execute for WideCmd {
    type Output = WideOutput;

    fn execute(self, db: &Database) -> std::result::Result<Self::Output, Box<dyn Error>> {
        let value = BigInt::from_str(self.value.trim())
            .map_err(|_| DuckError::argument(format!("'{}' is not an integer", self.value)))?;

        let (type_name, upper, upper_hex, lower, words_agree, fetched) = if self.unsigned {
            let words = wide::to_uwide(&value)?;
            let agree = value.to_u128().map(UWideInt::from_u128) == Some(words);
            let fetched = fetch_back(db, "SELECT ?::UHUGEINT AS h", |s| s.bind_uhugeint(1, &value))?;
            let hex = format!("{:016x}", words.upper);
            ("UHUGEINT", words.upper.to_string(), hex, words.lower, agree, fetched)
        } else {
            let words = wide::to_wide(&value)?;
            let agree = value.to_i128().map(wide::to_wide_internal) == Some((words.upper, words.lower));
            let fetched = fetch_back(db, "SELECT ?::HUGEINT AS h", |s| s.bind_hugeint(1, &value))?;
            let hex = format!("{:016x}", words.upper);
            ("HUGEINT", words.upper.to_string(), hex, words.lower, agree, fetched)
        };
        debug!(value = %value, upper = %upper, lower, "split wide integer");

        Ok(WideOutput {
            value: value.to_string(),
            type_name,
            upper,
            lower,
            upper_hex,
            lower_hex: format!("{:016x}", lower),
            bignum_hex: hex::encode(wide::encode_bignum(&value)),
            engine_value: fetched.to_string(),
            words_agree,
        })
    }
}
