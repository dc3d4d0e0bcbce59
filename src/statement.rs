//! Prepared statements and parameter binding.

use bigdecimal::BigDecimal;
use engine::{LogicalType, NativeStatement, NativeValue};
use num_bigint::BigInt;
use tracing::debug;

use crate::codec::fixed::FixedKind;
use crate::codec::{decimal, wide};
use crate::dispatch::{bind_fixed, bind_value, FetchContext};
use crate::error::{DuckError, Result};
use crate::pending::PendingResult;
use crate::result::QueryResult;
use crate::value::HostValue;

/// A prepared statement with 1-based parameter slots.
///
/// Binding errors surface at the bind call. A failed bind clears every
/// binding, so the statement must be rebound from scratch before it runs.
pub struct PreparedStatement<'conn> {
    native: Box<dyn NativeStatement + 'conn>,
    context: FetchContext,
    max_task_steps: Option<u64>,
}

impl<'conn> PreparedStatement<'conn> {
    pub(crate) fn new(
        native: Box<dyn NativeStatement + 'conn>,
        context: FetchContext,
        max_task_steps: Option<u64>,
    ) -> Self {
        Self {
            native,
            context,
            max_task_steps,
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.native.parameter_count()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let count = self.parameter_count();
        if index == 0 || index > count {
            return Err(DuckError::range(format!(
                "parameter index {} is out of range (statement has {} parameters)",
                index, count
            )));
        }
        Ok(())
    }

    /// Declared type of parameter `index`; `Unknown` when the engine cannot
    /// infer one.
    pub fn parameter_type(&self, index: usize) -> Result<LogicalType> {
        self.check_index(index)?;
        Ok(self.native.parameter_type(index))
    }

    /// Encode with `encode` and hand the result to the engine. Any failure
    /// leaves the statement with no bindings at all.
    fn bind_with<F>(&mut self, index: usize, encode: F) -> Result<()>
    where
        F: FnOnce(&LogicalType) -> Result<NativeValue>,
    {
        let outcome = self.check_index(index).and_then(|_| {
            let target = self.native.parameter_type(index);
            let native = encode(&target)?;
            self.native.bind(index, native).map_err(DuckError::from)
        });
        if let Err(e) = &outcome {
            debug!(index, error = %e, "bind failed, clearing all bindings");
            self.native.clear_bindings();
        }
        outcome
    }

    /// Bind a host value, converted for the parameter's declared type.
    pub fn bind(&mut self, index: usize, value: impl Into<HostValue>) -> Result<()> {
        let value = value.into();
        self.bind_with(index, |target| bind_value(&value, target))
    }

    /// Bind `values` to parameters `1..=values.len()`.
    pub fn bind_all(&mut self, values: &[HostValue]) -> Result<()> {
        for (i, value) in values.iter().enumerate() {
            self.bind_with(i + 1, |target| bind_value(value, target))?;
        }
        Ok(())
    }

    /// Bind into an explicit fixed-width kind, ignoring the declared type.
    pub fn bind_typed(&mut self, index: usize, value: impl Into<HostValue>, kind: FixedKind) -> Result<()> {
        let value = value.into();
        self.bind_with(index, |_| bind_fixed(&value, kind))
    }

    /// Bind a 128-bit signed integer directly as HUGEINT words.
    pub fn bind_hugeint(&mut self, index: usize, value: &BigInt) -> Result<()> {
        self.bind_with(index, |_| Ok(NativeValue::HugeInt(wide::to_wide(value)?)))
    }

    /// Bind a 128-bit unsigned integer directly as UHUGEINT words.
    pub fn bind_uhugeint(&mut self, index: usize, value: &BigInt) -> Result<()> {
        self.bind_with(index, |_| Ok(NativeValue::UHugeInt(wide::to_uwide(value)?)))
    }

    /// Bind a decimal at an explicit precision, rounding half away from zero.
    pub fn bind_decimal(&mut self, index: usize, value: &BigDecimal, width: u8, scale: u8) -> Result<()> {
        self.bind_with(index, |_| decimal::encode(value, width, scale))
    }

    pub fn clear_bindings(&mut self) {
        self.native.clear_bindings();
    }

    /// Start a steppable execution. The statement stays borrowed until the
    /// pending result is finalized or dropped.
    pub fn pending(&mut self) -> Result<PendingResult<'_>> {
        let native = self.native.pending()?;
        Ok(PendingResult::new(native, self.context, self.max_task_steps))
    }

    /// Execute to completion in one call.
    pub fn execute(&mut self) -> Result<QueryResult> {
        let native = self.native.execute()?;
        Ok(QueryResult::new(native, self.context))
    }
}
