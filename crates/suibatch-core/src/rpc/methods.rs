//! Node methods the typed client knows about, with the number of positional
//! parameters each accepts. Calls are checked here before any id is spent.

use std::ops::RangeInclusive;

use serde_json::Value;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GetTotalTransactionNumber,
    GetTransactionsInRange,
    GetTransaction,
    GetObject,
    GetObjectsOwnedByAddress,
    MoveCall,
    DryRunTransaction,
}

impl Method {
    pub const fn name(self) -> &'static str {
        match self {
            Self::GetTotalTransactionNumber => "sui_getTotalTransactionNumber",
            Self::GetTransactionsInRange => "sui_getTransactionsInRange",
            Self::GetTransaction => "sui_getTransaction",
            Self::GetObject => "sui_getObject",
            Self::GetObjectsOwnedByAddress => "sui_getObjectsOwnedByAddress",
            Self::MoveCall => "sui_moveCall",
            Self::DryRunTransaction => "sui_dryRunTransaction",
        }
    }

    fn arity(self) -> RangeInclusive<usize> {
        match self {
            Self::GetTotalTransactionNumber => 0..=0,
            Self::GetTransactionsInRange => 2..=2,
            Self::GetTransaction | Self::GetObject | Self::GetObjectsOwnedByAddress => 1..=1,
            // signer, package, module, function, type args, args, gas, budget
            Self::MoveCall => 8..=8,
            Self::DryRunTransaction => 1..=1,
        }
    }

    pub fn validate(self, params: &[Value]) -> Result<(), CoreError> {
        let arity = self.arity();
        if arity.contains(&params.len()) {
            return Ok(());
        }
        Err(CoreError::InvalidCall {
            method: self.name().to_owned(),
            message: format!(
                "expected {}..={} params, got {}",
                arity.start(),
                arity.end(),
                params.len()
            ),
        })
    }

    /// Validate `params` and pair them with the wire method name.
    pub fn call(self, params: Vec<Value>) -> Result<(String, Vec<Value>), CoreError> {
        self.validate(&params)?;
        Ok((self.name().to_owned(), params))
    }
}
