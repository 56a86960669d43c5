//! Domain types for the Sui node client.
//!
//! Only the fields the client actually reads are modelled. Everything else a
//! node returns is kept as raw `serde_json::Value` so that new node versions
//! do not break decoding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Length in bytes of object ids and account addresses.
pub const ID_LENGTH: usize = 20;

/// Struct tag of the native gas coin.
pub const SUI_COIN_TYPE: &str = "0x2::coin::Coin<0x2::sui::SUI>";

// ==============================================================================
// Hex Identifiers
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IdParseError {
    #[error("identifier must start with 0x: {0}")]
    MissingPrefix(String),
    #[error("identifier longer than 20 bytes: {0}")]
    TooLong(String),
    #[error("invalid hex in identifier: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

fn parse_hex_id(s: &str) -> Result<[u8; ID_LENGTH], IdParseError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| IdParseError::MissingPrefix(s.to_owned()))?;
    if digits.len() > ID_LENGTH * 2 {
        return Err(IdParseError::TooLong(s.to_owned()));
    }
    // Short forms such as `0x2` are left-padded with zeros.
    let padded = format!("{digits:0>width$}", width = ID_LENGTH * 2);
    let mut bytes = [0u8; ID_LENGTH];
    hex::decode_to_slice(padded, &mut bytes)?;
    Ok(bytes)
}

macro_rules! hex_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub [u8; ID_LENGTH]);

        impl $name {
            pub fn from_bytes(bytes: [u8; ID_LENGTH]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; ID_LENGTH] {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_hex_id(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({self})", stringify!($name))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_identifier!(
    /// Identity of an on-chain object (coins and packages included).
    ObjectId
);

hex_identifier!(
    /// Account address.
    SuiAddress
);

/// Base58 transaction digest, kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionDigest(pub String);

impl fmt::Display for TransactionDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionDigest {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ==============================================================================
// Objects
// ==============================================================================

/// Versioned reference to an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub object_id: ObjectId,
    pub version: u64,
    pub digest: String,
}

/// One entry of an owned-objects listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfo {
    pub object_id: ObjectId,
    pub version: u64,
    pub digest: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub owner: serde_json::Value,
    pub previous_transaction: TransactionDigest,
}

impl ObjectInfo {
    pub fn reference(&self) -> ObjectRef {
        ObjectRef {
            object_id: self.object_id,
            version: self.version,
            digest: self.digest.clone(),
        }
    }
}

/// Contents of an existing object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectData {
    pub reference: ObjectRef,
    /// Move struct tag for Move objects, `None` for packages.
    pub type_: Option<String>,
    pub owner: serde_json::Value,
    pub previous_transaction: Option<TransactionDigest>,
    /// Raw Move fields of the object.
    pub fields: serde_json::Value,
}

/// Result of an object lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "details")]
pub enum ObjectRead {
    Exists(ObjectData),
    NotExists(ObjectId),
    Deleted(ObjectRef),
}

impl ObjectRead {
    pub fn data(&self) -> Option<&ObjectData> {
        match self {
            Self::Exists(data) => Some(data),
            Self::NotExists(_) | Self::Deleted(_) => None,
        }
    }
}

// ==============================================================================
// Coins
// ==============================================================================

/// A spendable balance held by a coin object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coin {
    pub reference: ObjectRef,
    pub balance: u64,
    pub coin_type: String,
}

// ==============================================================================
// Transactions
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasCostSummary {
    pub computation_cost: u64,
    pub storage_cost: u64,
    pub storage_rebate: u64,
}

impl GasCostSummary {
    /// Net gas charged; a rebate larger than the costs yields zero.
    pub fn net_gas_usage(&self) -> u64 {
        self.computation_cost
            .saturating_add(self.storage_cost)
            .saturating_sub(self.storage_rebate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
    pub gas_used: GasCostSummary,
    pub transaction_digest: TransactionDigest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub certificate: serde_json::Value,
    pub effects: TransactionEffects,
    #[serde(default, rename = "timestamp_ms", alias = "timestampMs")]
    pub timestamp_ms: Option<u64>,
}

impl TransactionResponse {
    pub fn digest(&self) -> &TransactionDigest {
        &self.effects.transaction_digest
    }
}

/// Arguments of a Move function call to be turned into a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveCallRequest {
    pub signer: SuiAddress,
    pub package_object_id: ObjectId,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    /// Pure values and object ids, already in the node's JSON encoding.
    pub arguments: Vec<serde_json::Value>,
    /// Gas coin; `None` lets the node pick one.
    pub gas: Option<ObjectId>,
    pub gas_budget: u64,
}

impl MoveCallRequest {
    pub(crate) fn to_params(&self) -> Vec<serde_json::Value> {
        vec![
            serde_json::json!(self.signer),
            serde_json::json!(self.package_object_id),
            serde_json::json!(self.module),
            serde_json::json!(self.function),
            serde_json::json!(self.type_arguments),
            serde_json::Value::Array(self.arguments.clone()),
            serde_json::json!(self.gas),
            serde_json::json!(self.gas_budget),
        ]
    }
}

/// Unsigned transaction produced by a transaction-building method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBytes {
    /// Base64 BCS bytes of the transaction data.
    pub tx_bytes: String,
    pub gas: ObjectRef,
    #[serde(default)]
    pub input_objects: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_round_trips_through_display() {
        let s = "0x523203b287a2c1df0a707a6b563aa7d29bd216d6";
        let id: ObjectId = s.parse().expect("must parse");
        assert_eq!(id.to_string(), s);
    }

    #[test]
    fn short_object_id_is_left_padded() {
        let id: ObjectId = "0x2".parse().expect("must parse");
        assert_eq!(id.to_string(), "0x0000000000000000000000000000000000000002");
    }

    #[test]
    fn object_id_rejects_missing_prefix_and_bad_hex() {
        assert!(matches!(
            "523203b2".parse::<ObjectId>(),
            Err(IdParseError::MissingPrefix(_))
        ));
        assert!(matches!(
            "0xzz".parse::<ObjectId>(),
            Err(IdParseError::InvalidHex(_))
        ));
        assert!(matches!(
            format!("0x{}", "ab".repeat(21)).parse::<SuiAddress>(),
            Err(IdParseError::TooLong(_))
        ));
    }

    #[test]
    fn parse_errors_compare_by_value() {
        assert_eq!(
            "2".parse::<SuiAddress>(),
            Err(IdParseError::MissingPrefix("2".to_owned()))
        );
        assert_ne!(
            "0xzz".parse::<ObjectId>().expect_err("bad hex"),
            IdParseError::TooLong("0xzz".to_owned())
        );
    }

    #[test]
    fn object_info_deserializes_from_node_json() {
        let raw = serde_json::json!({
            "objectId": "0xb1e55000000000000000000000000000000000ca",
            "version": 3,
            "digest": "kJOuYVbWfvSdPGNqVZBWsZBVozn4l2KGHSVOtGwKQmA=",
            "type": SUI_COIN_TYPE,
            "owner": { "AddressOwner": "0x6c5d2cd6e62734f61b4e318e58cbfd1c4b99dfaf" },
            "previousTransaction": "TkLw7eH9NtKh6pSb7evL8EcCf7RDMEsJ3VU7FqJRpf8"
        });
        let info: ObjectInfo = serde_json::from_value(raw).expect("must decode");
        assert_eq!(info.type_, SUI_COIN_TYPE);
        assert_eq!(info.reference().version, 3);
    }

    #[test]
    fn net_gas_usage_saturates() {
        let gas = GasCostSummary {
            computation_cost: 10,
            storage_cost: 5,
            storage_rebate: 100,
        };
        assert_eq!(gas.net_gas_usage(), 0);
    }
}
