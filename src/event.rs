// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Decoded chain events.
//!
//! An `EventRecord` is produced by the external chain watcher. The compiler
//! never sees raw logs, only the decoded parameter map.
//!
//! # Ordering
//! Events of one chain are delivered in strictly increasing
//! `(block_number, log_index)` order. The compiler relies on that order (and
//! on the previous event's changesets being committed) but never checks it.

use std::collections::BTreeMap;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::PROTOCOL_ALLO_V1;
use crate::error::{CompileErrorKind, Result};
use crate::types::address::Address;
use crate::types::id::{ChainId, RoleConstant};
use crate::types::value::{self, MetaPtr, TokenAmount, Uint256};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub chain_id: ChainId,
    /// `"<Protocol>/<Contract>/<Version>"`, e.g. `"AlloV1/RoundImplementation/V2"`.
    pub contract_name: String,
    pub event_name: String,
    pub address: Address,
    pub block_number: u64,
    pub log_index: u32,
    pub transaction_hash: String,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

/// Position of an event within its chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventPosition {
    pub block_number: u64,
    pub log_index: u32,
}

impl fmt::Display for EventPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block_number, self.log_index)
    }
}

impl EventRecord {
    pub fn position(&self) -> EventPosition {
        EventPosition { block_number: self.block_number, log_index: self.log_index }
    }

    /// `None` for contracts outside the recognised protocol.
    pub fn contract(&self) -> Option<ContractName> {
        self.contract_name.parse().ok()
    }

    fn param(&self, name: &'static str) -> Result<&Value> {
        self.params.get(name).ok_or(CompileErrorKind::MalformedEventParams {
            param: name,
            reason: "missing".to_string(),
        })
    }

    /// First present param among `names`; reported under the first name when all are absent.
    fn param_any(&self, names: &[&'static str]) -> Result<(&'static str, &Value)> {
        names
            .iter()
            .find_map(|n| self.params.get(*n).map(|v| (*n, v)))
            .ok_or(CompileErrorKind::MalformedEventParams {
                param: names[0],
                reason: "missing".to_string(),
            })
    }

    pub fn param_address(&self, name: &'static str) -> Result<Address> {
        value::decode_address(self.param(name)?).map_err(|e| CompileErrorKind::param(name, e))
    }

    pub fn param_address_any(&self, names: &[&'static str]) -> Result<Address> {
        let (name, v) = self.param_any(names)?;
        value::decode_address(v).map_err(|e| CompileErrorKind::param(name, e))
    }

    pub fn param_uint256(&self, name: &'static str) -> Result<Uint256> {
        value::decode_uint256(self.param(name)?).map_err(|e| CompileErrorKind::param(name, e))
    }

    pub fn param_timestamp(&self, name: &'static str) -> Result<u64> {
        value::decode_timestamp(self.param(name)?).map_err(|e| CompileErrorKind::param(name, e))
    }

    pub fn param_amount(&self, name: &'static str) -> Result<TokenAmount> {
        value::decode_amount(self.param(name)?).map_err(|e| CompileErrorKind::param(name, e))
    }

    pub fn param_role(&self, name: &'static str) -> Result<RoleConstant> {
        value::decode_role(self.param(name)?).map_err(|e| CompileErrorKind::param(name, e))
    }

    pub fn param_meta_ptr(&self, name: &'static str) -> Result<MetaPtr> {
        MetaPtr::decode(self.param(name)?).map_err(|e| CompileErrorKind::param(name, e))
    }
}

/// Contract families emitting indexed events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContractFamily {
    ProjectRegistry,
    ProgramFactory,
    ProgramImplementation,
    RoundFactory,
    RoundImplementation,
}

impl ContractFamily {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "ProjectRegistry" => Some(ContractFamily::ProjectRegistry),
            "ProgramFactory" => Some(ContractFamily::ProgramFactory),
            "ProgramImplementation" => Some(ContractFamily::ProgramImplementation),
            "RoundFactory" => Some(ContractFamily::RoundFactory),
            "RoundImplementation" => Some(ContractFamily::RoundImplementation),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContractVersion {
    V1,
    V2,
}

impl ContractVersion {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "V1" => Some(ContractVersion::V1),
            "V2" => Some(ContractVersion::V2),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContractName {
    pub family: ContractFamily,
    pub version: ContractVersion,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised contract name: {0:?}")]
pub struct ParseContractError(pub String);

impl FromStr for ContractName {
    type Err = ParseContractError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let err = || ParseContractError(s.to_string());
        let mut parts = s.split('/');
        let (Some(protocol), Some(family), Some(version), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(err());
        };
        if protocol != PROTOCOL_ALLO_V1 {
            return Err(err());
        }
        Ok(ContractName {
            family: ContractFamily::from_name(family).ok_or_else(err)?,
            version: ContractVersion::from_name(version).ok_or_else(err)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contract_name_parsing() {
        let name: ContractName = "AlloV1/RoundImplementation/V2".parse().unwrap();
        assert_eq!(name.family, ContractFamily::RoundImplementation);
        assert_eq!(name.version, ContractVersion::V2);

        assert!("AlloV2/Registry/V1".parse::<ContractName>().is_err());
        assert!("AlloV1/RoundImplementation".parse::<ContractName>().is_err());
        assert!("AlloV1/RoundImplementation/V3".parse::<ContractName>().is_err());
        assert!("AlloV1/RoundImplementation/V1/extra".parse::<ContractName>().is_err());
    }

    #[test]
    fn test_wire_field_names() {
        let raw = json!({
            "chainId": 10,
            "contractName": "AlloV1/ProjectRegistry/V2",
            "eventName": "OwnerAdded",
            "address": "0x0000000000000000000000000000000000000001",
            "blockNumber": 5,
            "logIndex": 2,
            "transactionHash": "0xabc",
            "params": {"projectID": "3", "owner": "0x0000000000000000000000000000000000000002"}
        });
        let event: EventRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(event.chain_id, ChainId(10));
        assert_eq!(event.position(), EventPosition { block_number: 5, log_index: 2 });
        assert_eq!(event.param_uint256("projectID").unwrap(), Uint256::from(3u64));
        assert!(matches!(
            event.param_address("missing"),
            Err(CompileErrorKind::MalformedEventParams { param: "missing", .. })
        ));
    }

    #[test]
    fn test_positions_order_by_block_then_log() {
        let a = EventPosition { block_number: 1, log_index: 9 };
        let b = EventPosition { block_number: 2, log_index: 0 };
        let c = EventPosition { block_number: 2, log_index: 1 };
        assert!(a < b && b < c);
    }
}
