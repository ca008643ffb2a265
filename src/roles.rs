// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Role constant resolution.
//!
//! Access-control contracts emit `RoleGranted`/`RoleRevoked` with an opaque
//! `bytes32` role. Its meaning depends on the contract family and version, so
//! resolution is a static table lookup. Supporting a new contract version is
//! a new row, not new logic.
//!
//! Ownership-style contracts (`OwnerAdded`/`OwnerRemoved`) never consult this
//! table: their role is always `owner`.

use hex_literal::hex;

use crate::event::ContractFamily::{self, ProgramImplementation, RoundImplementation};
use crate::event::ContractVersion::{self, V1, V2};
use crate::types::enums::{ProjectRoleKind, RoundRoleKind};
use crate::types::id::RoleConstant;

/// OpenZeppelin `DEFAULT_ADMIN_ROLE`.
pub const DEFAULT_ADMIN_ROLE: RoleConstant = RoleConstant([0u8; 32]);

/// `keccak256("PROGRAM_OPERATOR")`.
pub const PROGRAM_OPERATOR_ROLE: RoleConstant =
    RoleConstant(hex!("aa630204f2780b6f080cc77cc0e9c0a5c21e92eb0c6771e709255dd27d6de132"));

/// `keccak256("ROUND_OPERATOR")`, as deployed with V1 round implementations.
pub const ROUND_OPERATOR_ROLE_V1: RoleConstant =
    RoleConstant(hex!("ec61da14b5abbac5c5fda6f1d57642a264ebd5d0674f35852829746dfb8174a5"));

/// Operator role of V2 round implementations.
pub const ROUND_OPERATOR_ROLE_V2: RoleConstant =
    RoleConstant(hex!("ec61da14b5abbac5c5fda6f1d57642a264ebd5d0674f35852829746dfb8174a5"));

/// Semantic role, scoped to the entity kind the contract represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessRole {
    Program(ProjectRoleKind),
    Round(RoundRoleKind),
}

#[derive(Clone, Copy, Debug)]
pub struct RoleRow {
    pub family: ContractFamily,
    pub version: ContractVersion,
    pub constant: RoleConstant,
    pub role: AccessRole,
}

const fn row(
    family: ContractFamily,
    version: ContractVersion,
    constant: RoleConstant,
    role: AccessRole,
) -> RoleRow {
    RoleRow { family, version, constant, role }
}

pub static ROLE_TABLE: &[RoleRow] = &[
    row(ProgramImplementation, V1, DEFAULT_ADMIN_ROLE, AccessRole::Program(ProjectRoleKind::Owner)),
    row(ProgramImplementation, V1, PROGRAM_OPERATOR_ROLE, AccessRole::Program(ProjectRoleKind::Member)),
    row(RoundImplementation, V1, DEFAULT_ADMIN_ROLE, AccessRole::Round(RoundRoleKind::Admin)),
    row(RoundImplementation, V1, ROUND_OPERATOR_ROLE_V1, AccessRole::Round(RoundRoleKind::Manager)),
    row(RoundImplementation, V2, DEFAULT_ADMIN_ROLE, AccessRole::Round(RoundRoleKind::Admin)),
    row(RoundImplementation, V2, ROUND_OPERATOR_ROLE_V2, AccessRole::Round(RoundRoleKind::Manager)),
];

/// `None` means "no mapping": the event produces no changesets.
pub fn resolve(family: ContractFamily, version: ContractVersion, constant: &RoleConstant) -> Option<AccessRole> {
    ROLE_TABLE
        .iter()
        .find(|r| r.family == family && r.version == version && r.constant == *constant)
        .map(|r| r.role)
}

/// Role granted by ownership-style events.
pub fn ownership_role() -> ProjectRoleKind {
    ProjectRoleKind::Owner
}
