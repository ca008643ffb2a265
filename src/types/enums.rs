// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Semantic role enums.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Role of an address on a project or program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ProjectRoleKind {
    Owner = 0,
    Member = 1,
}

impl ProjectRoleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRoleKind::Owner => "owner",
            ProjectRoleKind::Member => "member",
        }
    }
}

impl fmt::Display for ProjectRoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of an address on a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum RoundRoleKind {
    Admin = 0,
    Manager = 1,
}

impl RoundRoleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundRoleKind::Admin => "admin",
            RoundRoleKind::Manager => "manager",
        }
    }
}

impl fmt::Display for RoundRoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
