// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Configuration constants.

/// Protocol prefix recognised in `contractName`.
pub const PROTOCOL_ALLO_V1: &str = "AlloV1";

/// Tag carried by every entity indexed from Allo V1 contracts.
pub const TAG_ALLO_V1: &str = "allo-v1";

/// Extra tag distinguishing program pseudo-projects.
pub const TAG_PROGRAM: &str = "program";

/// Contract getters read when a program or round is created.
pub mod functions {
    pub const PROGRAM_META_PTR: &str = "metaPtr";
    pub const MATCH_AMOUNT: &str = "matchAmount";
    pub const ROUND_META_PTR: &str = "roundMetaPtr";
    pub const APPLICATION_META_PTR: &str = "applicationMetaPtr";
    pub const TOKEN: &str = "token";
}
