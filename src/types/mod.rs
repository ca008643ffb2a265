// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod address;
pub mod entities;
pub mod enums;
pub mod id;
pub mod value;

pub use address::Address;
pub use entities::{Project, ProjectRole, Round, RoundRole};
pub use enums::{ProjectRoleKind, RoundRoleKind};
pub use id::{ChainId, ProjectId, RoleConstant};
pub use value::{MetaPtr, TokenAmount, Uint256};
