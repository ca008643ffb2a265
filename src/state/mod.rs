// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod store;

pub use store::IndexState;
