// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod config;
pub mod errors;
pub mod telemetry;
pub mod chain;
pub mod content;
pub mod ipfs;
pub mod prices;
pub mod engine;
