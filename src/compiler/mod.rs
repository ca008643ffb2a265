// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Event-to-changeset compiler.
//!
//! Given one decoded event and read-only ports, derives the ordered list of
//! storage mutations the event implies. The compiler never writes anything.
//!
//! # Determinism Guarantees
//! - No clocks, no randomness, no state kept between calls
//! - Output depends only on the event and on what the ports return
//! - Same event + same read snapshot => identical changesets
//!
//! # Preconditions
//! Events of a chain arrive in `(block_number, log_index)` order and the
//! previous event's changesets are committed before the next compile. Handlers
//! that read indexed state (e.g. `MatchAmountUpdated`) depend on this.
//!
//! # Failure
//! Any port failure or malformed param aborts the event with a
//! `CompileError`; no partial list is returned. Unknown role constants,
//! unknown contracts and unrouted events yield an empty list.

mod access;
mod program;
mod registry;
mod round;

use tracing::{debug, trace};

use crate::changeset::Changeset;
use crate::error::{CompileError, CompileErrorKind, Result};
use crate::event::{ContractFamily, ContractName, ContractVersion, EventRecord};
use crate::ports::{ChainReader, ContentFetcher, EntityLookup, Ports, PriceFeed};
use crate::types::address::Address;
use crate::types::value::{MetaPtr, TokenAmount};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VersionMatch {
    Any,
    Only(ContractVersion),
}

impl VersionMatch {
    fn matches(&self, version: ContractVersion) -> bool {
        match self {
            VersionMatch::Any => true,
            VersionMatch::Only(v) => *v == version,
        }
    }
}

/// Round time window touched by a `*TimeUpdated` event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeWindow {
    ApplicationsStart,
    ApplicationsEnd,
    DonationsStart,
    DonationsEnd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handler {
    ProjectCreated,
    ProjectMetadataUpdated,
    ProjectOwnerAdded,
    ProjectOwnerRemoved,
    ProgramCreated,
    ProgramMetaPtrUpdated,
    RoleGranted,
    RoleRevoked,
    RoundCreated,
    MatchAmountUpdated,
    RoundMetaPtrUpdated,
    ApplicationMetaPtrUpdated,
    TimeUpdated(TimeWindow),
}

#[derive(Clone, Copy, Debug)]
pub struct Route {
    pub family: ContractFamily,
    pub version: VersionMatch,
    pub event_name: &'static str,
    pub handler: Handler,
}

const fn route(family: ContractFamily, version: VersionMatch, event_name: &'static str, handler: Handler) -> Route {
    Route { family, version, event_name, handler }
}

use crate::event::ContractFamily::{ProgramFactory, ProgramImplementation, ProjectRegistry, RoundFactory, RoundImplementation};
use self::VersionMatch::{Any, Only};

/// Dispatch table. Versions that behave alike share a row through `Any`;
/// role-constant differences live in `roles::ROLE_TABLE`, not here.
pub static ROUTES: &[Route] = &[
    route(ProjectRegistry, Any, "ProjectCreated", Handler::ProjectCreated),
    route(ProjectRegistry, Any, "MetadataUpdated", Handler::ProjectMetadataUpdated),
    route(ProjectRegistry, Any, "OwnerAdded", Handler::ProjectOwnerAdded),
    route(ProjectRegistry, Any, "OwnerRemoved", Handler::ProjectOwnerRemoved),
    route(ProgramFactory, Any, "ProgramCreated", Handler::ProgramCreated),
    route(ProgramImplementation, Any, "RoleGranted", Handler::RoleGranted),
    route(ProgramImplementation, Any, "RoleRevoked", Handler::RoleRevoked),
    route(ProgramImplementation, Any, "MetaPtrUpdated", Handler::ProgramMetaPtrUpdated),
    route(RoundFactory, Any, "RoundCreated", Handler::RoundCreated),
    route(RoundImplementation, Any, "RoleGranted", Handler::RoleGranted),
    route(RoundImplementation, Any, "RoleRevoked", Handler::RoleRevoked),
    route(RoundImplementation, Only(ContractVersion::V2), "MatchAmountUpdated", Handler::MatchAmountUpdated),
    route(RoundImplementation, Any, "RoundMetaPtrUpdated", Handler::RoundMetaPtrUpdated),
    route(RoundImplementation, Any, "ApplicationMetaPtrUpdated", Handler::ApplicationMetaPtrUpdated),
    route(RoundImplementation, Any, "ApplicationsStartTimeUpdated", Handler::TimeUpdated(TimeWindow::ApplicationsStart)),
    route(RoundImplementation, Any, "ApplicationsEndTimeUpdated", Handler::TimeUpdated(TimeWindow::ApplicationsEnd)),
    route(RoundImplementation, Any, "RoundStartTimeUpdated", Handler::TimeUpdated(TimeWindow::DonationsStart)),
    route(RoundImplementation, Any, "RoundEndTimeUpdated", Handler::TimeUpdated(TimeWindow::DonationsEnd)),
];

pub fn find_route(contract: ContractName, event_name: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|r| {
        r.family == contract.family && r.version.matches(contract.version) && r.event_name == event_name
    })
}

pub struct Compiler<'a, C, F, L, P> {
    ports: Ports<'a, C, F, L, P>,
}

impl<'a, C, F, L, P> Compiler<'a, C, F, L, P>
where
    C: ChainReader,
    F: ContentFetcher,
    L: EntityLookup,
    P: PriceFeed,
{
    pub fn new(ports: Ports<'a, C, F, L, P>) -> Self {
        Self { ports }
    }

    /// Compiles one event into its ordered changesets.
    pub async fn compile(&self, event: &EventRecord) -> core::result::Result<Vec<Changeset>, CompileError> {
        let Some(contract) = event.contract() else {
            trace!(contract = %event.contract_name, "Ignoring event from unrecognised contract");
            return Ok(Vec::new());
        };
        let Some(route) = find_route(contract, &event.event_name) else {
            trace!(contract = %event.contract_name, event = %event.event_name, "No handler for event");
            return Ok(Vec::new());
        };

        let changesets = self.dispatch(route.handler, contract, event).await.map_err(|kind| CompileError {
            chain_id: event.chain_id,
            event_name: event.event_name.clone(),
            block_number: event.block_number,
            kind,
        })?;

        debug!(
            chain_id = %event.chain_id,
            block = event.block_number,
            log_index = event.log_index,
            event = %event.event_name,
            changesets = changesets.len(),
            "Compiled event"
        );
        Ok(changesets)
    }

    async fn dispatch(&self, handler: Handler, contract: ContractName, event: &EventRecord) -> Result<Vec<Changeset>> {
        match handler {
            Handler::ProjectCreated => self.project_created(event),
            Handler::ProjectMetadataUpdated => self.project_metadata_updated(event).await,
            Handler::ProjectOwnerAdded => self.project_owner_added(event),
            Handler::ProjectOwnerRemoved => self.project_owner_removed(event),
            Handler::ProgramCreated => self.program_created(event).await,
            Handler::ProgramMetaPtrUpdated => self.program_meta_ptr_updated(event).await,
            Handler::RoleGranted => self.role_granted(contract, event),
            Handler::RoleRevoked => self.role_revoked(contract, event),
            Handler::RoundCreated => self.round_created(event).await,
            Handler::MatchAmountUpdated => self.match_amount_updated(event).await,
            Handler::RoundMetaPtrUpdated => self.round_meta_ptr_updated(event).await,
            Handler::ApplicationMetaPtrUpdated => self.application_meta_ptr_updated(event).await,
            Handler::TimeUpdated(window) => self.time_updated(window, event),
        }
    }

    // --- Shared read helpers ---

    async fn read(&self, address: Address, function: &'static str) -> Result<Value> {
        self.ports
            .chain
            .read_contract(address, function, &[])
            .await
            .map_err(|e| CompileErrorKind::read(address, function, e))
    }

    async fn read_meta_ptr(&self, address: Address, function: &'static str) -> Result<MetaPtr> {
        let value = self.read(address, function).await?;
        MetaPtr::decode(&value).map_err(|e| CompileErrorKind::read_shape(address, function, e))
    }

    /// Empty pointers are not fetched.
    async fn fetch_metadata(&self, ptr: &MetaPtr) -> Result<Option<Value>> {
        if ptr.is_empty() {
            return Ok(None);
        }
        self.ports
            .content
            .fetch_content(&ptr.pointer)
            .await
            .map(Some)
            .map_err(|e| CompileErrorKind::fetch(&ptr.pointer, e))
    }

    /// A zero amount is worth zero without consulting the price feed.
    async fn to_usd(&self, event: &EventRecord, token: Address, amount: TokenAmount) -> Result<f64> {
        if amount.is_zero() {
            return Ok(0.0);
        }
        self.ports
            .prices
            .convert_to_usd(event.chain_id, token, amount, event.block_number)
            .await
            .map_err(CompileErrorKind::PriceConversionFailure)
    }
}

/// String field of fetched metadata, if present.
fn metadata_str(metadata: &Option<Value>, key: &str) -> Option<String> {
    metadata.as_ref()?.get(key)?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_are_unambiguous() {
        for (i, a) in ROUTES.iter().enumerate() {
            for b in &ROUTES[i + 1..] {
                let overlap = a.family == b.family
                    && a.event_name == b.event_name
                    && [ContractVersion::V1, ContractVersion::V2]
                        .iter()
                        .any(|v| a.version.matches(*v) && b.version.matches(*v));
                assert!(!overlap, "duplicate route for {:?}/{}", a.family, a.event_name);
            }
        }
    }

    #[test]
    fn test_match_amount_route_is_v2_only() {
        let v1 = ContractName { family: RoundImplementation, version: ContractVersion::V1 };
        let v2 = ContractName { family: RoundImplementation, version: ContractVersion::V2 };
        assert!(find_route(v1, "MatchAmountUpdated").is_none());
        assert_eq!(find_route(v2, "MatchAmountUpdated").map(|r| r.handler), Some(Handler::MatchAmountUpdated));
    }

    #[test]
    fn test_role_events_share_handler_across_families() {
        let program = ContractName { family: ProgramImplementation, version: ContractVersion::V1 };
        let round = ContractName { family: RoundImplementation, version: ContractVersion::V2 };
        assert_eq!(find_route(program, "RoleGranted").map(|r| r.handler), Some(Handler::RoleGranted));
        assert_eq!(find_route(round, "RoleGranted").map(|r| r.handler), Some(Handler::RoleGranted));
        assert!(find_route(round, "OwnerAdded").is_none());
    }
}
