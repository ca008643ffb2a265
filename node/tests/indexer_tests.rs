// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use indexer_kernel::changeset::Changeset;
use indexer_kernel::event::EventPosition;
use indexer_kernel::types::address::Address;
use indexer_kernel::types::id::ChainId;
use indexer_kernel::{CompileErrorKind, EventRecord};
use indexer_node::chain::RecordedChainReader;
use indexer_node::config::TokenPrice;
use indexer_node::content::RecordedContent;
use indexer_node::engine::{Indexer, Outcome};
use indexer_node::errors::NodeError;
use indexer_node::prices::StaticPriceFeed;
use serde_json::{json, Value};

const REGISTRY: &str = "0x00000000000000000000000000000000000000aa";
const PROGRAM: &str = "0x0000000000000000000000000000000000000050";
const ROUND: &str = "0x0000000000000000000000000000000000000060";
const TOKEN: &str = "0x0000000000000000000000000000000000000099";

type TestIndexer = Indexer<RecordedChainReader, RecordedContent, StaticPriceFeed>;

fn event(chain: u64, contract: &str, name: &str, address: &str, block: u64, log_index: u32, params: Value) -> EventRecord {
    serde_json::from_value(json!({
        "chainId": chain,
        "contractName": contract,
        "eventName": name,
        "address": address,
        "blockNumber": block,
        "logIndex": log_index,
        "transactionHash": format!("0x{:064x}", block),
        "params": params,
    }))
    .unwrap()
}

fn project_created(chain: u64, block: u64, number: u64) -> EventRecord {
    event(
        chain,
        "AlloV1/ProjectRegistry/V1",
        "ProjectCreated",
        REGISTRY,
        block,
        0,
        json!({"projectID": number, "owner": "0x0000000000000000000000000000000000000002"}),
    )
}

fn indexer() -> TestIndexer {
    let calls = RecordedChainReader::from_json(
        &json!({
            ROUND: {
                "matchAmount": "5000000000000000000",
                "roundMetaPtr": [1, "round-cid"],
                "applicationMetaPtr": [1, "app-cid"],
                "token": TOKEN,
            }
        })
        .to_string(),
    )
    .unwrap();

    let content = RecordedContent::from_json(
        &json!({"round-cid": {"name": "Round"}, "app-cid": {"questions": []}}).to_string(),
    )
    .unwrap();

    let prices = StaticPriceFeed::new(&[TokenPrice {
        chain_id: ChainId(10),
        token: TOKEN.parse().unwrap(),
        decimals: 18,
        usd_price: 2.0,
    }]);

    Indexer::new(calls, content, prices)
}

#[tokio::test]
async fn test_applies_in_order_and_advances_cursor() {
    let mut idx = indexer();
    let out = idx.process(&project_created(10, 5, 1)).await.unwrap();

    match out {
        Outcome::Applied(batch) => {
            assert_eq!(batch.len(), 2);
            assert!(matches!(batch[0], Changeset::InsertProject { .. }));
        }
        other => panic!("expected Applied, got {:?}", other),
    }
    assert_eq!(idx.cursor(ChainId(10)), Some(EventPosition { block_number: 5, log_index: 0 }));
    assert_eq!(idx.state().project_count(), 1);
}

#[tokio::test]
async fn test_replay_is_compared_not_reapplied() {
    let mut idx = indexer();
    let e = project_created(10, 5, 1);
    idx.process(&e).await.unwrap();
    idx.process(&project_created(10, 6, 2)).await.unwrap();
    let before = idx.state().clone();

    let out = idx.process(&e).await.unwrap();

    assert_eq!(out, Outcome::Replayed { diverged: false });
    // Without the guard the owner grant would be appended a second time.
    assert_eq!(idx.state(), &before);
    assert_eq!(idx.cursor(ChainId(10)).map(|c| c.block_number), Some(6));
}

#[tokio::test]
async fn test_unseen_event_behind_cursor_is_rejected() {
    let mut idx = indexer();
    idx.process(&project_created(10, 9, 1)).await.unwrap();

    let err = idx.process(&project_created(10, 3, 2)).await.unwrap_err();
    assert!(matches!(err, NodeError::OutOfOrder { chain_id: ChainId(10), .. }));
    assert_eq!(idx.state().project_count(), 1);
}

#[tokio::test]
async fn test_replay_window_bounds_retained_digests() {
    let mut idx = indexer().with_replay_window(3);
    for block in 1..=10 {
        idx.process(&project_created(10, block, block)).await.unwrap();
    }
    assert_eq!(idx.retained_digests(ChainId(10)), 3);

    let out = idx.process(&project_created(10, 8, 8)).await.unwrap();
    assert_eq!(out, Outcome::Replayed { diverged: false });

    let err = idx.process(&project_created(10, 7, 7)).await.unwrap_err();
    assert!(matches!(
        err,
        NodeError::BeyondReplayWindow { oldest: EventPosition { block_number: 8, log_index: 0 }, .. }
    ));
    assert_eq!(idx.state().project_count(), 10);
}

#[tokio::test]
async fn test_chains_have_independent_cursors() {
    let mut idx = indexer();
    idx.process(&project_created(10, 100, 1)).await.unwrap();

    let out = idx.process(&project_created(1, 3, 1)).await.unwrap();
    assert!(matches!(out, Outcome::Applied(_)));
    assert_eq!(idx.state().project_count(), 2);
}

#[tokio::test]
async fn test_failed_compile_leaves_cursor_untouched() {
    let mut idx = indexer();
    idx.process(&project_created(10, 5, 1)).await.unwrap();

    let missing_content = event(
        10,
        "AlloV1/ProjectRegistry/V1",
        "MetadataUpdated",
        REGISTRY,
        6,
        0,
        json!({"projectID": 1, "metaPtr": {"protocol": 1, "pointer": "not-recorded"}}),
    );
    let err = idx.process(&missing_content).await.unwrap_err();

    match err {
        NodeError::Compile(e) => assert!(matches!(e.kind, CompileErrorKind::ContentFetchFailure { .. })),
        other => panic!("expected compile error, got {:?}", other),
    }
    assert_eq!(idx.cursor(ChainId(10)).map(|c| c.block_number), Some(5));
}

#[tokio::test]
async fn test_round_created_with_recorded_ports() {
    let mut idx = indexer();
    let created = event(
        10,
        "AlloV1/RoundFactory/V1",
        "RoundCreated",
        "0x0000000000000000000000000000000000000070",
        20,
        3,
        json!({"roundAddress": ROUND, "ownedBy": PROGRAM, "roundImplementation": "0x0000000000000000000000000000000000000071"}),
    );
    idx.process(&created).await.unwrap();

    let round_addr: Address = ROUND.parse().unwrap();
    let round = idx.state().round(ChainId(10), round_addr).unwrap();
    assert_eq!(round.match_amount.0, 5_000_000_000_000_000_000);
    assert!((round.match_amount_in_usd - 10.0).abs() < 1e-9);
    assert_eq!(round.round_metadata_cid, "round-cid");
    assert_eq!(round.round_metadata, Some(json!({"name": "Round"})));
    assert_eq!(round.project_id.as_str(), PROGRAM);
    assert_eq!(round.created_at_block, 20);
}

#[tokio::test]
async fn test_missing_price_aborts_round_created() {
    let mut idx = indexer();
    // Same round, but on a chain with no configured price.
    let created = event(
        1,
        "AlloV1/RoundFactory/V1",
        "RoundCreated",
        "0x0000000000000000000000000000000000000070",
        20,
        0,
        json!({"roundAddress": ROUND, "ownedBy": PROGRAM, "roundImplementation": "0x0000000000000000000000000000000000000071"}),
    );

    let err = idx.process(&created).await.unwrap_err();
    match err {
        NodeError::Compile(e) => assert!(matches!(e.kind, CompileErrorKind::PriceConversionFailure(_))),
        other => panic!("expected compile error, got {:?}", other),
    }
    assert_eq!(idx.state().round_count(), 0);
    assert_eq!(idx.cursor(ChainId(1)), None);
}
