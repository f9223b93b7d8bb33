use super::*;
use async_trait::async_trait;
use futures::StreamExt;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const BASE58_ALPHABET: &[u8; 58] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

fn cipher() -> Arc<dyn SymmetricCipher> {
    Arc::new(XorKeystreamCipher::from_master_secret(Some("test-master-secret")))
}

fn fast_settings() -> MinerSettings {
    MinerSettings {
        batch_size: 64,
        progress_interval: Duration::from_millis(50),
        channel_capacity: 1024,
    }
}

fn miner_with(store: Arc<MemoryKeypairStore>) -> VanityMiner {
    VanityMiner::new(store.clone(), store, cipher()).with_settings(fast_settings())
}

async fn collect(stream: MiningStream) -> Vec<MiningEvent> {
    tokio::time::timeout(Duration::from_secs(30), stream.collect::<Vec<_>>())
        .await
        .expect("mining run did not terminate")
}

fn request(suffix: &str, target_count: u32, max_duration_ms: u64) -> MiningRequest {
    MiningRequest {
        suffix: suffix.to_string(),
        target_count,
        max_duration: Duration::from_millis(max_duration_ms),
    }
}

fn terminal_count(events: &[MiningEvent]) -> usize {
    events.iter().filter(|e| e.is_terminal()).count()
}

/// Stats provider that counts reads and can be told to fail
#[derive(Default)]
struct FlakyStats {
    inner: MemoryKeypairStore,
    fail: bool,
    reads: AtomicUsize,
}

#[async_trait]
impl PoolStatsProvider for FlakyStats {
    async fn pool_stats(&self, suffix: &str) -> Result<PoolStats, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        self.inner.pool_stats(suffix).await
    }

    async fn pool_breakdown(&self) -> Result<PoolBreakdown, StoreError> {
        self.inner.pool_breakdown().await
    }
}

/// Sink that rejects every write
struct FailingSink;

#[async_trait]
impl KeypairSink for FailingSink {
    async fn save_keypair(&self, _keypair: &NewVanityKeypair) -> Result<(), StoreError> {
        Err(StoreError::Backend("disk full".to_string()))
    }
}

#[tokio::test]
async fn test_already_satisfied_pool_short_circuits() {
    let store = Arc::new(MemoryKeypairStore::new());
    for i in 0..3 {
        store
            .save_keypair(&NewVanityKeypair {
                suffix: "pump".to_string(),
                public_key: format!("Key{}pump", i),
                secret_key_encrypted: String::new(),
            })
            .await
            .unwrap();
    }

    let events = collect(miner_with(store).start(request("PUMP", 2, 5_000)).unwrap()).await;

    assert_eq!(events.len(), 1);
    match &events[0] {
        MiningEvent::Complete(summary) => {
            assert_eq!(summary.attempts, 0);
            assert_eq!(summary.found, 0);
            assert_eq!(summary.pool_size, 3);
            assert_eq!(summary.breakdown["pump"].available, 3);
        }
        other => panic!("expected complete, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stats_failure_emits_single_error() {
    let stats = Arc::new(FlakyStats {
        fail: true,
        ..FlakyStats::default()
    });
    let sink = Arc::new(MemoryKeypairStore::new());
    let miner = VanityMiner::new(stats, sink.clone(), cipher()).with_settings(fast_settings());

    let events = collect(miner.start(request("abc", 1, 5_000)).unwrap()).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], MiningEvent::Error { message, .. } if message.contains("connection refused")));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_impossible_suffix_terminates_within_budget() {
    let store = Arc::new(MemoryKeypairStore::new());
    let miner = miner_with(store.clone());

    let started = Instant::now();
    let events = collect(miner.start(request("abcdefghijkmnopqrstu", 1, 200)).unwrap()).await;
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_millis(200 + 1_500),
        "run overshot its budget: {:?}",
        elapsed
    );
    assert_eq!(terminal_count(&events), 1);
    assert!(matches!(events.first(), Some(MiningEvent::Start { .. })));
    match events.last() {
        Some(MiningEvent::Complete(summary)) => {
            assert_eq!(summary.found, 0);
            assert!(summary.addresses.is_empty());
            assert!(summary.duration_ms >= 200);
        }
        other => panic!("expected complete, got {:?}", other),
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_found_keys_are_persisted_and_reported_in_order() {
    let store = Arc::new(MemoryKeypairStore::new());
    let miner = miner_with(store.clone());
    let mut stream = miner.start(request("A", 1_000, 1_500)).unwrap();

    let mut found = Vec::new();
    let mut last_attempts = 0u64;
    let mut last_progress_elapsed = 0u64;
    let mut summary = None;

    while let Some(event) = stream.next().await {
        match event {
            MiningEvent::Found { address, attempts, found: count, .. } => {
                // Saved before it was reported
                assert!(store.contains(&address));
                assert!(address.to_lowercase().ends_with('a'));
                assert!(attempts >= last_attempts);
                last_attempts = attempts;
                found.push(address);
                assert_eq!(count as usize, found.len());
            }
            MiningEvent::Progress { elapsed_ms, percent, .. } => {
                assert!(elapsed_ms >= last_progress_elapsed);
                assert!((0.0..=100.0).contains(&percent));
                last_progress_elapsed = elapsed_ms;
            }
            MiningEvent::Complete(complete) => summary = Some(complete),
            MiningEvent::Start { suffix, .. } => assert_eq!(suffix, "a"),
            MiningEvent::Error { message, .. } => panic!("unexpected error: {}", message),
        }
    }

    let summary = summary.expect("run must complete");
    assert!(!found.is_empty(), "a one-character suffix should hit within 1.5s");
    assert_eq!(summary.addresses, found);
    assert_eq!(summary.found as usize, found.len());
    assert!(summary.attempts >= last_attempts);
    assert_eq!(summary.pool_size as usize, found.len());

    let cipher = XorKeystreamCipher::from_master_secret(Some("test-master-secret"));
    for record in store.records() {
        let keypair = cipher.open(&record.secret_key_encrypted).unwrap();
        assert_eq!(keypair.len(), 64);
        let public_key = bs58::decode(&record.public_key).into_vec().unwrap();
        assert_eq!(&keypair[32..], public_key.as_slice());
    }
}

#[tokio::test]
async fn test_save_failures_do_not_stop_the_run() {
    let stats = Arc::new(MemoryKeypairStore::new());
    let miner = VanityMiner::new(stats, Arc::new(FailingSink), cipher()).with_settings(fast_settings());

    let events = collect(miner.start(request("b", 1_000, 800)).unwrap()).await;

    let reported: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            MiningEvent::Found { address, .. } => Some(address.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(terminal_count(&events), 1);
    match events.last() {
        Some(MiningEvent::Complete(summary)) => {
            assert_eq!(summary.addresses, reported);
            assert_eq!(summary.pool_size, 0);
        }
        other => panic!("expected complete, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dropping_stream_stops_run() {
    let stats = Arc::new(FlakyStats::default());
    let sink = Arc::new(MemoryKeypairStore::new());
    let settings = MinerSettings {
        batch_size: 32,
        progress_interval: Duration::ZERO,
        channel_capacity: 1,
    };
    let miner = VanityMiner::new(stats.clone(), sink, cipher()).with_settings(settings);

    let mut stream = miner.start(request("abcdefghijkmnopqrstu", 1, 400)).unwrap();
    assert!(matches!(stream.next().await, Some(MiningEvent::Start { .. })));
    drop(stream);

    tokio::time::sleep(Duration::from_millis(800)).await;
    // The closing stats refresh never ran
    assert_eq!(stats.reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalid_requests_rejected_before_start() {
    let miner = miner_with(Arc::new(MemoryKeypairStore::new()));

    assert!(matches!(
        miner.start(request("no-dash", 1, 100)),
        Err(MinerError::InvalidSuffix { .. })
    ));
    assert!(matches!(
        miner.start(request("abc", 0, 100)),
        Err(MinerError::InvalidRequest(_))
    ));
    assert!(matches!(
        miner.start(request("abc", 1, 0)),
        Err(MinerError::InvalidRequest(_))
    ));
}

#[tokio::test]
async fn test_oversized_budget_rejected() {
    let miner = miner_with(Arc::new(MemoryKeypairStore::new()));

    let result = miner.start(MiningRequest {
        suffix: "abcdefghijkmnopqrstu".to_string(),
        target_count: 1,
        max_duration: Duration::MAX,
    });
    assert!(matches!(result, Err(MinerError::InvalidRequest(_))));

    let result = miner.start(MiningRequest {
        suffix: "abc".to_string(),
        target_count: 1,
        max_duration: MAX_RUN_DURATION + Duration::from_millis(1),
    });
    assert!(matches!(result, Err(MinerError::InvalidRequest(_))));
}

#[tokio::test]
async fn test_longest_budget_starts_cleanly() {
    let miner = miner_with(Arc::new(MemoryKeypairStore::new()));
    let mut stream = miner
        .start(MiningRequest {
            suffix: "abcdefghijkmnopqrstu".to_string(),
            target_count: 1,
            max_duration: MAX_RUN_DURATION,
        })
        .unwrap();

    match tokio::time::timeout(Duration::from_secs(10), stream.next()).await {
        Ok(Some(MiningEvent::Start { max_duration_ms, .. })) => {
            assert_eq!(max_duration_ms, MAX_RUN_DURATION.as_millis() as u64);
        }
        other => panic!("expected start, got {:?}", other),
    }
    // Keeps running past the first batches instead of dying on the deadline
    let next = tokio::time::timeout(Duration::from_secs(10), stream.next()).await;
    assert!(matches!(next, Ok(Some(MiningEvent::Progress { .. }))));
}

#[test]
fn test_benchmark_reports_rate() {
    let rate = benchmark(Duration::from_millis(50)).unwrap();
    assert!(rate > 0);
}

fn suffix_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec((0usize..58, any::<bool>()), 1..=5).prop_map(|chars| {
        chars
            .into_iter()
            .map(|(i, upper)| {
                let c = BASE58_ALPHABET[i] as char;
                if upper {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_suffix_match_agrees_with_lowercase_ends_with(
        key in prop::array::uniform32(any::<u8>()),
        raw_suffix in suffix_strategy(),
    ) {
        let address = bs58::encode(key).into_string();
        let suffix = Suffix::parse(&raw_suffix).unwrap();
        let expected = address.to_lowercase().ends_with(&raw_suffix.to_lowercase());
        prop_assert_eq!(suffix.matches(address.as_bytes()), expected);
    }

    #[test]
    fn prop_address_tail_always_matches(
        key in prop::array::uniform32(any::<u8>()),
        len in 1usize..=5,
        flip in any::<bool>(),
    ) {
        let address = bs58::encode(key).into_string();
        let tail = &address[address.len() - len..];
        let tail = if flip { tail.to_ascii_uppercase() } else { tail.to_ascii_lowercase() };
        let suffix = Suffix::parse(&tail).unwrap();
        prop_assert!(suffix.matches(address.as_bytes()));
        prop_assert!(address.to_lowercase().ends_with(suffix.as_str()));
    }
}
