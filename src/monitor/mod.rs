//! Transaction confirmation monitoring.
//!
//! # Responsibilities
//! - Track submitted transactions until confirmed or timed out
//! - Drive the per-record state machine from a single poll loop
//! - Swallow transient backend failures per record so one bad lookup never
//!   aborts the rest of a tick
//!
//! # Design Decisions
//! - PENDING is the only mutable status; CONFIRMED and FAILED are terminal
//!   and never overwritten
//! - Ticks are serialized: one task runs a tick to completion, then sleeps
//!   the interval, so ticks cannot overlap
//! - The one-hour failure window starts at the first successful lookup that
//!   reported the transaction missing, and resets whenever a lookup finds it

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::cache::TtlCache;
use crate::chain::{Network, NetworkDirectory};

/// Confirmation lifecycle of a tracked transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

/// One tracked transaction, keyed by `network:txid`.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    /// Normalized 64-hex id, no prefix.
    pub txid: String,
    pub network: Network,
    pub status: TxStatus,
    pub confirmations: u32,
    pub block_height: Option<u64>,
    /// Block timestamp, epoch milliseconds.
    pub timestamp: Option<u64>,
    /// Failure detail, set only in the FAILED state.
    pub error: Option<String>,
    /// Last poll that reached the backend for this record, epoch millis.
    pub last_checked: u64,
    /// First successful lookup that came back empty. Drives the timeout.
    #[serde(skip)]
    missing_since: Option<Instant>,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn record_key(network: Network, txid: &str) -> String {
    format!("{network}:{txid}")
}

/// Polls chain backends and advances tracked transactions.
pub struct TransactionMonitor {
    records: TtlCache<TransactionRecord>,
    directory: Arc<NetworkDirectory>,
    poll_interval: Duration,
    pending_timeout: Duration,
}

impl TransactionMonitor {
    /// Create a monitor.
    ///
    /// `record_ttl` bounds how long finished records stay queryable;
    /// `pending_timeout` is the continuous-absence window after which a
    /// pending transaction is declared failed.
    pub fn new(
        directory: Arc<NetworkDirectory>,
        poll_interval: Duration,
        pending_timeout: Duration,
        record_ttl: Duration,
    ) -> Self {
        Self {
            records: TtlCache::new(record_ttl),
            directory,
            poll_interval,
            pending_timeout,
        }
    }

    /// Start tracking a transaction.
    ///
    /// Idempotent per `network:txid`: re-tracking returns the existing
    /// record unchanged, whatever its state. Never resets a record.
    pub fn track_transaction(&self, network: Network, txid: &str) -> TransactionRecord {
        let key = record_key(network, txid);
        self.records.get_or_insert(key, || {
            tracing::info!(network = %network, txid = %txid, "Tracking transaction");
            TransactionRecord {
                txid: txid.to_string(),
                network,
                status: TxStatus::Pending,
                confirmations: 0,
                block_height: None,
                timestamp: None,
                error: None,
                last_checked: now_millis(),
                missing_since: None,
            }
        })
    }

    /// Current state of a tracked transaction, if still retained.
    pub fn status(&self, network: Network, txid: &str) -> Option<TransactionRecord> {
        self.records.get(&record_key(network, txid))
    }

    /// Number of live records.
    pub fn tracked(&self) -> usize {
        self.records.entries().len()
    }

    /// Spawn the poll loop. Ticks run serially until shutdown fires; an
    /// in-flight tick completes before the task exits.
    pub fn start(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        tokio::spawn(async move {
            tracing::info!(
                interval_secs = self.poll_interval.as_secs(),
                "Transaction monitor started"
            );
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(self.poll_interval) => self.poll_cycle().await,
                    _ = shutdown.recv() => {
                        tracing::info!("Transaction monitor stopped");
                        break;
                    }
                }
            }
        });
    }

    /// Run one tick: look up every pending record once.
    pub async fn poll_cycle(&self) {
        let pending: Vec<(String, TransactionRecord)> = self
            .records
            .entries()
            .into_iter()
            .filter(|(_, record)| record.status == TxStatus::Pending)
            .collect();

        for (key, record) in pending {
            self.poll_record(&key, &record).await;
        }
    }

    async fn poll_record(&self, key: &str, record: &TransactionRecord) {
        let backend = match self.directory.backend(record.network) {
            Ok(backend) => backend,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Skipping record without backend");
                return;
            }
        };

        match backend
            .get_raw_transaction_with_confirmations(&record.txid)
            .await
        {
            Ok(Some(tx)) if tx.confirmations >= 1 => {
                let now = now_millis();
                self.records.update(key, |r| {
                    // Terminal states are never overwritten.
                    if r.status != TxStatus::Pending {
                        return;
                    }
                    r.status = TxStatus::Confirmed;
                    r.confirmations = tx.confirmations;
                    r.block_height = tx.block_height;
                    r.timestamp = tx.block_time;
                    r.last_checked = now;
                });
                tracing::info!(
                    txid = %record.txid,
                    network = %record.network,
                    confirmations = tx.confirmations,
                    "Transaction confirmed"
                );
            }
            Ok(Some(_)) => {
                // In the mempool but not yet mined.
                let now = now_millis();
                self.records.update(key, |r| {
                    r.last_checked = now;
                    r.missing_since = None;
                });
            }
            Ok(None) => self.handle_missing(key, record),
            Err(e) => {
                // Transient backend failure: refresh last_checked only.
                let now = now_millis();
                self.records.update(key, |r| r.last_checked = now);
                tracing::warn!(
                    txid = %record.txid,
                    network = %record.network,
                    error = %e,
                    "Transaction lookup failed, will retry next tick"
                );
            }
        }
    }

    fn handle_missing(&self, key: &str, record: &TransactionRecord) {
        let now = now_millis();
        let tick = Instant::now();
        let timed_out = record
            .missing_since
            .is_some_and(|since| tick.duration_since(since) > self.pending_timeout);

        if timed_out {
            let timeout_secs = self.pending_timeout.as_secs();
            self.records.update(key, |r| {
                if r.status != TxStatus::Pending {
                    return;
                }
                r.status = TxStatus::Failed;
                r.error = Some(format!(
                    "Transaction not found after {timeout_secs} seconds; it may have been dropped"
                ));
                r.last_checked = now;
            });
            tracing::warn!(
                txid = %record.txid,
                network = %record.network,
                "Transaction timed out unconfirmed"
            );
        } else {
            self.records.update(key, |r| {
                r.last_checked = now;
                if r.missing_since.is_none() {
                    r.missing_since = Some(tick);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::backend::ChainBackend;
    use crate::chain::types::{
        Balances, BlockRef, ChainError, ChainResult, InvocationResult, RawTransaction,
    };
    use crate::chain::NetworkServices;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Scriptable backend: each lookup pops the next canned answer, the last
    /// one repeating.
    struct ScriptedBackend {
        answers: Mutex<Vec<ChainResult<Option<RawTransaction>>>>,
        lookups: AtomicU32,
    }

    impl ScriptedBackend {
        fn new(answers: Vec<ChainResult<Option<RawTransaction>>>) -> Self {
            let mut answers = answers;
            answers.reverse();
            Self {
                answers: Mutex::new(answers),
                lookups: AtomicU32::new(0),
            }
        }

        fn confirmed(height: u64) -> ChainResult<Option<RawTransaction>> {
            Ok(Some(RawTransaction {
                confirmations: 2,
                block_height: Some(height),
                block_time: Some(1_700_000_000_000),
                payload: json!({}),
            }))
        }
    }

    #[async_trait]
    impl ChainBackend for ScriptedBackend {
        async fn get_block_count(&self) -> ChainResult<u64> {
            Ok(0)
        }
        async fn get_block(&self, _block: &BlockRef) -> ChainResult<Value> {
            Ok(Value::Null)
        }
        async fn get_transaction(&self, _txid: &str) -> ChainResult<Value> {
            Ok(Value::Null)
        }
        async fn get_raw_transaction_with_confirmations(
            &self,
            _txid: &str,
        ) -> ChainResult<Option<RawTransaction>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            let mut answers = self.answers.lock().unwrap();
            if answers.len() > 1 {
                answers.pop().unwrap()
            } else {
                match answers.last() {
                    Some(Ok(tx)) => Ok(tx.clone()),
                    Some(Err(_)) => Err(ChainError::Other("scripted error".into())),
                    None => Ok(None),
                }
            }
        }
        async fn get_balance(&self, _address: &str) -> ChainResult<Balances> {
            Ok(Balances::new())
        }
        async fn invoke_script(
            &self,
            _script: &str,
            _signers: &[Value],
        ) -> ChainResult<InvocationResult> {
            Err(ChainError::Other("not scripted".into()))
        }
        async fn invoke_function(
            &self,
            _script_hash: &str,
            _operation: &str,
            _args: &[Value],
        ) -> ChainResult<InvocationResult> {
            Err(ChainError::Other("not scripted".into()))
        }
        async fn send_raw_transaction(&self, _signed_tx: &str) -> ChainResult<String> {
            Err(ChainError::Other("not scripted".into()))
        }
    }

    fn monitor_with(backend: Arc<ScriptedBackend>) -> TransactionMonitor {
        let mut directory = NetworkDirectory::new(Network::Testnet);
        directory.bind(
            Network::Testnet,
            NetworkServices {
                backend: Some(backend as Arc<dyn ChainBackend>),
                wallet: None,
            },
        );
        TransactionMonitor::new(
            Arc::new(directory),
            Duration::from_secs(15),
            Duration::from_secs(3600),
            Duration::from_secs(86_400),
        )
    }

    const TXID: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    #[tokio::test(start_paused = true)]
    async fn test_track_is_idempotent() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(None)]));
        let monitor = monitor_with(backend);

        let first = monitor.track_transaction(Network::Testnet, TXID);
        let second = monitor.track_transaction(Network::Testnet, TXID);
        assert_eq!(first.status, TxStatus::Pending);
        assert_eq!(second.status, first.status);
        assert_eq!(second.last_checked, first.last_checked);
        assert_eq!(monitor.tracked(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_to_confirmed_is_terminal() {
        let backend = Arc::new(ScriptedBackend::new(vec![ScriptedBackend::confirmed(
            1234,
        )]));
        let monitor = monitor_with(backend.clone());
        monitor.track_transaction(Network::Testnet, TXID);

        monitor.poll_cycle().await;
        let record = monitor.status(Network::Testnet, TXID).unwrap();
        assert_eq!(record.status, TxStatus::Confirmed);
        assert_eq!(record.confirmations, 2);
        assert_eq!(record.block_height, Some(1234));
        assert_eq!(record.timestamp, Some(1_700_000_000_000));

        // Terminal records are skipped by later ticks entirely.
        monitor.poll_cycle().await;
        monitor.poll_cycle().await;
        assert_eq!(backend.lookups.load(Ordering::SeqCst), 1);

        // Re-tracking after confirmation returns the terminal record.
        let again = monitor.track_transaction(Network::Testnet, TXID);
        assert_eq!(again.status, TxStatus::Confirmed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_beyond_window_fails() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(None)]));
        let monitor = monitor_with(backend);
        monitor.track_transaction(Network::Testnet, TXID);

        // First empty lookup starts the absence window.
        monitor.poll_cycle().await;
        assert_eq!(
            monitor.status(Network::Testnet, TXID).unwrap().status,
            TxStatus::Pending
        );

        // Still inside the window.
        tokio::time::advance(Duration::from_secs(1800)).await;
        monitor.poll_cycle().await;
        assert_eq!(
            monitor.status(Network::Testnet, TXID).unwrap().status,
            TxStatus::Pending
        );

        // Beyond it.
        tokio::time::advance(Duration::from_secs(1801)).await;
        monitor.poll_cycle().await;
        let record = monitor.status(Network::Testnet, TXID).unwrap();
        assert_eq!(record.status, TxStatus::Failed);
        assert!(record.error.as_deref().unwrap().contains("not found"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reappearing_tx_resets_absence_window() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok(None),
            // Found in the mempool, unmined.
            Ok(Some(RawTransaction {
                confirmations: 0,
                block_height: None,
                block_time: None,
                payload: json!({}),
            })),
            Ok(None),
        ]));
        let monitor = monitor_with(backend);
        monitor.track_transaction(Network::Testnet, TXID);

        monitor.poll_cycle().await; // missing -> window starts
        tokio::time::advance(Duration::from_secs(3500)).await;
        monitor.poll_cycle().await; // found -> window resets
        tokio::time::advance(Duration::from_secs(3500)).await;
        monitor.poll_cycle().await; // missing again -> new window, not expired

        assert_eq!(
            monitor.status(Network::Testnet, TXID).unwrap().status,
            TxStatus::Pending
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_error_keeps_record_pending() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(ChainError::Timeout(5))]));
        let monitor = monitor_with(backend);
        let before = monitor.track_transaction(Network::Testnet, TXID);

        monitor.poll_cycle().await;
        let after = monitor.status(Network::Testnet, TXID).unwrap();
        assert_eq!(after.status, TxStatus::Pending);
        assert!(after.last_checked >= before.last_checked);
    }
}
