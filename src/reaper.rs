//! Background sweep that evicts stale admission records.
//!
//! The reaper never touches admission logic: it only removes records whose
//! window boundary plus the grace period has passed. A key reappearing after
//! eviction is treated as brand new, which is correct because the key was
//! inactive past its grace window anyway.

use std::{
    sync::{
        Arc,
        mpsc::{self, RecvTimeoutError},
    },
    thread,
    time::Duration,
};

use tracing::warn;

use crate::AdmissionEngine;

/// Owns the sweep thread and the channel used to stop it.
///
/// The thread parks on `recv_timeout`, so stopping is prompt: a send (or the
/// sender being dropped) wakes it immediately instead of waiting out the
/// interval.
pub(crate) struct ReaperHandle {
    stop_tx: mpsc::Sender<()>,
    join: thread::JoinHandle<()>,
}

impl ReaperHandle {
    /// Start the sweep loop. The first pass runs immediately; subsequent
    /// passes run once per `interval_ms`.
    pub fn spawn(engine: Arc<AdmissionEngine>, grace_period_ms: u64, interval_ms: u64) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let join = thread::spawn(move || {
            loop {
                let evicted = engine.reap_stale(grace_period_ms);

                if evicted > 0 {
                    warn!(
                        evicted,
                        tracked = engine.size(),
                        "reaper evicted stale admission records"
                    );
                }

                match stop_rx.recv_timeout(Duration::from_millis(interval_ms)) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Self { stop_tx, join }
    } // end method spawn

    /// Signal the loop and wait for the thread to exit.
    pub fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.join.join();
    }
}
