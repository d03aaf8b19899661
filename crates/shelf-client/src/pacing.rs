// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimum-interval gates for sources with strict pacing requirements.
//!
//! Each rate-limited plugin gets one [`RateGate`] holding its last-call
//! timestamp. Callers queue on the gate's mutex, so concurrent requests to
//! the same source are spaced out rather than rejected. Gates for different
//! plugins are independent.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Spaces out call admissions for one plugin.
#[derive(Debug)]
pub struct RateGate {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until at least `min_interval` has passed since the previous admission.
    ///
    /// The lock is held while sleeping so waiters are admitted one at a time
    /// in arrival order. Dropping the future while it waits releases the
    /// lock without recording a call.
    pub async fn wait_turn(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.min_interval;
            if ready_at > Instant::now() {
                debug!(
                    wait_ms = (ready_at - Instant::now()).as_millis() as u64,
                    "pacing outbound call"
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Gates keyed by plugin id, shared by everything that calls out.
#[derive(Debug, Default)]
pub struct PacingTable {
    gates: DashMap<String, Arc<RateGate>>,
}

impl PacingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a gate for `plugin_id`. A zero interval removes pacing.
    pub fn configure(&self, plugin_id: &str, min_interval: Duration) {
        if min_interval.is_zero() {
            self.gates.remove(plugin_id);
        } else {
            self.gates
                .insert(plugin_id.to_string(), Arc::new(RateGate::new(min_interval)));
        }
    }

    /// The gate for `plugin_id`, if the plugin is paced.
    pub fn gate(&self, plugin_id: &str) -> Option<Arc<RateGate>> {
        self.gates.get(plugin_id).map(|g| Arc::clone(g.value()))
    }

    /// Wait for the plugin's turn; returns immediately for unpaced plugins.
    pub async fn wait_turn(&self, plugin_id: &str) {
        if let Some(gate) = self.gate(plugin_id) {
            gate.wait_turn().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_call_is_admitted_immediately() {
        let gate = RateGate::new(Duration::from_secs(5));
        let start = Instant::now();
        gate.wait_turn().await;
        assert!(start.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn second_call_waits_for_interval() {
        let gate = RateGate::new(Duration::from_secs(5));
        let start = Instant::now();
        gate.wait_turn().await;
        gate.wait_turn().await;
        assert!(start.elapsed() >= Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_are_paced_not_rejected() {
        let gate = Arc::new(RateGate::new(Duration::from_secs(2)));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..3 {
            let gate = Arc::clone(&gate);
            handles.push(tokio::spawn(async move {
                gate.wait_turn().await;
                Instant::now()
            }));
        }

        let mut admitted = Vec::new();
        for handle in handles {
            admitted.push(handle.await.unwrap());
        }
        admitted.sort();

        assert!(admitted[1] - admitted[0] >= Duration::from_secs(2));
        assert!(admitted[2] - admitted[1] >= Duration::from_secs(2));
        assert!(start.elapsed() >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn different_plugins_do_not_block_each_other() {
        let table = PacingTable::new();
        table.configure("bgg", Duration::from_secs(30));
        table.configure("tmdb", Duration::from_secs(30));

        table.wait_turn("bgg").await;
        let start = Instant::now();
        table.wait_turn("tmdb").await;
        assert!(start.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn unpaced_plugins_have_no_gate() {
        let table = PacingTable::new();
        table.configure("googlebooks", Duration::ZERO);
        assert!(table.gate("googlebooks").is_none());

        let start = Instant::now();
        table.wait_turn("googlebooks").await;
        table.wait_turn("googlebooks").await;
        assert!(start.elapsed() < Duration::from_millis(1));
    }
}
