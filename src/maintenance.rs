// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 vfpga-link contributors
//
// The background thread that alternates sender and receiver stanzas
// indefinitely (spec.md §4.5). Owns the L1Transport outright — it's the
// sole reader and sole writer of the byte stream (spec.md §5), so no lock
// is needed on L1 itself. Cancellation is cooperative: a flag polled
// between iterations, then a join.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::fatal;
use crate::l1::L1Transport;
use crate::queue::Queue;

const IDLE_SLEEP_FLOOR: Duration = Duration::from_millis(1);
const IDLE_SLEEP_CEILING: Duration = Duration::from_millis(20);

pub struct Handle {
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl Handle {
    /// Request termination and wait for the thread to exit. In-flight L1
    /// writes that have started are allowed to complete; frames not yet
    /// begun are simply never sent (spec.md §5).
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawn the maintenance thread. `h2f`/`f2h` are shared with the
/// application via `Engine`; `l1` is moved in and never touched again from
/// outside this thread.
pub fn spawn(h2f: Arc<Vec<Queue>>, f2h: Arc<Vec<Queue>>, mut l1: Box<dyn L1Transport>) -> Handle {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_for_thread = Arc::clone(&stop);

    let join = std::thread::Builder::new()
        .name("vfpga-l2-maint".into())
        .spawn(move || {
            let mut backoff = IDLE_SLEEP_FLOOR;
            while !stop_for_thread.load(Ordering::Acquire) {
                let sent = crate::sender::send_h2f(&h2f, &f2h, l1.as_mut())
                    .unwrap_or_else(|e| fatal!("l1 send error: {e}"));
                let received = crate::receiver::recv_f2h(&h2f, &f2h, l1.as_mut())
                    .unwrap_or_else(|e| fatal!("l1 recv error: {e}"));

                if sent || received {
                    backoff = IDLE_SLEEP_FLOOR;
                } else {
                    std::thread::sleep(backoff);
                    backoff = (backoff * 2).min(IDLE_SLEEP_CEILING);
                }
            }
            let _ = l1.finish();
        })
        .expect("failed to spawn maintenance thread");

    Handle { stop, join: Some(join) }
}
