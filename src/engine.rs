// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 vfpga-link contributors
//
// The application-facing API (spec.md §4.2): start, finish, enqueue, pop,
// show_all_queues. `Engine` owns the queue arrays (shared with the
// maintenance thread via `Arc`) and the thread's lifecycle handle; the L1
// transport itself is owned solely by the maintenance thread.

use std::io::Write;
use std::sync::Arc;

use crate::error::{Empty, Full, StartError};
use crate::fatal;
use crate::l1::TcpL1;
use crate::maintenance;
use crate::queue::Queue;
use crate::queue_set::QueueSetConfig;

/// A running L2 engine: queue set, maintenance thread, and the API the
/// application drives it with.
pub struct Engine {
    h2f: Arc<Vec<Queue>>,
    f2h: Arc<Vec<Queue>>,
    maint: maintenance::Handle,
}

impl Engine {
    /// Initialize the queue set from `config`, connect L1 to `host:port`
    /// (retrying per spec.md §6.2), and spawn the maintenance thread.
    /// `host == ""` / `port == 0` select the default endpoint.
    pub fn start(config: QueueSetConfig, host: &str, port: u16) -> Result<Engine, StartError> {
        let (h2f, f2h) = config.build();
        let h2f = Arc::new(h2f);
        let f2h = Arc::new(f2h);

        let l1 = TcpL1::start(host, port).map_err(|source| StartError::ConnectFailed {
            host: host.to_string(),
            port,
            attempts: 5,
            source,
        })?;

        let maint = maintenance::spawn(Arc::clone(&h2f), Arc::clone(&f2h), Box::new(l1));

        log::info!("engine started: {} h2f queue(s), {} f2h queue(s)", h2f.len(), f2h.len());
        Ok(Engine { h2f, f2h, maint })
    }

    /// Request maintenance-thread termination, then release the queues.
    /// In-flight writes complete; frames not yet begun are dropped.
    /// Not required to be idempotent (spec.md §5).
    pub fn finish(mut self) {
        self.maint.stop();
        log::info!("engine stopped");
    }

    /// Enqueue one item on H2F queue `qid`. Never blocks on L1.
    /// Aborts the process if `qid` is out of range (spec.md §4.2/§4.6).
    pub fn enqueue(&self, qid: u8, item: &[u8]) -> Result<(), Full> {
        let q = self
            .h2f
            .get(qid as usize)
            .unwrap_or_else(|| fatal!("enqueue: h2f qid {qid} out of range (have {})", self.h2f.len()));
        q.enqueue(item)
    }

    /// Pop one item from F2H queue `qid`. Never blocks on L1.
    /// Aborts the process if `qid` is out of range (spec.md §4.2/§4.6).
    pub fn pop(&self, qid: u8, out: &mut [u8]) -> Result<(), Empty> {
        let q = self
            .f2h
            .get(qid as usize)
            .unwrap_or_else(|| fatal!("pop: f2h qid {qid} out of range (have {})", self.f2h.len()));
        q.pop(out)
    }

    /// Diagnostic snapshot of every queue (spec.md §4.2). Takes each
    /// queue's mutex briefly, one at a time.
    pub fn show_all_queues(&self, sink: &mut dyn Write) -> std::io::Result<()> {
        writeln!(sink, "H2F queues:")?;
        for q in self.h2f.iter() {
            let s = q.snapshot();
            writeln!(
                sink,
                "  [{:>3}] width_b={:<3} cap_tx={:<6} cap_rx={:<6} size={:<6} hd={:<6} credits={}",
                s.qid, s.width_b, s.capacity_tx, s.capacity_rx, s.size, s.hd, s.credits
            )?;
        }
        writeln!(sink, "F2H queues:")?;
        for q in self.f2h.iter() {
            let s = q.snapshot();
            writeln!(
                sink,
                "  [{:>3}] width_b={:<3} cap_tx={:<6} cap_rx={:<6} size={:<6} hd={:<6} credits={}",
                s.qid, s.width_b, s.capacity_tx, s.capacity_rx, s.size, s.hd, s.credits
            )?;
        }
        Ok(())
    }
}
