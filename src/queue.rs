// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 vfpga-link contributors
//
// Per-queue ring buffer + credit accounting + mutex (spec.md §3).
// One `Queue` instance per (direction, qid). The same type serves both
// H2F and F2H; only the `Direction` recorded at construction time decides
// which capacity is "local" (the one the ring is actually sized to) and
// what the initial credit value means.

use std::sync::Mutex;

use crate::fatal;

/// Which side of the link this queue belongs to. Decides which capacity is
/// "local" and what `credits` means (spec.md §3's direction-dependent
/// credit semantics).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host is producer: `credits` = items the peer authorized but we
    /// haven't sent yet. Ring is sized by `capacity_tx`.
    H2f,
    /// Host is consumer: `credits` = freed slots owed to the peer as a
    /// grant but not yet reported. Ring is sized by `capacity_rx`.
    F2h,
}

/// The mutex-guarded part of a queue: everything that changes on every
/// enqueue/pop/send/receive.
pub(crate) struct RingState {
    pub size: u32,
    pub hd: u32,
    pub credits: u32,
    pub storage: Vec<u8>,
}

/// A single-direction bounded ring buffer of fixed-width items, with its
/// credit accumulator and mutex. Immutable fields (`width_b`, `capacity_tx`,
/// `capacity_rx`) are fixed at construction per invariant I6.
pub struct Queue {
    pub qid: u8,
    pub direction: Direction,
    pub width_b: u8,
    pub capacity_tx: u32,
    pub capacity_rx: u32,
    /// `capacity_rx` for F2H, `capacity_tx` for H2F — the ring's real size.
    pub local_capacity: u32,
    pub(crate) state: Mutex<RingState>,
}

impl Queue {
    pub fn new(qid: u8, direction: Direction, width_b: u8, capacity_tx: u32, capacity_rx: u32) -> Self {
        let local_capacity = match direction {
            Direction::H2f => capacity_tx,
            Direction::F2h => capacity_rx,
        };
        let initial_credits = match direction {
            Direction::H2f => 0,
            Direction::F2h => local_capacity,
        };
        let storage = vec![0u8; width_b as usize * local_capacity as usize];
        Queue {
            qid,
            direction,
            width_b,
            capacity_tx,
            capacity_rx,
            local_capacity,
            state: Mutex::new(RingState { size: 0, hd: 0, credits: initial_credits, storage }),
        }
    }

    /// Lock the queue's state, treating a poisoned mutex as the corruption
    /// case spec.md §4.6/§7 calls fatal.
    pub(crate) fn lock(&self) -> std::sync::MutexGuard<'_, RingState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(_) => fatal!("queue {} mutex poisoned", self.qid),
        }
    }

    /// Application-facing enqueue (H2F only): copy `item` into the ring if
    /// there's room. Never touches credits or L1. spec.md §4.2.
    pub fn enqueue(&self, item: &[u8]) -> Result<(), crate::error::Full> {
        debug_assert_eq!(self.direction, Direction::H2f);
        let mut st = self.lock();
        if st.size == self.local_capacity {
            return Err(crate::error::Full);
        }
        let tail = (st.hd + st.size) % self.local_capacity;
        let off = tail as usize * self.width_b as usize;
        let w = self.width_b as usize;
        st.storage[off..off + w].copy_from_slice(&item[..w]);
        st.size += 1;
        Ok(())
    }

    /// Application-facing pop (F2H only): copy the head item out, advance
    /// `hd`, and bump the owed-credit counter. spec.md §4.2.
    pub fn pop(&self, out: &mut [u8]) -> Result<(), crate::error::Empty> {
        debug_assert_eq!(self.direction, Direction::F2h);
        let mut st = self.lock();
        if st.size == 0 {
            return Err(crate::error::Empty);
        }
        let w = self.width_b as usize;
        let off = st.hd as usize * w;
        out[..w].copy_from_slice(&st.storage[off..off + w]);
        st.hd = (st.hd + 1) % self.local_capacity;
        st.size -= 1;
        st.credits += 1;
        Ok(())
    }

    /// Snapshot for diagnostics (spec.md §4.2 `show_all_queues`).
    pub fn snapshot(&self) -> QueueSnapshot {
        let st = self.lock();
        QueueSnapshot {
            qid: self.qid,
            direction: self.direction,
            width_b: self.width_b,
            capacity_tx: self.capacity_tx,
            capacity_rx: self.capacity_rx,
            size: st.size,
            hd: st.hd,
            credits: st.credits,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QueueSnapshot {
    pub qid: u8,
    pub direction: Direction,
    pub width_b: u8,
    pub capacity_tx: u32,
    pub capacity_rx: u32,
    pub size: u32,
    pub hd: u32,
    pub credits: u32,
}
