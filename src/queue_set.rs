// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 vfpga-link contributors
//
// The build-time queue-set declaration (spec.md §6.4) and construction of
// the H2F/F2H queue arrays from it (spec.md §4.1). In the original system
// this is a generated/compile-time table; here it's plain data the
// application builds and hands to `Engine::start`.

use crate::queue::{Direction, Queue};

/// One queue's declared shape: item width and the capacity each side of
/// the link believes it has. Both endpoints must declare matching tables
/// per queue — spec.md §6.4 documents mismatch as undetected
/// desynchronization, not something this crate can check.
#[derive(Debug, Clone, Copy)]
pub struct QueueSpec {
    pub width_b: u8,
    pub capacity_tx: u32,
    pub capacity_rx: u32,
}

impl QueueSpec {
    pub const fn new(width_b: u8, capacity_tx: u32, capacity_rx: u32) -> Self {
        QueueSpec { width_b, capacity_tx, capacity_rx }
    }
}

/// The two queue-set tables: Host-to-FPGA and FPGA-to-Host.
#[derive(Debug, Clone)]
pub struct QueueSetConfig {
    pub h2f: Vec<QueueSpec>,
    pub f2h: Vec<QueueSpec>,
}

impl QueueSetConfig {
    pub fn new(h2f: Vec<QueueSpec>, f2h: Vec<QueueSpec>) -> Self {
        QueueSetConfig { h2f, f2h }
    }

    /// Allocate the live `Queue` arrays (spec.md §4.1 `start`).
    pub(crate) fn build(&self) -> (Vec<Queue>, Vec<Queue>) {
        let h2f = self
            .h2f
            .iter()
            .enumerate()
            .map(|(qid, spec)| Queue::new(qid as u8, Direction::H2f, spec.width_b, spec.capacity_tx, spec.capacity_rx))
            .collect();
        let f2h = self
            .f2h
            .iter()
            .enumerate()
            .map(|(qid, spec)| Queue::new(qid as u8, Direction::F2h, spec.width_b, spec.capacity_tx, spec.capacity_rx))
            .collect();
        (h2f, f2h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_assigns_ascending_qids() {
        let cfg = QueueSetConfig::new(
            vec![QueueSpec::new(8, 8, 8), QueueSpec::new(4, 4, 4)],
            vec![QueueSpec::new(8, 8, 8)],
        );
        let (h2f, f2h) = cfg.build();
        assert_eq!(h2f.len(), 2);
        assert_eq!(h2f[0].qid, 0);
        assert_eq!(h2f[1].qid, 1);
        assert_eq!(f2h.len(), 1);
        assert_eq!(f2h[0].qid, 0);
    }
}
