// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 vfpga-link contributors
//
// Host-side L2: a credit-flow-controlled multi-queue transport for a
// Virtual FPGA simulation harness, multiplexed over a single reliable
// byte-stream connection to the simulated peer (L1).
//
// The application declares a set of fixed-width item queues in each
// direction (host-to-FPGA and FPGA-to-peer), then drives them through
// `Engine::enqueue`/`Engine::pop` while a background thread drains/fills
// them against the wire under credit-based flow control.

pub mod error;
pub mod l1;
pub mod queue;
pub mod queue_set;
pub mod wire;

mod engine;
mod maintenance;
mod receiver;
mod sender;

pub use engine::Engine;
pub use error::{Empty, Full, StartError};
pub use l1::{L1Transport, TcpL1, DEFAULT_HOST, DEFAULT_PORT};
pub use queue::{Direction, Queue, QueueSnapshot};
pub use queue_set::{QueueSetConfig, QueueSpec};
