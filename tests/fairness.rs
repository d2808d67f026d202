// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 vfpga-link contributors
//
// spec.md §8 scenario 6: with two H2F queues both holding data and both
// credited, neither should starve indefinitely. The sender picks the
// lowest-qid ready queue per invocation, so over many maintenance-thread
// iterations both queues should be observed making progress, not just the
// lower-numbered one monopolizing the wire.

mod common;

use std::collections::HashMap;
use std::thread;
use std::time::{Duration, Instant};

use vfpga_link::wire::Header;
use vfpga_link::{Engine, QueueSetConfig, QueueSpec};

#[test]
fn two_credited_queues_both_make_progress() {
    let peer = common::Peer::bind();
    let addr = peer.addr;
    const PER_QUEUE: usize = 20;

    let peer_thread = thread::spawn(move || {
        let mut sock = peer.accept();
        // Keep both queues topped up with credit throughout so neither is
        // ever the sole beneficiary of a one-shot grant.
        common::grant_credit(&mut sock, 0, PER_QUEUE as u16);
        common::grant_credit(&mut sock, 1, PER_QUEUE as u16);

        let mut counts: HashMap<u8, usize> = HashMap::new();
        while counts.values().sum::<usize>() < PER_QUEUE * 2 {
            let header = common::read_header(&mut sock);
            match header {
                Header::Data { qid, n, width_b } => {
                    let mut body = vec![0u8; n as usize * width_b as usize];
                    std::io::Read::read_exact(&mut sock, &mut body).unwrap();
                    *counts.entry(qid).or_insert(0) += n as usize;
                }
                other => panic!("unexpected header: {other:?}"),
            }
        }
        counts
    });

    let config = QueueSetConfig::new(
        vec![QueueSpec::new(4, PER_QUEUE as u32, 0), QueueSpec::new(4, PER_QUEUE as u32, 0)],
        vec![],
    );
    let engine = Engine::start(config, &addr.ip().to_string(), addr.port()).unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    // Interleave enqueues on both queues so both have outstanding work for
    // most of the run, rather than front-loading queue 0 and draining it
    // before queue 1 ever gets anything to send.
    for i in 0..PER_QUEUE as u8 {
        loop {
            if engine.enqueue(0, &[i]).is_ok() {
                break;
            }
            assert!(Instant::now() < deadline, "timed out enqueuing on queue 0");
            thread::sleep(Duration::from_millis(2));
        }
        loop {
            if engine.enqueue(1, &[i]).is_ok() {
                break;
            }
            assert!(Instant::now() < deadline, "timed out enqueuing on queue 1");
            thread::sleep(Duration::from_millis(2));
        }
    }

    engine.finish();
    let counts = peer_thread.join().unwrap();
    assert_eq!(counts.get(&0).copied().unwrap_or(0), PER_QUEUE);
    assert_eq!(counts.get(&1).copied().unwrap_or(0), PER_QUEUE);
}
