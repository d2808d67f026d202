// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 vfpga-link contributors
//
// spec.md §8 scenario 2: a burst larger than capacity forces the host to
// retry on `Full` across several credit grants, and the ring head wraps
// around partway through. Also covers the degenerate capacity == 1 case.

mod common;

use std::thread;
use std::time::{Duration, Instant};

use vfpga_link::wire::Header;
use vfpga_link::{Engine, QueueSetConfig, QueueSpec};

#[test]
fn burst_larger_than_capacity_drains_across_several_grants() {
    let peer = common::Peer::bind();
    let addr = peer.addr;
    const CAP: u32 = 8;
    const TOTAL: u32 = 16;

    let peer_thread = thread::spawn(move || {
        let mut sock = peer.accept();
        let mut received = Vec::new();
        while received.len() < TOTAL as usize {
            common::grant_credit(&mut sock, 0, CAP as u16);
            let header = common::read_header(&mut sock);
            let (n, width_b) = match header {
                Header::Data { qid: 0, n, width_b } => (n, width_b),
                other => panic!("unexpected header: {other:?}"),
            };
            for _ in 0..n {
                let mut body = vec![0u8; width_b as usize];
                std::io::Read::read_exact(&mut sock, &mut body).unwrap();
                received.push(body[0]);
            }
        }
        received
    });

    let config = QueueSetConfig::new(vec![QueueSpec::new(1, CAP, 0)], vec![]);
    let engine = Engine::start(config, &addr.ip().to_string(), addr.port()).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    for i in 0..TOTAL as u8 {
        loop {
            if engine.enqueue(0, &[i]).is_ok() {
                break;
            }
            assert!(Instant::now() < deadline, "timed out waiting for room");
            thread::sleep(Duration::from_millis(5));
        }
    }

    engine.finish();
    let received = peer_thread.join().unwrap();
    assert_eq!(received, (0..TOTAL as u8).collect::<Vec<_>>());
}

#[test]
fn capacity_one_queue_handshakes_one_item_at_a_time() {
    let peer = common::Peer::bind();
    let addr = peer.addr;

    let peer_thread = thread::spawn(move || {
        let mut sock = peer.accept();
        for expected in 0u8..3 {
            common::grant_credit(&mut sock, 0, 1);
            let header = common::read_header(&mut sock);
            match header {
                Header::Data { qid: 0, n: 1, width_b: 1 } => {}
                other => panic!("unexpected header: {other:?}"),
            }
            let mut body = [0u8; 1];
            std::io::Read::read_exact(&mut sock, &mut body).unwrap();
            assert_eq!(body[0], expected);
        }
    });

    let config = QueueSetConfig::new(vec![QueueSpec::new(1, 1, 0)], vec![]);
    let engine = Engine::start(config, &addr.ip().to_string(), addr.port()).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    for i in 0u8..3 {
        loop {
            if engine.enqueue(0, &[i]).is_ok() {
                break;
            }
            assert!(Instant::now() < deadline, "timed out waiting for room");
            thread::sleep(Duration::from_millis(5));
        }
    }

    engine.finish();
    peer_thread.join().unwrap();
}
