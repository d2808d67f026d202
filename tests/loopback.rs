// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 vfpga-link contributors
//
// spec.md §8 scenario 1: single item loopback.

mod common;

use std::thread;
use std::time::{Duration, Instant};

use vfpga_link::{Engine, QueueSetConfig, QueueSpec};

#[test]
fn single_item_round_trips_through_a_loopback_peer() {
    let peer = common::Peer::bind();
    let addr = peer.addr;

    let peer_thread = thread::spawn(move || {
        let mut sock = peer.accept();
        common::grant_credit(&mut sock, 0, 8);
        let header = common::read_header(&mut sock);
        match header {
            vfpga_link::wire::Header::Data { qid: 0, n, width_b } => {
                let mut body = vec![0u8; n as usize * width_b as usize];
                std::io::Read::read_exact(&mut sock, &mut body).unwrap();
                common::send_data(&mut sock, 0, &[&body], width_b);
            }
            other => panic!("unexpected header: {other:?}"),
        }
    });

    let config = QueueSetConfig::new(vec![QueueSpec::new(8, 8, 8)], vec![QueueSpec::new(8, 8, 8)]);
    let engine = Engine::start(config, &addr.ip().to_string(), addr.port()).unwrap();

    let item = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77];
    engine.enqueue(0, &item).unwrap();

    let mut out = [0u8; 8];
    let deadline = Instant::now() + Duration::from_secs(5);
    while engine.pop(0, &mut out).is_err() {
        assert!(Instant::now() < deadline, "timed out waiting for echo");
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(out, item);

    engine.finish();
    peer_thread.join().unwrap();
}
