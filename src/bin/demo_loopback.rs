// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 vfpga-link contributors
//
// Demo: two Engines talking over a real TCP loopback connection. One side
// plays "host" and enqueues items on H2F[0]; the other plays a minimal
// "peer" that echoes whatever it receives on H2F[0] back as F2H[0], so the
// host can pop the same bytes it sent — spec.md §8 scenario 1.
//
// Usage: demo_loopback

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use vfpga_link::{Engine, QueueSetConfig, QueueSpec};

fn run_peer(mut sock: TcpStream) {
    sock.set_nodelay(true).expect("nodelay");
    // Grant the host its full H2F[0] send budget up front.
    sock.write_all(&vfpga_link::wire::Header::encode_credit(0, 8)).expect("grant credit");

    loop {
        let mut hdr = [0u8; 4];
        if sock.read_exact(&mut hdr).is_err() {
            return; // host closed the connection
        }
        if hdr[0] == vfpga_link::wire::QID_NOOP {
            continue;
        }
        if hdr[0] == vfpga_link::wire::QID_CRED {
            continue; // the peer in this demo never needs F2H credit
        }
        let n = u16::from_le_bytes([hdr[1], hdr[2]]) as usize;
        let width = hdr[3] as usize;
        let mut body = vec![0u8; n * width];
        sock.read_exact(&mut body).expect("read body");

        println!("peer: echoing {n} item(s) of {width} byte(s) from h2f[0] back on f2h[0]");
        sock.write_all(&vfpga_link::wire::Header::encode_data(0, n as u16, width as u8)).expect("echo header");
        sock.write_all(&body).expect("echo body");
    }
}

fn main() {
    env_logger::init();

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let addr = listener.local_addr().expect("local_addr");

    let peer = thread::spawn(move || {
        let (sock, _) = listener.accept().expect("accept peer connection");
        run_peer(sock);
    });

    let config = QueueSetConfig::new(vec![QueueSpec::new(8, 8, 8)], vec![QueueSpec::new(8, 8, 8)]);
    let engine = Engine::start(config, &addr.ip().to_string(), addr.port()).expect("engine start");

    let item = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77];
    println!("host: enqueuing {item:02x?} on h2f[0]");
    engine.enqueue(0, &item).expect("enqueue");

    let mut out = [0u8; 8];
    loop {
        match engine.pop(0, &mut out) {
            Ok(()) => break,
            Err(_empty) => thread::sleep(Duration::from_millis(10)),
        }
    }
    println!("host: popped {out:02x?} from f2h[0]");
    assert_eq!(out, item, "loopback echo should return exactly what was sent");

    let mut snapshot = Vec::new();
    engine.show_all_queues(&mut snapshot).expect("snapshot");
    print!("{}", String::from_utf8_lossy(&snapshot));

    engine.finish();
    peer.join().expect("peer thread"); // exits once the host closes its socket
}
