// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 vfpga-link contributors
//
// L1: the reliable, in-order, bidirectional byte pipe L2 is built on.
// spec.md treats L1 as an external collaborator with a fixed contract
// (send / recv_blocking / recv_nonblocking / start / finish); this module
// is the one concrete implementation a runnable crate has to ship, backed
// by a plain TCP connection.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

/// Default L1 endpoint when the caller passes `host == ""` / `port == 0`.
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 30000;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_SPACING: Duration = Duration::from_secs(1);

/// The L1 contract from spec.md §1/§6.2, abstracted so the sender/receiver
/// stanzas and the maintenance loop don't care how bytes actually move.
pub trait L1Transport: Send {
    /// Blocking send of `bytes`. Retries transient `WouldBlock`/`Interrupted`
    /// in place; any other error is mid-session I/O failure (fatal per §4.6).
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Blocking read of exactly `n` bytes into `buf[..n]`. Used for frame
    /// bodies, which are obligated to arrive once a header has been seen.
    fn recv_blocking(&mut self, n: usize, buf: &mut [u8]) -> io::Result<()>;

    /// Non-blocking attempt to read exactly `n` bytes into `buf[..n]`.
    /// Returns `Ok(true)` once `n` bytes have been collected (across
    /// possibly several calls), `Ok(false)` if nothing is available yet.
    fn recv_nonblocking(&mut self, n: usize, buf: &mut [u8]) -> io::Result<bool>;

    /// Close the connection. In-flight writes are allowed to complete;
    /// frames not yet begun are simply never sent (spec.md §5).
    fn finish(&mut self) -> io::Result<()>;
}

/// TCP-backed L1. Connects as a client to the peer's listening socket.
pub struct TcpL1 {
    stream: TcpStream,
    /// Bytes accumulated so far by `recv_nonblocking` across calls, keyed
    /// by how many of the caller's requested `n` bytes are already in.
    partial: Vec<u8>,
}

impl TcpL1 {
    /// Connect to `host:port`, retrying up to `CONNECT_ATTEMPTS` times,
    /// `CONNECT_RETRY_SPACING` apart, per spec.md §4.2/§6.2.
    /// `host == ""` or `port == 0` selects the default endpoint.
    pub fn start(host: &str, port: u16) -> io::Result<Self> {
        let host = if host.is_empty() { DEFAULT_HOST } else { host };
        let port = if port == 0 { DEFAULT_PORT } else { port };
        let addr = format!("{host}:{port}");

        let mut last_err = None;
        for attempt in 1..=CONNECT_ATTEMPTS {
            match TcpStream::connect(&addr) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    stream.set_nonblocking(true)?;
                    log::info!("l1: connected to {addr} on attempt {attempt}");
                    return Ok(TcpL1 { stream, partial: Vec::new() });
                }
                Err(e) => {
                    log::warn!("l1: connect attempt {attempt}/{CONNECT_ATTEMPTS} to {addr} failed: {e}");
                    last_err = Some(e);
                    if attempt < CONNECT_ATTEMPTS {
                        std::thread::sleep(CONNECT_RETRY_SPACING);
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "connect failed")))
    }

    fn would_block_retry<T>(res: io::Result<T>) -> io::Result<Option<T>> {
        match res {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl L1Transport for TcpL1 {
    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut written = 0;
        while written < bytes.len() {
            match Self::would_block_retry(self.stream.write(&bytes[written..]))? {
                Some(n) if n > 0 => written += n,
                _ => std::thread::yield_now(),
            }
        }
        Ok(())
    }

    fn recv_blocking(&mut self, n: usize, buf: &mut [u8]) -> io::Result<()> {
        debug_assert!(buf.len() >= n);
        let mut read = 0;
        while read < n {
            match Self::would_block_retry(self.stream.read(&mut buf[read..n]))? {
                Some(k) if k > 0 => read += k,
                Some(_) => return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "l1 peer closed mid-frame")),
                None => std::thread::yield_now(),
            }
        }
        Ok(())
    }

    fn recv_nonblocking(&mut self, n: usize, buf: &mut [u8]) -> io::Result<bool> {
        debug_assert!(buf.len() >= n);
        while self.partial.len() < n {
            let mut tmp = [0u8; 64];
            let want = (n - self.partial.len()).min(tmp.len());
            match Self::would_block_retry(self.stream.read(&mut tmp[..want]))? {
                Some(0) => return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "l1 peer closed")),
                Some(k) => self.partial.extend_from_slice(&tmp[..k]),
                None => return Ok(false),
            }
        }
        buf[..n].copy_from_slice(&self.partial[..n]);
        self.partial.drain(..n);
        Ok(true)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.stream.shutdown(std::net::Shutdown::Both)
    }
}
