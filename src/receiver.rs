// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 vfpga-link contributors
//
// recv_f2h: read and apply at most one framed message per invocation
// (spec.md §4.4). The header is read non-blockingly; once it has arrived
// the body (if any) is obligated to follow, so it's read with a blocking
// recv to completion.

use std::io;

use crate::fatal;
use crate::l1::L1Transport;
use crate::queue::Queue;
use crate::wire::Header;

/// Attempt to read and apply one frame. Returns `Ok(true)` if a frame was
/// processed, `Ok(false)` if no header was available yet ("no work").
pub fn recv_f2h(h2f: &[Queue], f2h: &[Queue], l1: &mut dyn L1Transport) -> io::Result<bool> {
    let mut raw = [0u8; 4];
    if !l1.recv_nonblocking(4, &mut raw)? {
        return Ok(false);
    }

    match Header::decode(raw) {
        Header::Noop => {
            log::trace!("receiver: noop");
        }
        Header::Credit { qid, credits } => apply_credit(h2f, qid, credits, l1)?,
        Header::Data { qid, n, width_b: _ } => apply_data(f2h, qid, n, l1)?,
    }

    Ok(true)
}

fn apply_credit(h2f: &[Queue], qid: u8, credits: u16, l1: &mut dyn L1Transport) -> io::Result<()> {
    let _ = l1; // CRED frames carry no body
    let q = match h2f.get(qid as usize) {
        Some(q) => q,
        None => fatal!("credit grant for out-of-range h2f qid {qid}"),
    };
    let mut st = q.lock();
    // I3: the peer's own budget discipline guarantees it never overgrants;
    // no saturation against capacity_tx is required (spec.md §4.4).
    st.credits += credits as u32;
    log::trace!("receiver: h2f[{qid}] granted {credits} credit(s), now {}", st.credits);
    Ok(())
}

fn apply_data(f2h: &[Queue], qid: u8, n: u16, l1: &mut dyn L1Transport) -> io::Result<()> {
    let q = match f2h.get(qid as usize) {
        Some(q) => q,
        None => fatal!("data frame for out-of-range f2h qid {qid}"),
    };

    let width_b = q.width_b as usize;
    let mut st = q.lock();
    // Precondition guaranteed by I4 if the peer respects credits: the
    // batch must fit in the remaining free slots.
    if st.size as u32 + n as u32 > q.local_capacity {
        fatal!("f2h[{qid}] data batch of {n} would overflow capacity {}", q.local_capacity);
    }

    let mut item = vec![0u8; width_b];
    for _ in 0..n {
        if width_b > 0 {
            l1.recv_blocking(width_b, &mut item)?;
        }
        let tail = (st.hd + st.size) % q.local_capacity;
        let off = tail as usize * width_b;
        st.storage[off..off + width_b].copy_from_slice(&item);
        st.size += 1;
    }

    log::trace!("receiver: f2h[{qid}] received {n} item(s)");
    Ok(())
}
