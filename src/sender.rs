// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 vfpga-link contributors
//
// send_h2f: one data batch and one credit grant per invocation (spec.md
// §4.3). Each queue's mutex is held only for the duration of its own
// stanza, and the L1 `send` call happens while holding it — this keeps a
// frame's header+body from interleaving with another sender stanza and
// keeps queue state in lockstep with the bytes actually on the wire.

use std::io;

use crate::l1::L1Transport;
use crate::queue::Queue;
use crate::wire::Header;

/// Scan H2F queues in ascending qid for the first with `size > 0 && credits
/// > 0`, emit a DATA frame draining `min(size, credits)` items, then scan
/// F2H queues in ascending qid for the first with `credits > 0` and emit a
/// CRED frame flushing it to zero. Returns whether either stanza fired.
pub fn send_h2f(h2f: &[Queue], f2h: &[Queue], l1: &mut dyn L1Transport) -> io::Result<bool> {
    let mut did_work = false;

    if send_data_batch(h2f, l1)? {
        did_work = true;
    }
    if send_credit_grant(f2h, l1)? {
        did_work = true;
    }

    Ok(did_work)
}

fn send_data_batch(h2f: &[Queue], l1: &mut dyn L1Transport) -> io::Result<bool> {
    for q in h2f {
        let mut st = q.lock();
        if st.size == 0 || st.credits == 0 {
            continue;
        }
        // Header carries `n` as u16; credits (and size) accumulate in u32
        // across multiple CRED grants, so clamp before it's ever used to
        // pick a batch, or the header and the drain loop would disagree.
        let n = st.size.min(st.credits).min(u16::MAX as u32);
        let width_b = q.width_b as usize;

        l1.send(&Header::encode_data(q.qid, n as u16, q.width_b))?;
        for _ in 0..n {
            if width_b > 0 {
                let off = st.hd as usize * width_b;
                let item = st.storage[off..off + width_b].to_vec();
                l1.send(&item)?;
            }
            st.hd = (st.hd + 1) % q.local_capacity;
            st.size -= 1;
        }
        st.credits -= n;

        log::trace!("sender: h2f[{}] drained {n} item(s)", q.qid);
        return Ok(true);
    }
    Ok(false)
}

fn send_credit_grant(f2h: &[Queue], l1: &mut dyn L1Transport) -> io::Result<bool> {
    for q in f2h {
        let mut st = q.lock();
        if st.credits == 0 {
            continue;
        }
        let credits = st.credits;
        l1.send(&Header::encode_credit(q.qid, credits as u16))?;
        st.credits = 0;

        log::trace!("sender: granted {credits} credit(s) for f2h[{}]", q.qid);
        return Ok(true);
    }
    Ok(false)
}
