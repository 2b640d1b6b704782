//! Free-index discovery.
//!
//! A populate run must find out where the previous run stopped
//! without scanning the whole dataset. Entity existence is monotonic
//! over the index space (`prefix + i` exists for all `i` below some
//! threshold, and for none at or above it), so the first free index
//! can be located with O(log T) store reads: an exponential probe to
//! bound the threshold, then a binary search inside the bound.

use crate::error::ProbeError;
use std::future::Future;

/// Hard cap on the exponential probe.
///
/// The predicate is monotonic; if it still reports "exists" at 2^30
/// the prefix is matching something other than a generated dataset
/// and doubling further would only hide that.
pub const MAX_PROBE_INDEX: u64 = 1 << 30;

/// First index the exponential probe inspects after index 0.
const PROBE_BASE: u64 = 100;

/// Find the first index `i` for which `exists_at(i)` is false.
///
/// `exists_at` must be monotonic: true for every index below some
/// unknown threshold `T >= 0` and false at and above it. Returns `T`.
///
/// Index 0 is checked first so a fresh dataset resolves in a single
/// read. Otherwise probes run at 100, 200, 400, ... until a free
/// index bounds the search, then a binary search narrows the
/// found/free bounds until they are adjacent.
pub async fn find_free_index<F, Fut>(mut exists_at: F) -> Result<u64, ProbeError>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = anyhow::Result<bool>>,
{
    if !exists_at(0).await.map_err(ProbeError::Predicate)? {
        return Ok(0);
    }

    // Exponential phase: find the first probed index that is free.
    let mut found = 0u64; // highest index confirmed to exist
    let mut probe = PROBE_BASE;
    let mut free = loop {
        if probe > MAX_PROBE_INDEX {
            return Err(ProbeError::BoundExceeded {
                cap: MAX_PROBE_INDEX,
            });
        }
        if exists_at(probe).await.map_err(ProbeError::Predicate)? {
            found = probe;
            probe *= 2;
        } else {
            break probe;
        }
    };

    // Binary phase: narrow (found, free) until adjacent.
    while free - found > 1 {
        let mid = found + (free - found) / 2;
        if exists_at(mid).await.map_err(ProbeError::Predicate)? {
            found = mid;
        } else {
            free = mid;
        }
    }
    Ok(free)
}
