//! Block-id generation.
//!
//! Blocks need ids unique within a document's lifetime; nothing orders or
//! parses them. A process-wide counter combined with a coarse startup
//! timestamp is sufficient. Tests call [`reset_block_ids`] so every run
//! produces the same counter sequence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn epoch_millis() -> u64 {
    static EPOCH: OnceLock<u64> = OnceLock::new();
    *EPOCH.get_or_init(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    })
}

/// Next block id, unique for the life of this process.
pub fn next_block_id() -> String {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("b{:x}-{}", epoch_millis(), n)
}

/// Reset the counter. Test hook only; production code never calls this.
pub fn reset_block_ids() {
    COUNTER.store(0, Ordering::Relaxed);
}
