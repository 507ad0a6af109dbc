//! Batch-size policy enforcement.

use super::types::{BatchError, BatchResult};

/// Fails closed on an empty or over-limit batch.
///
/// Must run before any operation executes: an over-limit batch is
/// rejected whole, never partially executed.
pub fn check_batch_size(size: usize, limit: usize) -> BatchResult<()> {
    if size == 0 {
        return Err(BatchError::MissingQuery);
    }
    if size > limit {
        return Err(BatchError::BatchTooLarge { size, max: limit });
    }
    Ok(())
}
