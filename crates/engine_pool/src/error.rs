//! Pool error types.

/// Errors that can occur when returning storage to a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The handle does not name a live slot: it was already released, or it
    /// never came from this pool.
    #[error("stale pool handle (index {index}, generation {generation})")]
    StaleHandle {
        /// Slot index carried by the handle.
        index: u32,
        /// Generation carried by the handle.
        generation: u32,
    },
}
