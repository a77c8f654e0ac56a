//! Identifier allocation errors.

/// Errors that can occur while minting identifiers.
///
/// Sequence overflow is deliberately absent: it is recovered inside the
/// allocator and only reported through the log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The caller asked for a shard outside the layout's shard field.
    #[error("shard {shard} is out of range (max {max})")]
    ShardOutOfRange {
        /// The shard number that was requested.
        shard: u32,
        /// The exclusive upper bound for shard numbers.
        max: u32,
    },
}
