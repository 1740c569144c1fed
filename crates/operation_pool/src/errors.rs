#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("slashing does not describe a conflicting pair")]
    NotSlashable,

    #[error("attesting indices are not sorted and unique")]
    UnsortedIndices,

    #[error("attestations share no attesting index")]
    NoCommonIndices,

    #[error("validator index {0} is not in the registry")]
    UnknownValidator(u64),

    #[error("no validator in the slashing can still be slashed")]
    NothingToSlash,
}
