use ream_storage::errors::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlasherError {
    /// The ancestry a single claim refers to cannot be produced. Only that claim is dropped.
    #[error("state unavailable: {0}")]
    StateUnavailable(#[source] StoreError),

    #[error("state backend failure: {0}")]
    StateBackend(#[source] StoreError),

    #[error("slashing batch cancelled")]
    Cancelled,
}

impl SlasherError {
    /// Whether the error aborts the whole batch rather than a single claim.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::StateUnavailable(_))
    }
}

impl From<StoreError> for SlasherError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            Self::StateUnavailable(err)
        } else {
            Self::StateBackend(err)
        }
    }
}
