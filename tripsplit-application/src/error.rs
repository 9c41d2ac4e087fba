use std::path::PathBuf;
use thiserror::Error;
use tripsplit_domain::{ExpenseError, ParticipantId, SettlementError};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("failed to access trip store at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode or decode trip store: {0}")]
    Serialization(String),
}

#[derive(Debug, Error)]
pub enum TripError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("participant {0} is not on the roster")]
    UnknownParticipant(ParticipantId),
    #[error(transparent)]
    Expense(#[from] ExpenseError),
    #[error(transparent)]
    Settlement(#[from] SettlementError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("stored trip state is invalid: {0}")]
    CorruptState(String),
}
