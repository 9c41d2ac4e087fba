use crate::{error::RepositoryError, model::TripState};

/// Load/save boundary for the persisted trip state.
pub trait TripRepository: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<TripState>, RepositoryError>;

    fn save(&self, state: &TripState) -> Result<(), RepositoryError>;
}

impl<R: TripRepository + ?Sized> TripRepository for &R {
    fn load(&self) -> Result<Option<TripState>, RepositoryError> {
        (**self).load()
    }

    fn save(&self, state: &TripState) -> Result<(), RepositoryError> {
        (**self).save(state)
    }
}
