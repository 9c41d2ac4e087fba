use parking_lot::Mutex;
use tripsplit_application::{RepositoryError, TripRepository, TripState};

/// Keeps the trip state in memory only, for running a `TripService` without a
/// store file. Nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryTripRepository {
    slot: Mutex<Option<TripState>>,
}

impl InMemoryTripRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: TripState) -> Self {
        Self {
            slot: Mutex::new(Some(state)),
        }
    }

    /// Copy of the last saved state.
    pub fn snapshot(&self) -> Option<TripState> {
        self.slot.lock().clone()
    }
}

impl TripRepository for InMemoryTripRepository {
    fn load(&self) -> Result<Option<TripState>, RepositoryError> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &TripState) -> Result<(), RepositoryError> {
        *self.slot.lock() = Some(state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_until_saved() {
        let repository = InMemoryTripRepository::new();
        assert_eq!(repository.load().expect("load"), None);

        let mut state = TripState::new();
        state.allocate_id();
        repository.save(&state).expect("save");

        assert_eq!(repository.load().expect("load"), Some(state));
    }

    #[test]
    fn seeded_state_is_returned() {
        let repository = InMemoryTripRepository::with_state(TripState::new());

        assert_eq!(repository.snapshot(), Some(TripState::new()));
    }
}
