use crate::{
    error::TripError,
    model::{ArchivedTrip, SettlementResult, Theme, Trip, TripId, TripState, person_balances},
    ports::TripRepository,
};
use chrono::{DateTime, Utc};
use tripsplit_domain::{
    BalanceCalculator, Expense, ExpenseId, Money, Participant, ParticipantId, Roster,
    SettlementEngine, SplitPolicy,
};

/// Explicit container for the trip state.
///
/// Built once at startup from a [`TripRepository`]; every mutation is staged
/// on a copy, saved through the repository and only then made current, so a
/// failed save leaves the service unchanged.
pub struct TripService<R> {
    repository: R,
    state: TripState,
    engine: SettlementEngine,
}

impl<R: TripRepository> TripService<R> {
    pub fn load(repository: R) -> Result<Self, TripError> {
        let state = match repository.load()? {
            Some(state) => {
                state.validate()?;
                state
            }
            None => TripState::new(),
        };

        tracing::info!(
            trip_id = %state.current.id,
            participant_count = state.current.participants.len(),
            expense_count = state.current.expenses.len(),
            archived_count = state.archived.len(),
            "Trip state loaded"
        );

        Ok(Self {
            repository,
            state,
            engine: SettlementEngine,
        })
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn state(&self) -> &TripState {
        &self.state
    }

    pub fn current_trip(&self) -> &Trip {
        &self.state.current
    }

    pub fn roster(&self) -> &Roster {
        &self.state.current.participants
    }

    pub fn participants(&self) -> &[Participant] {
        self.state.current.participants.as_slice()
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.state.current.expenses
    }

    pub fn theme(&self) -> Theme {
        self.state.theme
    }

    pub fn archived_trips(&self) -> &[ArchivedTrip] {
        &self.state.archived
    }

    pub fn add_member(&mut self, name: &str) -> Result<Participant, TripError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TripError::EmptyName);
        }

        let mut next = self.state.clone();
        let participant = Participant::new(ParticipantId(next.allocate_id()), name);
        next.current.participants.push(participant.clone());

        self.commit(next, "add_member")?;
        Ok(participant)
    }

    /// Records an expense paid by `payer`. `SplitPolicy::Equal` resolves
    /// against the roster as it is now.
    pub fn add_expense(
        &mut self,
        payer: ParticipantId,
        amount: Money,
        split: SplitPolicy,
    ) -> Result<Expense, TripError> {
        let roster = &self.state.current.participants;
        if !roster.contains(payer) {
            return Err(TripError::UnknownParticipant(payer));
        }
        let allocations = split.resolve(roster, amount)?;
        if let Some(member) = allocations.members().find(|member| !roster.contains(*member)) {
            return Err(TripError::UnknownParticipant(member));
        }

        let mut next = self.state.clone();
        let expense = Expense::try_new(ExpenseId(next.allocate_id()), payer, amount, allocations)?;
        next.current.expenses.push(expense.clone());

        self.commit(next, "add_expense")?;
        Ok(expense)
    }

    pub fn settle(&self) -> Result<SettlementResult, TripError> {
        let trip = &self.state.current;
        let participants = trip.participants.as_slice();

        let balances = BalanceCalculator::derive(participants, &trip.expenses)?;
        let transactions = self.engine.transactions_from_balances(participants, &balances);

        Ok(SettlementResult {
            balances: person_balances(participants, &balances),
            transactions,
        })
    }

    pub fn save_current_trip(&mut self, name: &str) -> Result<ArchivedTrip, TripError> {
        self.save_current_trip_at(name, Utc::now())
    }

    /// Moves the current trip into the history under `name` and starts a
    /// fresh one with a new id.
    pub fn save_current_trip_at(
        &mut self,
        name: &str,
        saved_at: DateTime<Utc>,
    ) -> Result<ArchivedTrip, TripError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TripError::EmptyName);
        }

        let mut next = self.state.clone();
        let fresh = Trip::new(TripId(next.allocate_id()));
        let finished = std::mem::replace(&mut next.current, fresh);
        let archived = ArchivedTrip {
            id: finished.id,
            name: name.to_owned(),
            participants: finished.participants,
            expenses: finished.expenses,
            saved_at,
        };
        next.archived.push(archived.clone());

        self.commit(next, "save_trip")?;
        Ok(archived)
    }

    /// Clears roster and expenses of the current trip. History and theme stay.
    pub fn reset_trip(&mut self) -> Result<(), TripError> {
        let mut next = self.state.clone();
        next.current.participants = Roster::new();
        next.current.expenses.clear();

        self.commit(next, "reset_trip")
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, TripError> {
        let mut next = self.state.clone();
        next.theme = next.theme.toggled();

        self.commit(next, "toggle_theme")?;
        Ok(self.state.theme)
    }

    fn commit(&mut self, next: TripState, event: &'static str) -> Result<(), TripError> {
        if let Err(err) = self.repository.save(&next) {
            tracing::warn!(event, error = %err, "Failed to persist trip state");
            return Err(err.into());
        }
        self.state = next;

        tracing::info!(
            event,
            trip_id = %self.state.current.id,
            participant_count = self.state.current.participants.len(),
            expense_count = self.state.current.expenses.len(),
            "Trip updated"
        );
        Ok(())
    }
}
