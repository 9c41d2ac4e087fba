use chrono::{DateTime, Utc};
use fxhash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use tripsplit_domain::{
    Expense, MemberBalances, Money, Participant, ParticipantId, Roster, SettlementTransaction,
};

use crate::error::TripError;

pub const STATE_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::Dark => f.write_str("dark"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(pub u64);

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The trip currently being edited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub participants: Roster,
    pub expenses: Vec<Expense>,
}

impl Trip {
    pub fn new(id: TripId) -> Self {
        Self {
            id,
            participants: Roster::new(),
            expenses: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedTrip {
    pub id: TripId,
    pub name: String,
    pub participants: Roster,
    pub expenses: Vec<Expense>,
    pub saved_at: DateTime<Utc>,
}

/// Everything that survives between sessions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripState {
    pub version: u32,
    pub current: Trip,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub archived: Vec<ArchivedTrip>,
    /// Next value handed out for participant, expense and trip ids.
    pub next_id: u64,
}

impl Default for TripState {
    fn default() -> Self {
        Self::new()
    }
}

impl TripState {
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION,
            current: Trip::new(TripId(1)),
            theme: Theme::default(),
            archived: Vec::new(),
            next_id: 2,
        }
    }

    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Checks what deserialization alone cannot: a supported version,
    /// referential integrity of every expense and an id counter ahead of all
    /// ids in use.
    pub fn validate(&self) -> Result<(), TripError> {
        if self.version != STATE_VERSION {
            return Err(TripError::CorruptState(format!(
                "unsupported state version {}",
                self.version
            )));
        }

        let mut highest_id = self.current.id.0;
        let current = &self.current;
        let trips = std::iter::once((current.id, &current.participants, &current.expenses)).chain(
            self.archived
                .iter()
                .map(|trip| (trip.id, &trip.participants, &trip.expenses)),
        );

        for (trip_id, participants, expenses) in trips {
            highest_id = highest_id.max(trip_id.0);
            let mut participant_ids = FxHashSet::default();
            let mut expense_ids = FxHashSet::default();
            for participant in participants {
                highest_id = highest_id.max(participant.id().0);
                if !participant_ids.insert(participant.id()) {
                    return Err(TripError::CorruptState(format!(
                        "trip {trip_id} lists participant {} twice",
                        participant.id()
                    )));
                }
            }
            for expense in expenses {
                highest_id = highest_id.max(expense.id().0);
                if !expense_ids.insert(expense.id().0) {
                    return Err(TripError::CorruptState(format!(
                        "trip {trip_id} contains expense {} twice",
                        expense.id()
                    )));
                }
                if let Some(member) = participants.first_unknown_reference(expense) {
                    return Err(TripError::CorruptState(format!(
                        "expense {} in trip {trip_id} references unknown participant {member}",
                        expense.id()
                    )));
                }
            }
        }

        if self.next_id <= highest_id {
            return Err(TripError::CorruptState(format!(
                "id counter {} is not ahead of id {highest_id}",
                self.next_id
            )));
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersonBalance {
    pub id: ParticipantId,
    pub name: String,
    pub balance: Money,
}

/// Balances and settlement transactions of the current trip.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettlementResult {
    pub balances: Vec<PersonBalance>,
    pub transactions: Vec<SettlementTransaction>,
}

impl SettlementResult {
    pub fn is_settled(&self) -> bool {
        self.transactions.is_empty()
    }
}

pub(crate) fn person_balances<'a>(
    participants: impl IntoIterator<Item = &'a Participant>,
    balances: &MemberBalances,
) -> Vec<PersonBalance> {
    participants
        .into_iter()
        .filter_map(|participant| {
            balances.get(&participant.id()).map(|balance| PersonBalance {
                id: participant.id(),
                name: participant.name().to_owned(),
                balance: *balance,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tripsplit_domain::{Allocations, ExpenseId};

    fn sample_state() -> TripState {
        let mut state = TripState::new();
        let a = ParticipantId(state.allocate_id());
        let b = ParticipantId(state.allocate_id());
        state.current.participants.push(Participant::new(a, "A"));
        state.current.participants.push(Participant::new(b, "B"));
        let allocations: Allocations = [(a, Money::new(500, 2)), (b, Money::new(500, 2))]
            .into_iter()
            .collect();
        let expense = Expense::try_new(
            ExpenseId(state.allocate_id()),
            a,
            Money::from_i64(10),
            allocations,
        )
        .expect("expense");
        state.current.expenses.push(expense);
        state
    }

    #[test]
    fn sample_state_is_valid() {
        assert!(sample_state().validate().is_ok());
    }

    #[test]
    fn state_survives_json() {
        let state = sample_state();

        let json = serde_json::to_string(&state).expect("encode");
        let decoded: TripState = serde_json::from_str(&json).expect("decode");

        assert_eq!(decoded, state);
    }

    #[test]
    fn missing_theme_and_history_default() {
        let json = r#"{"version":1,"current":{"id":1,"participants":[],"expenses":[]},"next_id":2}"#;

        let state: TripState = serde_json::from_str(json).expect("decode");

        assert_eq!(state, TripState::new());
    }

    #[rstest]
    #[case::unsupported_version(|state: &mut TripState| state.version = 7)]
    #[case::stale_counter(|state: &mut TripState| state.next_id = 3)]
    #[case::duplicate_expense(|state: &mut TripState| {
        let expense = state.current.expenses[0].clone();
        state.current.expenses.push(expense);
    })]
    #[case::orphaned_reference(|state: &mut TripState| {
        state.current.participants = state.current.participants.iter().take(1).cloned().collect();
    })]
    fn corrupt_states_are_rejected(#[case] corrupt: fn(&mut TripState)) {
        let mut state = sample_state();
        corrupt(&mut state);

        assert!(matches!(state.validate(), Err(TripError::CorruptState(_))));
    }

    #[test]
    fn duplicate_participant_ids_are_rejected() {
        let mut json = serde_json::to_value(sample_state()).expect("encode");
        let participants = json["current"]["participants"]
            .as_array_mut()
            .expect("participant list");
        let first = participants[0].clone();
        participants.push(first);

        let state: TripState = serde_json::from_value(json).expect("decode");

        assert!(matches!(state.validate(), Err(TripError::CorruptState(_))));
    }

    #[rstest]
    #[case::light(Theme::Light, Theme::Dark)]
    #[case::dark(Theme::Dark, Theme::Light)]
    fn theme_toggles(#[case] theme: Theme, #[case] expected: Theme) {
        assert_eq!(theme.toggled(), expected);
    }

    #[test]
    fn person_balances_follow_roster_order() {
        let state = sample_state();
        let mut balances = MemberBalances::default();
        let ids: Vec<ParticipantId> = state.current.participants.ids().collect();
        balances.insert(ids[1], Money::from_i64(-5));
        balances.insert(ids[0], Money::from_i64(5));

        let rows = person_balances(state.current.participants.iter(), &balances);

        let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(rows[1].balance, Money::from_i64(-5));
    }
}
