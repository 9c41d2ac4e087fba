use crate::model::{Expense, ExpenseId, MemberBalances, Money, Participant, ParticipantId};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("expense {expense} references participant {member} who is not in the trip")]
    UnknownParticipant {
        expense: ExpenseId,
        member: ParticipantId,
    },
}

/// Derives net balances from a closed set of expenses.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Balance table in participant order, every participant starting at zero.
    ///
    /// The payer of each expense is credited with the full amount and every
    /// allocation is debited from its member, so a payer who is also an
    /// allocatee nets to their true share. An expense referencing an id that
    /// is not among `participants` is rejected instead of creating a balance
    /// no participant can settle.
    pub fn derive(
        participants: &[Participant],
        expenses: &[Expense],
    ) -> Result<MemberBalances, SettlementError> {
        let mut balances: MemberBalances = participants
            .iter()
            .map(|participant| (participant.id(), Money::ZERO))
            .collect();

        for expense in expenses {
            let unknown = |member| SettlementError::UnknownParticipant {
                expense: expense.id(),
                member,
            };

            *balances
                .get_mut(&expense.payer())
                .ok_or_else(|| unknown(expense.payer()))? += expense.amount();

            for (member, share) in expense.allocations().iter() {
                *balances.get_mut(&member).ok_or_else(|| unknown(member))? -= share;
            }
        }

        Ok(balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Allocations, ExpenseId};
    use rstest::{fixture, rstest};

    #[fixture]
    fn participants() -> Vec<Participant> {
        vec![
            Participant::new(ParticipantId(1), "A"),
            Participant::new(ParticipantId(2), "B"),
            Participant::new(ParticipantId(3), "C"),
        ]
    }

    fn expense(id: u64, payer: u64, amount: i64, shares: &[(u64, i64)]) -> Expense {
        let allocations: Allocations = shares
            .iter()
            .map(|&(member, share)| (ParticipantId(member), Money::from_i64(share)))
            .collect();
        Expense::try_new(
            ExpenseId(id),
            ParticipantId(payer),
            Money::from_i64(amount),
            allocations,
        )
        .expect("valid expense")
    }

    fn balance_of(balances: &MemberBalances, id: u64) -> Money {
        balances
            .get(&ParticipantId(id))
            .copied()
            .expect("participant must have a balance")
    }

    #[rstest]
    #[case::no_expenses(vec![], &[(1, 0), (2, 0), (3, 0)])]
    #[case::equal_split(
        vec![expense(1, 1, 300, &[(1, 100), (2, 100), (3, 100)])],
        &[(1, 200), (2, -100), (3, -100)]
    )]
    #[case::payer_outside_split(
        vec![expense(1, 3, 60, &[(1, 30), (2, 30)])],
        &[(1, -30), (2, -30), (3, 60)]
    )]
    #[case::offsetting_expenses(
        vec![
            expense(1, 1, 90, &[(1, 30), (2, 60)]),
            expense(2, 2, 30, &[(1, 15), (2, 15)]),
        ],
        &[(1, 45), (2, -45), (3, 0)]
    )]
    fn derive_balances_cases(
        participants: Vec<Participant>,
        #[case] expenses: Vec<Expense>,
        #[case] expected: &[(u64, i64)],
    ) {
        let balances = BalanceCalculator::derive(&participants, &expenses).expect("derive");

        for &(id, amount) in expected {
            assert_eq!(balance_of(&balances, id), Money::from_i64(amount));
        }
        let total: Money = balances.values().sum();
        assert!(total.is_zero());
    }

    #[rstest]
    fn derive_keeps_participant_order(participants: Vec<Participant>) {
        let mut reversed = participants;
        reversed.reverse();

        let balances = BalanceCalculator::derive(&reversed, &[]).expect("derive");
        let order: Vec<ParticipantId> = balances.keys().copied().collect();

        assert_eq!(
            order,
            vec![ParticipantId(3), ParticipantId(2), ParticipantId(1)]
        );
    }

    #[rstest]
    #[case::unknown_payer(expense(4, 9, 10, &[(1, 10)]), ParticipantId(9))]
    #[case::unknown_allocation(expense(4, 1, 10, &[(1, 5), (8, 5)]), ParticipantId(8))]
    fn derive_rejects_unknown_participants(
        participants: Vec<Participant>,
        #[case] expense: Expense,
        #[case] member: ParticipantId,
    ) {
        let result = BalanceCalculator::derive(&participants, &[expense]);

        assert_eq!(
            result,
            Err(SettlementError::UnknownParticipant {
                expense: ExpenseId(4),
                member,
            })
        );
    }

    #[rstest]
    fn derive_does_not_touch_inputs(participants: Vec<Participant>) {
        let expenses = vec![expense(1, 1, 300, &[(1, 100), (2, 100), (3, 100)])];
        let participants_before = participants.clone();
        let expenses_before = expenses.clone();

        let _ = BalanceCalculator::derive(&participants, &expenses).expect("derive");

        assert_eq!(participants, participants_before);
        assert_eq!(expenses, expenses_before);
    }
}
