use crate::{
    model::{
        Expense, MemberBalances, Money, Participant, ParticipantId, SettlementTransaction,
        Transfer,
    },
    services::{BalanceCalculator, SettlementError},
};
use fxhash::FxHashMap;

/// Debt settlement service
///
/// Pairs the largest remaining debtor with the largest remaining creditor
/// until one side runs out. This greedy matching needs at most `n - 1`
/// transfers for `n` participants; it is not guaranteed to be globally
/// minimal for every balance distribution.
#[derive(Clone, Copy, Debug, Default)]
pub struct SettlementEngine;

impl SettlementEngine {
    /// Computes the transactions that settle every participant of the trip.
    ///
    /// # Arguments
    /// * `participants` - Trip roster; its order decides ties between equal balances
    /// * `expenses` - Expenses whose payers and allocation keys are all in `participants`
    ///
    /// # Returns
    /// Transactions by participant name, amounts rounded to cents
    pub fn compute_settlements(
        &self,
        participants: &[Participant],
        expenses: &[Expense],
    ) -> Result<Vec<SettlementTransaction>, SettlementError> {
        let balances = BalanceCalculator::derive(participants, expenses)?;
        Ok(self.transactions_from_balances(participants, &balances))
    }

    /// Same as [`compute_settlements`](Self::compute_settlements) for balances
    /// already derived from the trip. Ids missing from `participants` are skipped.
    pub fn transactions_from_balances(
        &self,
        participants: &[Participant],
        balances: &MemberBalances,
    ) -> Vec<SettlementTransaction> {
        let mut directory: FxHashMap<ParticipantId, &Participant> = FxHashMap::default();
        for participant in participants {
            directory.entry(participant.id()).or_insert(participant);
        }
        let entries: Vec<(&Participant, Money)> = balances
            .iter()
            .filter_map(|(id, balance)| directory.get(id).map(|p| (*p, *balance)))
            .collect();

        let transactions: Vec<SettlementTransaction> = match_debts(&entries)
            .into_iter()
            .map(|(from, to, amount)| SettlementTransaction {
                from: from.name().to_owned(),
                to: to.name().to_owned(),
                amount,
            })
            .collect();

        tracing::debug!(
            participant_count = participants.len(),
            transaction_count = transactions.len(),
            "Settlement computed"
        );

        transactions
    }

    /// Settles an explicit balance table. The table is read, never modified.
    pub fn settle_balances(&self, balances: &MemberBalances) -> Vec<Transfer> {
        let entries: Vec<(ParticipantId, Money)> =
            balances.iter().map(|(id, balance)| (*id, *balance)).collect();

        match_debts(&entries)
            .into_iter()
            .map(|(from, to, amount)| Transfer { from, to, amount })
            .collect()
    }
}

fn match_debts<K: Copy>(entries: &[(K, Money)]) -> Vec<(K, K, Money)> {
    let mut creditors: Vec<(K, Money)> = entries
        .iter()
        .copied()
        .filter(|(_, balance)| *balance > Money::EPSILON)
        .collect();
    let mut debtors: Vec<(K, Money)> = entries
        .iter()
        .copied()
        .filter(|(_, balance)| *balance < -Money::EPSILON)
        .collect();

    // Stable sorts: equal balances keep entry order.
    creditors.sort_by(|a, b| b.1.cmp(&a.1));
    debtors.sort_by(|a, b| a.1.cmp(&b.1));

    let total: Money = entries.iter().map(|(_, balance)| *balance).sum();
    if !total.is_settled() {
        tracing::warn!(
            total = %total,
            creditor_count = creditors.len(),
            debtor_count = debtors.len(),
            "Balances do not sum to zero; remainder stays unsettled"
        );
    }

    let mut transfers = Vec::with_capacity((creditors.len() + debtors.len()).saturating_sub(1));
    let (mut debtor_idx, mut creditor_idx) = (0, 0);

    while debtor_idx < debtors.len() && creditor_idx < creditors.len() {
        let (debtor, debt) = &mut debtors[debtor_idx];
        let (creditor, credit) = &mut creditors[creditor_idx];

        let amount = (-*debt).min(*credit);
        transfers.push((*debtor, *creditor, amount.round_cents()));
        *debt += amount;
        *credit -= amount;

        if debt.is_settled() {
            debtor_idx += 1;
        }
        if credit.is_settled() {
            creditor_idx += 1;
        }
    }

    transfers
}
