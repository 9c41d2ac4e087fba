use crate::model::{Allocations, ExpenseError, Money, ParticipantId, Roster};
use rust_decimal::Decimal;

/// How an expense amount is distributed when it is entered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Even split across the whole roster.
    #[default]
    Equal,
    /// Caller-supplied shares. Members left out owe nothing.
    Custom(Allocations),
}

impl SplitPolicy {
    pub fn resolve(self, roster: &Roster, amount: Money) -> Result<Allocations, ExpenseError> {
        match self {
            Self::Equal => equal_split(roster.ids(), amount),
            Self::Custom(allocations) => Ok(allocations),
        }
    }
}

/// Splits `amount` evenly in whole cents.
///
/// Leftover cents go one each to the first members, and any sub-cent residue
/// to the very first, so the shares always add up to `amount` exactly.
pub fn equal_split<I>(members: I, amount: Money) -> Result<Allocations, ExpenseError>
where
    I: ExactSizeIterator<Item = ParticipantId>,
{
    if amount.is_negative() {
        return Err(ExpenseError::NegativeAmount(amount));
    }
    if members.len() == 0 {
        return Err(ExpenseError::EmptyRoster);
    }

    let cent = Decimal::new(1, 2);
    let count = Decimal::from(members.len());
    let total = amount.as_decimal();
    let whole_cents = (total / cent).trunc();
    let base = (whole_cents / count).floor();
    let remainder = whole_cents - base * count;
    let residue = total - whole_cents * cent;

    let allocations = members
        .enumerate()
        .map(|(idx, member)| {
            let mut cents = base;
            if Decimal::from(idx) < remainder {
                cents += Decimal::ONE;
            }
            let mut share = cents * cent;
            if idx == 0 {
                share += residue;
            }
            (member, Money::from_decimal(share))
        })
        .collect();

    Ok(allocations)
}
