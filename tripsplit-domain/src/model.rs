use indexmap::IndexMap;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(pub u64);

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Exact decimal amount of the trip currency.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);
    /// Currency-rounding tolerance. Magnitudes below it count as settled.
    pub const EPSILON: Self = Self(Decimal::from_parts(1, 0, 0, false, 2));

    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// True when the magnitude is below [`Money::EPSILON`].
    pub fn is_settled(self) -> bool {
        self.abs() < Self::EPSILON
    }

    /// Rounds to whole cents, midpoints away from zero. Amounts that round to
    /// nothing come back as an unsigned zero.
    pub fn round_cents(self) -> Self {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if rounded.is_zero() {
            Self::ZERO
        } else {
            Self(rounded)
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Self)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    id: ParticipantId,
    name: String,
}

impl Participant {
    pub fn new(id: ParticipantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Trip roster in insertion order. Ids are unique; names need not be.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a participant. Returns `false` and leaves the roster unchanged
    /// when the id is already taken.
    pub fn push(&mut self, participant: Participant) -> bool {
        if self.contains(participant.id) {
            return false;
        }
        self.participants.push(participant);
        true
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.get(id).is_some()
    }

    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Participant> {
        self.participants.iter().filter(move |p| p.name == name)
    }

    pub fn ids(&self) -> impl ExactSizeIterator<Item = ParticipantId> + '_ {
        self.participants.iter().map(Participant::id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Participant> {
        self.participants.iter()
    }

    pub fn as_slice(&self) -> &[Participant] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// First id referenced by `expense` (payer or allocation key) that is not
    /// on this roster.
    pub fn first_unknown_reference(&self, expense: &Expense) -> Option<ParticipantId> {
        expense.references().find(|id| !self.contains(*id))
    }
}

impl FromIterator<Participant> for Roster {
    fn from_iter<T: IntoIterator<Item = Participant>>(iter: T) -> Self {
        let mut roster = Self::new();
        for participant in iter {
            roster.push(participant);
        }
        roster
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Participant;
    type IntoIter = std::slice::Iter<'a, Participant>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Portion of an expense owed by each participant, in entry order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Allocations(IndexMap<ParticipantId, Money>);

impl Allocations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, member: ParticipantId, share: Money) -> Option<Money> {
        self.0.insert(member, share)
    }

    pub fn get(&self, member: ParticipantId) -> Option<Money> {
        self.0.get(&member).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParticipantId, Money)> + '_ {
        self.0.iter().map(|(id, share)| (*id, *share))
    }

    pub fn members(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.0.keys().copied()
    }

    pub fn total(&self) -> Money {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ParticipantId, Money)> for Allocations {
    fn from_iter<T: IntoIterator<Item = (ParticipantId, Money)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExpenseError {
    #[error("expense amount must not be negative (got {0})")]
    NegativeAmount(Money),
    #[error("share of participant {member} must not be negative (got {share})")]
    NegativeShare { member: ParticipantId, share: Money },
    #[error("allocations total {allocated} does not match expense amount {amount}")]
    AllocationMismatch { amount: Money, allocated: Money },
    #[error("cannot split an expense across an empty roster")]
    EmptyRoster,
}

/// A single payment: one payer, cost distributed by `allocations`.
///
/// Construction guarantees a non-negative amount, non-negative shares and
/// `allocations.total()` within [`Money::EPSILON`] of `amount`. Deserialized
/// values go through the same checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ExpenseRecord", into = "ExpenseRecord")]
pub struct Expense {
    id: ExpenseId,
    payer: ParticipantId,
    amount: Money,
    allocations: Allocations,
}

#[derive(Clone, Serialize, Deserialize)]
struct ExpenseRecord {
    id: ExpenseId,
    payer: ParticipantId,
    amount: Money,
    allocations: Allocations,
}

impl Expense {
    pub fn try_new(
        id: ExpenseId,
        payer: ParticipantId,
        amount: Money,
        allocations: Allocations,
    ) -> Result<Self, ExpenseError> {
        if amount.is_negative() {
            return Err(ExpenseError::NegativeAmount(amount));
        }
        if let Some((member, share)) = allocations.iter().find(|(_, share)| share.is_negative())
        {
            return Err(ExpenseError::NegativeShare { member, share });
        }
        let allocated = allocations.total();
        if (allocated - amount).abs() > Money::EPSILON {
            return Err(ExpenseError::AllocationMismatch { amount, allocated });
        }

        Ok(Self {
            id,
            payer,
            amount,
            allocations,
        })
    }

    pub fn id(&self) -> ExpenseId {
        self.id
    }

    pub fn payer(&self) -> ParticipantId {
        self.payer
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn allocations(&self) -> &Allocations {
        &self.allocations
    }

    /// Payer followed by every allocation key.
    pub fn references(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        std::iter::once(self.payer).chain(self.allocations.members())
    }
}

impl TryFrom<ExpenseRecord> for Expense {
    type Error = ExpenseError;

    fn try_from(record: ExpenseRecord) -> Result<Self, Self::Error> {
        Self::try_new(record.id, record.payer, record.amount, record.allocations)
    }
}

impl From<Expense> for ExpenseRecord {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            payer: expense.payer,
            amount: expense.amount,
            allocations: expense.allocations,
        }
    }
}

/// Net position per participant: positive is owed money, negative owes money.
pub type MemberBalances = IndexMap<ParticipantId, Money>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
}

/// Proposed payment between two participants, by display name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementTransaction {
    pub from: String,
    pub to: String,
    pub amount: Money,
}
