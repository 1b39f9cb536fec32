//! Append-only points ledger entries.
//!
//! A customer's balance is the sum of the signed amounts of their entries.
//! Credits carry positive amounts and debits negative ones; entries are never
//! updated or deleted once written.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CustomerId, LedgerEntryId, Points};

/// Reference module recorded on entries written by the redemption workflow.
pub const REDEMPTION_REFERENCE_MODULE: &str = "REDEEM";

/// Reference module recorded on entries written by manual point awards.
pub const AWARD_REFERENCE_MODULE: &str = "AWARD";

/// Validation errors for ledger entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerValidationError {
    /// Entries must move a non-zero number of points.
    #[error("ledger entry amount must not be zero")]
    ZeroAmount,
    /// The amount's sign disagrees with the direction.
    #[error("{direction} entries must carry a {expected} amount")]
    SignMismatch {
        /// Declared direction.
        direction: LedgerDirection,
        /// Sign the direction requires.
        expected: &'static str,
    },
    /// The description was blank.
    #[error("ledger entry description must not be empty")]
    EmptyDescription,
    /// The reference module was blank.
    #[error("ledger entry reference module must not be empty")]
    EmptyReferenceModule,
    /// The stored direction is not one of the known values.
    #[error("unknown ledger direction: {0}")]
    UnknownDirection(String),
}

/// Whether an entry adds points to or removes points from a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerDirection {
    /// Points added; amount is positive.
    Credit,
    /// Points removed; amount is negative.
    Debit,
}

impl LedgerDirection {
    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "CREDIT",
            Self::Debit => "DEBIT",
        }
    }

    fn accepts(self, amount: Points) -> bool {
        match self {
            Self::Credit => amount.is_positive(),
            Self::Debit => amount.is_negative(),
        }
    }

    fn expected_sign(self) -> &'static str {
        match self {
            Self::Credit => "positive",
            Self::Debit => "negative",
        }
    }
}

impl fmt::Display for LedgerDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedgerDirection {
    type Err = LedgerValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREDIT" => Ok(Self::Credit),
            "DEBIT" => Ok(Self::Debit),
            other => Err(LedgerValidationError::UnknownDirection(other.to_owned())),
        }
    }
}

/// Business operation that produced a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerReference {
    /// Originating module, for example `REDEEM`.
    pub module: String,
    /// Identifier of the originating record.
    pub id: Uuid,
    /// Human-facing code of the originating record.
    pub code: String,
}

impl LedgerReference {
    /// Reference to a redemption record.
    #[must_use]
    pub fn redemption(id: Uuid, code: impl Into<String>) -> Self {
        Self {
            module: REDEMPTION_REFERENCE_MODULE.to_owned(),
            id,
            code: code.into(),
        }
    }
}

/// Input payload for [`LedgerEntry::new`].
#[derive(Debug, Clone)]
pub struct LedgerEntryDraft {
    pub id: LedgerEntryId,
    pub customer_id: CustomerId,
    pub amount: Points,
    pub direction: LedgerDirection,
    pub description: String,
    pub reference: LedgerReference,
    pub created_at: DateTime<Utc>,
}

/// Immutable ledger entry.
///
/// ## Invariants
/// - `amount` is non-zero and its sign matches `direction`.
/// - `description` and `reference.module` are non-blank.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use rewards_backend::domain::{CustomerId, LedgerEntry, LedgerReference, Points};
/// use uuid::Uuid;
///
/// let entry = LedgerEntry::debit(
///     CustomerId::random(),
///     Points::from(100_u32),
///     "Redeemed voucher",
///     LedgerReference::redemption(Uuid::new_v4(), "RDM-20260101-ABCDEFGH"),
///     Utc::now(),
/// )
/// .expect("valid debit");
/// assert!(entry.amount().is_negative());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    id: LedgerEntryId,
    customer_id: CustomerId,
    amount: Points,
    direction: LedgerDirection,
    description: String,
    reference: LedgerReference,
    created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Validate a fully specified entry, typically one read back from storage.
    pub fn new(draft: LedgerEntryDraft) -> Result<Self, LedgerValidationError> {
        let LedgerEntryDraft {
            id,
            customer_id,
            amount,
            direction,
            description,
            reference,
            created_at,
        } = draft;

        if amount == Points::ZERO {
            return Err(LedgerValidationError::ZeroAmount);
        }
        if !direction.accepts(amount) {
            return Err(LedgerValidationError::SignMismatch {
                direction,
                expected: direction.expected_sign(),
            });
        }
        if description.trim().is_empty() {
            return Err(LedgerValidationError::EmptyDescription);
        }
        if reference.module.trim().is_empty() {
            return Err(LedgerValidationError::EmptyReferenceModule);
        }

        Ok(Self {
            id,
            customer_id,
            amount,
            direction,
            description,
            reference,
            created_at,
        })
    }

    /// New credit entry adding `magnitude` points.
    pub fn credit(
        customer_id: CustomerId,
        magnitude: Points,
        description: impl Into<String>,
        reference: LedgerReference,
        created_at: DateTime<Utc>,
    ) -> Result<Self, LedgerValidationError> {
        Self::new(LedgerEntryDraft {
            id: LedgerEntryId::random(),
            customer_id,
            amount: magnitude,
            direction: LedgerDirection::Credit,
            description: description.into(),
            reference,
            created_at,
        })
    }

    /// New debit entry removing `magnitude` points.
    pub fn debit(
        customer_id: CustomerId,
        magnitude: Points,
        description: impl Into<String>,
        reference: LedgerReference,
        created_at: DateTime<Utc>,
    ) -> Result<Self, LedgerValidationError> {
        Self::new(LedgerEntryDraft {
            id: LedgerEntryId::random(),
            customer_id,
            amount: -magnitude,
            direction: LedgerDirection::Debit,
            description: description.into(),
            reference,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> LedgerEntryId {
        self.id
    }

    #[must_use]
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Signed amount; negative for debits.
    #[must_use]
    pub fn amount(&self) -> Points {
        self.amount
    }

    #[must_use]
    pub fn direction(&self) -> LedgerDirection {
        self.direction
    }

    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    #[must_use]
    pub fn reference(&self) -> &LedgerReference {
        &self.reference
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn reference() -> LedgerReference {
        LedgerReference::redemption(Uuid::new_v4(), "RDM-20260101-ABCDEFGH")
    }

    #[rstest]
    fn debit_negates_magnitude(reference: LedgerReference) {
        let entry = LedgerEntry::debit(
            CustomerId::random(),
            Points::from(40_u32),
            "Redeemed mug",
            reference,
            Utc::now(),
        )
        .expect("valid debit");
        assert_eq!(entry.amount(), -Points::from(40_u32));
        assert_eq!(entry.direction(), LedgerDirection::Debit);
        assert_eq!(entry.reference().module, REDEMPTION_REFERENCE_MODULE);
    }

    #[rstest]
    fn negative_credit_is_rejected(reference: LedgerReference) {
        let err = LedgerEntry::credit(
            CustomerId::random(),
            -Points::from(1_u32),
            "Refund",
            reference,
            Utc::now(),
        )
        .expect_err("sign mismatch");
        assert_eq!(
            err,
            LedgerValidationError::SignMismatch {
                direction: LedgerDirection::Credit,
                expected: "positive",
            }
        );
    }

    #[rstest]
    fn zero_amount_is_rejected(reference: LedgerReference) {
        let err = LedgerEntry::debit(
            CustomerId::random(),
            Points::ZERO,
            "Nothing",
            reference,
            Utc::now(),
        )
        .expect_err("zero rejected");
        assert_eq!(err, LedgerValidationError::ZeroAmount);
    }

    #[rstest]
    fn blank_description_is_rejected(reference: LedgerReference) {
        let err = LedgerEntry::credit(
            CustomerId::random(),
            Points::from(1_u32),
            "  ",
            reference,
            Utc::now(),
        )
        .expect_err("blank description");
        assert_eq!(err, LedgerValidationError::EmptyDescription);
    }

    #[rstest]
    #[case("CREDIT", LedgerDirection::Credit)]
    #[case("DEBIT", LedgerDirection::Debit)]
    fn direction_parses_storage_form(#[case] raw: &str, #[case] expected: LedgerDirection) {
        assert_eq!(raw.parse::<LedgerDirection>().expect("known"), expected);
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    fn unknown_direction_is_rejected() {
        assert!(matches!(
            "credit".parse::<LedgerDirection>(),
            Err(LedgerValidationError::UnknownDirection(_))
        ));
    }
}
