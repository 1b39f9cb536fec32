//! Redemption records, codes and the status state machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};

use super::{CustomerId, Points, RedemptionId, RewardId};

/// Prefix of every redemption code.
pub const REDEMPTION_CODE_PREFIX: &str = "RDM";

/// Length of the random suffix of a redemption code.
pub const REDEMPTION_CODE_SUFFIX_LEN: usize = 8;

/// Validation errors for redemption values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RedemptionValidationError {
    /// The status string is not one of the known values.
    #[error("unknown redemption status: {0}")]
    UnknownStatus(String),
    /// The code does not follow `RDM-YYYYMMDD-XXXXXXXX`.
    #[error("malformed redemption code: {0}")]
    MalformedCode(String),
}

/// Lifecycle state of a redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedemptionStatus {
    /// Created by a successful redemption; awaiting review.
    Pending,
    /// Accepted; terminal with no side effects.
    Approved,
    /// Refused; terminal, refunds points and restores stock once.
    Rejected,
}

/// Refused status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("redemption cannot move from {from} to {to}")]
pub struct StatusTransitionError {
    /// Current status.
    pub from: RedemptionStatus,
    /// Requested status.
    pub to: RedemptionStatus,
}

impl RedemptionStatus {
    /// Stable storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Whether no further transition changes the outcome.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Check that a record in this status may be moved to `next`.
    ///
    /// `PENDING` may move to either terminal status, and a terminal status
    /// may be resubmitted unchanged. Moving back to `PENDING` or between the
    /// two terminal statuses is refused.
    ///
    /// # Examples
    /// ```
    /// use rewards_backend::domain::RedemptionStatus;
    ///
    /// assert!(RedemptionStatus::Pending.check_transition(RedemptionStatus::Rejected).is_ok());
    /// assert!(RedemptionStatus::Rejected.check_transition(RedemptionStatus::Rejected).is_ok());
    /// assert!(RedemptionStatus::Approved.check_transition(RedemptionStatus::Rejected).is_err());
    /// ```
    pub fn check_transition(self, next: Self) -> Result<(), StatusTransitionError> {
        let allowed = match (self, next) {
            (_, Self::Pending) => false,
            (Self::Pending, _) => true,
            // Both terminal states are final: an approved redemption is never
            // refunded by a later rejection, and a rejected one is never
            // re-approved without its points. Resubmission is a status no-op.
            (from, to) => from == to,
        };
        if allowed {
            Ok(())
        } else {
            Err(StatusTransitionError {
                from: self,
                to: next,
            })
        }
    }

    /// Whether moving from `self` to `next` must refund points and restore
    /// stock. Fires on entry into `REJECTED` only, so repeated rejections
    /// never refund twice.
    #[must_use]
    pub fn requires_compensation(self, next: Self) -> bool {
        self != Self::Rejected && next == Self::Rejected
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedemptionStatus {
    type Err = RedemptionValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(RedemptionValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Human-traceable redemption code, `RDM-YYYYMMDD-XXXXXXXX`.
///
/// Uniqueness rests on the random suffix plus a unique index in storage; a
/// collision surfaces as a conflict rather than being retried.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RedemptionCode(String);

impl RedemptionCode {
    /// Generate a code dated `at` with a fresh random suffix.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use rewards_backend::domain::RedemptionCode;
    ///
    /// let at = Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).single().expect("valid date");
    /// let code = RedemptionCode::generate(at);
    /// assert!(code.as_str().starts_with("RDM-20260309-"));
    /// ```
    #[must_use]
    pub fn generate(at: DateTime<Utc>) -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(REDEMPTION_CODE_SUFFIX_LEN)
            .map(|byte| char::from(byte).to_ascii_uppercase())
            .collect();
        Self(format!(
            "{REDEMPTION_CODE_PREFIX}-{}-{suffix}",
            at.format("%Y%m%d")
        ))
    }

    /// Validate a stored or client-supplied code.
    pub fn parse(raw: impl Into<String>) -> Result<Self, RedemptionValidationError> {
        let raw = raw.into();
        if Self::is_well_formed(&raw) {
            Ok(Self(raw))
        } else {
            Err(RedemptionValidationError::MalformedCode(raw))
        }
    }

    fn is_well_formed(raw: &str) -> bool {
        let mut parts = raw.splitn(3, '-');
        let (Some(prefix), Some(date), Some(suffix)) = (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        prefix == REDEMPTION_CODE_PREFIX
            && date.len() == 8
            && date.bytes().all(|b| b.is_ascii_digit())
            && suffix.len() == REDEMPTION_CODE_SUFFIX_LEN
            && suffix
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RedemptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RedemptionCode> for String {
    fn from(value: RedemptionCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for RedemptionCode {
    type Error = RedemptionValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// A customer's exchange of points for a reward.
///
/// `points_redeemed` is a snapshot of the reward's cost at redemption time;
/// later catalogue price changes do not affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRecord {
    pub id: RedemptionId,
    pub customer_id: CustomerId,
    pub reward_id: RewardId,
    pub points_redeemed: u32,
    pub redemption_code: RedemptionCode,
    pub status: RedemptionStatus,
    pub redemption_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RedemptionRecord {
    /// Fresh `PENDING` record stamped with `now`.
    pub fn pending(
        customer_id: CustomerId,
        reward_id: RewardId,
        points_redeemed: u32,
        redemption_code: RedemptionCode,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RedemptionId::random(),
            customer_id,
            reward_id,
            points_redeemed,
            redemption_code,
            status: RedemptionStatus::Pending,
            redemption_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Points redeemed as a ledger amount.
    #[must_use]
    pub fn points(&self) -> Points {
        Points::from(self.points_redeemed)
    }

    /// Copy of this record moved to `status` at `now`.
    #[must_use]
    pub fn with_status(mut self, status: RedemptionStatus, now: DateTime<Utc>) -> Self {
        self.status = status;
        self.updated_at = now;
        self
    }
}

/// Optional listing filters; unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedemptionFilter {
    pub customer_id: Option<CustomerId>,
    pub status: Option<RedemptionStatus>,
}

impl RedemptionFilter {
    /// Whether `record` satisfies every set field.
    #[must_use]
    pub fn matches(&self, record: &RedemptionRecord) -> bool {
        self.customer_id.is_none_or(|id| id == record.customer_id)
            && self.status.is_none_or(|status| status == record.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    use RedemptionStatus::{Approved, Pending, Rejected};

    #[rstest]
    #[case(Pending, Approved, true)]
    #[case(Pending, Rejected, true)]
    #[case(Approved, Approved, true)]
    #[case(Rejected, Rejected, true)]
    #[case(Pending, Pending, false)]
    #[case(Approved, Rejected, false)]
    #[case(Rejected, Approved, false)]
    #[case(Approved, Pending, false)]
    #[case(Rejected, Pending, false)]
    fn transition_table(
        #[case] from: RedemptionStatus,
        #[case] to: RedemptionStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.check_transition(to).is_ok(), allowed);
    }

    #[rstest]
    #[case(Pending, Rejected, true)]
    #[case(Approved, Rejected, true)]
    #[case(Rejected, Rejected, false)]
    #[case(Pending, Approved, false)]
    fn compensation_guard(
        #[case] from: RedemptionStatus,
        #[case] to: RedemptionStatus,
        #[case] expected: bool,
    ) {
        assert_eq!(from.requires_compensation(to), expected);
    }

    #[rstest]
    fn generated_codes_are_well_formed() {
        let at = Utc
            .with_ymd_and_hms(2026, 10, 19, 8, 30, 0)
            .single()
            .expect("valid date");
        for _ in 0..32 {
            let code = RedemptionCode::generate(at);
            assert!(code.as_str().starts_with("RDM-20261019-"));
            assert_eq!(RedemptionCode::parse(code.as_str()).expect("parses"), code);
        }
    }

    #[rstest]
    #[case("RDM-2026101-ABCDEFGH")]
    #[case("RDM-20261019-abcdefgh")]
    #[case("XYZ-20261019-ABCDEFGH")]
    #[case("RDM-20261019-ABCDEFG")]
    #[case("RDM20261019ABCDEFGH")]
    fn malformed_codes_are_rejected(#[case] raw: &str) {
        assert!(RedemptionCode::parse(raw).is_err());
    }

    #[rstest]
    #[case("PENDING", Pending)]
    #[case("APPROVED", Approved)]
    #[case("REJECTED", Rejected)]
    fn status_round_trips_storage_form(#[case] raw: &str, #[case] status: RedemptionStatus) {
        assert_eq!(raw.parse::<RedemptionStatus>().expect("known"), status);
        assert_eq!(status.to_string(), raw);
    }

    #[rstest]
    fn filter_matches_set_fields_only() {
        let now = Utc::now();
        let record = RedemptionRecord::pending(
            CustomerId::random(),
            RewardId::random(),
            100,
            RedemptionCode::generate(now),
            now,
        );
        assert!(RedemptionFilter::default().matches(&record));
        assert!(
            RedemptionFilter {
                customer_id: Some(record.customer_id),
                status: Some(Pending),
            }
            .matches(&record)
        );
        assert!(
            !RedemptionFilter {
                customer_id: None,
                status: Some(Rejected),
            }
            .matches(&record)
        );
    }
}
