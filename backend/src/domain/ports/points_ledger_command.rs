//! Driving port for granting points.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{
    CustomerId, Error, LedgerEntry, LedgerReference, Points, REDEMPTION_REFERENCE_MODULE,
};

/// Request to credit points for a business event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardPointsRequest {
    pub customer_id: CustomerId,
    /// Strictly positive amount to credit.
    pub amount: Points,
    pub description: String,
    pub reference: LedgerReference,
}

impl AwardPointsRequest {
    /// Build the credit entry this request describes.
    ///
    /// Amounts must lie in `(0, Points::MAX_AWARD]`. Entries referencing the
    /// redemption module are written only by the redemption engine.
    pub fn into_entry(self, now: chrono::DateTime<Utc>) -> Result<LedgerEntry, Error> {
        if !self.amount.is_positive() {
            return Err(Error::invalid_request("amount must be positive")
                .with_details(serde_json::json!({ "field": "amount" })));
        }
        if self.amount > Points::MAX_AWARD {
            return Err(Error::invalid_request(format!(
                "amount must not exceed {}",
                Points::MAX_AWARD
            ))
            .with_details(serde_json::json!({ "field": "amount" })));
        }
        if self
            .reference
            .module
            .trim()
            .eq_ignore_ascii_case(REDEMPTION_REFERENCE_MODULE)
        {
            return Err(Error::invalid_request(format!(
                "reference module {REDEMPTION_REFERENCE_MODULE} is reserved for redemptions"
            ))
            .with_details(serde_json::json!({ "field": "referenceModule" })));
        }
        LedgerEntry::credit(
            self.customer_id,
            self.amount,
            self.description,
            self.reference,
            now,
        )
        .map_err(|err| Error::invalid_request(err.to_string()))
    }
}

/// Driving port for appending credits to a customer's ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PointsLedgerCommand: Send + Sync {
    /// Append a CREDIT entry. Credits take no ledger lock because they cannot
    /// drive a balance negative.
    async fn award_points(&self, request: AwardPointsRequest) -> Result<LedgerEntry, Error>;
}

/// Fixture implementation that validates the request but stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePointsLedgerCommand;

#[async_trait]
impl PointsLedgerCommand for FixturePointsLedgerCommand {
    async fn award_points(&self, request: AwardPointsRequest) -> Result<LedgerEntry, Error> {
        request.into_entry(Utc::now())
    }
}

/// Reference used when an award has no originating record of its own.
#[must_use]
pub fn manual_award_reference(code: impl Into<String>) -> LedgerReference {
    LedgerReference {
        module: crate::domain::AWARD_REFERENCE_MODULE.to_owned(),
        id: Uuid::new_v4(),
        code: code.into(),
    }
}
