//! Strongly typed identifiers for customers, rewards, redemptions and ledger
//! entries.
//!
//! All identifiers wrap a UUID and reject the nil UUID, which callers
//! occasionally send as a placeholder.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised when parsing an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// The input was not a UUID.
    #[error("{kind} must be a valid UUID")]
    Malformed {
        /// Human-readable identifier kind.
        kind: &'static str,
    },
    /// The input was the nil UUID.
    #[error("{kind} must not be the nil UUID")]
    Nil {
        /// Human-readable identifier kind.
        kind: &'static str,
    },
}

macro_rules! define_identifier {
    ($(#[$outer:meta])* $name:ident, $kind:literal) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "Uuid", into = "Uuid")]
        pub struct $name(Uuid);

        impl $name {
            /// Human-readable name used in validation messages.
            pub const KIND: &'static str = $kind;

            /// Validate and wrap an existing UUID.
            pub fn new(uuid: Uuid) -> Result<Self, IdentifierError> {
                if uuid.is_nil() {
                    return Err(IdentifierError::Nil { kind: Self::KIND });
                }
                Ok(Self(uuid))
            }

            /// Parse the textual form of the identifier.
            pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
                let uuid = Uuid::parse_str(raw.trim())
                    .map_err(|_| IdentifierError::Malformed { kind: Self::KIND })?;
                Self::new(uuid)
            }

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl TryFrom<Uuid> for $name {
            type Error = IdentifierError;

            fn try_from(value: Uuid) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

define_identifier!(
    /// Customer owning a points ledger. Customer records live outside this
    /// service; only the identifier is referenced.
    CustomerId,
    "customer id"
);
define_identifier!(
    /// Reward catalogue item identifier.
    RewardId,
    "reward id"
);
define_identifier!(
    /// Redemption record identifier.
    RedemptionId,
    "redemption id"
);
define_identifier!(
    /// Ledger entry identifier.
    LedgerEntryId,
    "ledger entry id"
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn nil_uuid_is_rejected() {
        let err = CustomerId::new(Uuid::nil()).expect_err("nil rejected");
        assert_eq!(err, IdentifierError::Nil { kind: "customer id" });
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    fn malformed_input_is_rejected(#[case] raw: &str) {
        let err = RewardId::parse(raw).expect_err("malformed rejected");
        assert_eq!(err.to_string(), "reward id must be a valid UUID");
    }

    #[rstest]
    fn parse_trims_whitespace() {
        let uuid = Uuid::new_v4();
        let id = RedemptionId::parse(&format!(" {uuid} ")).expect("valid id");
        assert_eq!(id.as_uuid(), &uuid);
    }

    #[rstest]
    fn serde_uses_plain_uuid_strings() {
        let id = LedgerEntryId::random();
        let value = serde_json::to_value(id).expect("serialise");
        assert_eq!(value, serde_json::Value::String(id.to_string()));

        let nil = serde_json::to_value(Uuid::nil()).expect("serialise nil");
        assert!(serde_json::from_value::<LedgerEntryId>(nil).is_err());
    }
}
