//! Newtype wrappers for 64-bit identifiers shared across silos.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rand::RngExt;
use serde::{Deserialize, Serialize};

/// Custom epoch for snowflake ids (2022-01-01T00:00:00Z, milliseconds).
const SNOWFLAKE_EPOCH_MS: i64 = 1_640_995_200_000;

/// Bits reserved for the random tail of a snowflake id.
const SNOWFLAKE_RANDOM_BITS: u32 = 22;

/// Generate a positive, roughly time-ordered 63-bit id.
///
/// Organization ids are allocated by the Control silo before the organization
/// exists in any region, so they cannot come from a region-local sequence.
pub fn snowflake_id() -> i64 {
    let millis = (Utc::now().timestamp_millis() - SNOWFLAKE_EPOCH_MS).max(0);
    let tail: i64 = rand::rng().random_range(0..(1_i64 << SNOWFLAKE_RANDOM_BITS));
    ((millis << SNOWFLAKE_RANDOM_BITS) | tail) & i64::MAX
}

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

id_newtype!(
    /// Identifies a user account (owned by the Control silo).
    UserId
);

id_newtype!(
    /// Identifies an organization (allocated by Control, stored in one Region).
    OrganizationId
);

id_newtype!(
    /// Identifies a slug reservation (owned by the Control silo).
    SlugReservationId
);
