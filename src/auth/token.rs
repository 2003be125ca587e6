//! The session token kept inside the encrypted auth cookie.

use std::cmp::max;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::OwnerId;

// Two digit hours throughout. The default `OffsetDateTime` serde format
// writes midnight as "0:00:00" and then refuses to parse it back.
time::serde::format_description!(
    expiry_format,
    OffsetDateTime,
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] \
     [offset_hour sign:mandatory]:[offset_minute]:[offset_second]"
);

/// Who a session belongs to and when it lapses.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub owner_id: OwnerId,
    #[serde(with = "expiry_format")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// A token for `owner_id` that lapses `lifetime` after `now`.
    ///
    /// Returns `None` if the expiry cannot be represented.
    pub fn issue(owner_id: OwnerId, now: OffsetDateTime, lifetime: Duration) -> Option<Self> {
        Some(Self {
            owner_id,
            expires_at: now.checked_add(lifetime)?,
        })
    }

    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at
    }

    /// Keep the session alive for at least `lifetime` after `now`.
    ///
    /// A token that already outlives that point keeps its expiry.
    pub fn renew(self, now: OffsetDateTime, lifetime: Duration) -> Option<Self> {
        let renewed = Self::issue(self.owner_id, now, lifetime)?;

        Some(Self {
            expires_at: max(self.expires_at, renewed.expires_at),
            ..renewed
        })
    }
}
