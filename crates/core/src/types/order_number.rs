//! Human-readable order numbers of the form `ORD-YYYYMMDD-NNNN`.

use core::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Build an order number for `date` with a four-digit suffix.
    ///
    /// The suffix is reduced modulo 10 000 and zero-padded.
    #[must_use]
    pub fn new(date: NaiveDate, suffix: u16) -> Self {
        Self(format!("ORD-{}-{:04}", date.format("%Y%m%d"), suffix % 10_000))
    }

    /// Whether `s` has the `ORD-YYYYMMDD-NNNN` shape.
    #[must_use]
    pub fn is_well_formed(s: &str) -> bool {
        let mut parts = s.split('-');
        let (Some("ORD"), Some(date), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };

        NaiveDate::parse_from_str(date, "%Y%m%d").is_ok()
            && date.len() == 8
            && suffix.len() == 4
            && suffix.bytes().all(|b| b.is_ascii_digit())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
