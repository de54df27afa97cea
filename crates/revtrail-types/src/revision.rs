//! Revision numbers.
//!
//! A [`Revision`] identifies one committed state of a tracked document.
//! Revisions are 1-based; revision 1 is the root of the version tree and
//! predates every recorded commit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A 1-based revision number.
///
/// Serializes as a plain JSON number. Zero is rejected on construction and
/// on deserialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Revision(u32);

impl Revision {
    /// The root revision.
    pub const ROOT: Revision = Revision(1);

    /// Create a revision, rejecting zero.
    pub fn new(number: u32) -> Result<Self, TypeError> {
        if number == 0 {
            return Err(TypeError::InvalidRevision(0));
        }
        Ok(Self(number))
    }

    /// The raw revision number.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Returns `true` for revision 1.
    pub fn is_root(self) -> bool {
        self.0 == 1
    }

    /// The immediately preceding revision, or `None` for the root.
    pub fn previous(self) -> Option<Revision> {
        if self.is_root() {
            None
        } else {
            Some(Self(self.0 - 1))
        }
    }

    /// The immediately following revision.
    pub fn next(self) -> Revision {
        Self(self.0 + 1)
    }
}

impl TryFrom<u32> for Revision {
    type Error = TypeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Revision> for u32 {
    fn from(rev: Revision) -> Self {
        rev.0
    }
}

impl FromStr for Revision {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number: u32 = s
            .trim()
            .parse()
            .map_err(|_| TypeError::Serialization(format!("not a revision number: {s:?}")))?;
        Self::new(number)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_is_rejected() {
        assert_eq!(Revision::new(0), Err(TypeError::InvalidRevision(0)));
        assert!(serde_json::from_str::<Revision>("0").is_err());
    }

    #[test]
    fn root_has_no_previous() {
        assert!(Revision::ROOT.is_root());
        assert_eq!(Revision::ROOT.previous(), None);
        assert_eq!(Revision::new(5).unwrap().previous(), Revision::new(4).ok());
    }

    #[test]
    fn serializes_as_plain_number() {
        let rev = Revision::new(7).unwrap();
        assert_eq!(serde_json::to_string(&rev).unwrap(), "7");
        let back: Revision = serde_json::from_str("7").unwrap();
        assert_eq!(back, rev);
    }

    #[test]
    fn parse_from_str() {
        assert_eq!("12".parse::<Revision>().unwrap().get(), 12);
        assert!("abc".parse::<Revision>().is_err());
        assert!("0".parse::<Revision>().is_err());
    }

    #[test]
    fn display_format() {
        assert_eq!(Revision::new(3).unwrap().to_string(), "v3");
    }

    proptest! {
        #[test]
        fn ordering_matches_numbers(a in 1u32..10_000, b in 1u32..10_000) {
            let ra = Revision::new(a).unwrap();
            let rb = Revision::new(b).unwrap();
            prop_assert_eq!(ra.cmp(&rb), a.cmp(&b));
        }
    }
}
