//! Registry token types (`CandidateId`, `CampaignId`, `AdId`, `ResearchId`) with strict charset.

use crate::errors::CoreError;
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

fn is_token(s: &str) -> bool {
    let len = s.len();
    if !(1..=64).contains(&len) { return false; }
    s.bytes().all(|b| matches!(b,
        b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' |
        b'_' | b'-' | b':' | b'.'
    ))
}

macro_rules! def_token {
    ($name:ident) => {
        #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if is_token(s) { Ok(Self(s.to_string())) } else { Err(CoreError::InvalidToken) }
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                if is_token(&s) { Ok(Self(s)) } else { Err(CoreError::InvalidToken) }
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> String { v.0 }
        }
    }
}

def_token!(CandidateId);
def_token!(CampaignId);
def_token!(AdId);
def_token!(ResearchId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_accept_safe_charset() {
        assert!("cand-7".parse::<CandidateId>().is_ok());
        assert!("CMP:2024.primary_1".parse::<CampaignId>().is_ok());
    }

    #[test]
    fn tokens_reject_empty_spaces_and_overlong() {
        assert_eq!("".parse::<CandidateId>(), Err(CoreError::InvalidToken));
        assert!("has space".parse::<AdId>().is_err());
        assert!("x".repeat(65).parse::<ResearchId>().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip_validates() {
        let id: CandidateId = serde_json::from_str("\"alpha\"").unwrap();
        assert_eq!(id.as_str(), "alpha");
        assert!(serde_json::from_str::<CandidateId>("\"bad token\"").is_err());
    }
}
