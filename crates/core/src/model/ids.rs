use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for parsing an ID from a string (URL parameters, stored values).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to parse {kind} from {raw:?}")]
pub struct ParseIdError {
    kind: &'static str,
    raw: String,
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            #[must_use]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .map(Self::new)
                    .map_err(|_| ParseIdError {
                        kind: stringify!($name),
                        raw: s.to_owned(),
                    })
            }
        }
    };
}

numeric_id!(
    /// Server identifier of a level (not its display number).
    LevelId
);
numeric_id!(
    /// Server identifier of a question.
    QuestionId
);
numeric_id!(
    /// Server identifier of an answer choice.
    AnswerId
);

// ─── Tests ─────────────────────────────────────────────────────────────────────
