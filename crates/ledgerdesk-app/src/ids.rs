// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(HistoryId);
entity_id!(GameId);
entity_id!(BetTypeId);
entity_id!(UserId);
entity_id!(GroupId);

impl BetTypeId {
    /// Placeholder carried by a record whose number admits no bet type.
    pub const NONE: Self = Self(-1);

    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl GroupId {
    /// Sent to the history endpoint when no group is selected.
    pub const ANY: Self = Self(-1);
}
