// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::GroupId;

pub const COMMISSION_CEILING: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub commission: f64,
    pub nonpana_payable: f64,
    pub pana_payable: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupFormError {
    NameRequired,
    CommissionRequired,
    CommissionNegative,
    CommissionTooHigh,
    PanaPayableNegative,
}

impl std::fmt::Display for GroupFormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameRequired => f.write_str("group name is required -- enter a name and retry"),
            Self::CommissionRequired => f.write_str("commission is required"),
            Self::CommissionNegative => f.write_str("commission cannot be negative"),
            Self::CommissionTooHigh => f.write_str("commission cannot be 100 or more"),
            Self::PanaPayableNegative => f.write_str("pana payable cannot be negative"),
        }
    }
}

impl std::error::Error for GroupFormError {}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupFormInput {
    pub name: String,
    pub commission: Option<f64>,
    pub pana_payable: Option<f64>,
}

impl GroupFormInput {
    pub fn from_group(group: &Group) -> Self {
        Self {
            name: group.name.clone(),
            commission: Some(group.commission),
            pana_payable: Some(group.pana_payable),
        }
    }

    /// Non-pana payout follows the commission and is never typed in.
    pub fn nonpana_payable(&self) -> Option<f64> {
        self.commission
            .filter(|commission| *commission < COMMISSION_CEILING)
            .map(|commission| COMMISSION_CEILING - commission)
    }

    pub fn validate(&self) -> Result<(), GroupFormError> {
        if self.name.trim().is_empty() {
            return Err(GroupFormError::NameRequired);
        }
        let Some(commission) = self.commission else {
            return Err(GroupFormError::CommissionRequired);
        };
        if commission < 0.0 {
            return Err(GroupFormError::CommissionNegative);
        }
        if commission >= COMMISSION_CEILING {
            return Err(GroupFormError::CommissionTooHigh);
        }
        if let Some(pana) = self.pana_payable
            && pana < 0.0
        {
            return Err(GroupFormError::PanaPayableNegative);
        }
        Ok(())
    }
}

pub fn filter_groups<'a>(groups: &'a [Group], query: &str) -> Vec<&'a Group> {
    let query = query.to_lowercase();
    groups
        .iter()
        .filter(|group| group.name.to_lowercase().contains(&query))
        .collect()
}
