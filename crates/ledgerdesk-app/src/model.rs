// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::ids::*;

/// One wager entry as the backend reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: HistoryId,
    pub created_at: OffsetDateTime,
    /// Creation stamp exactly as the backend sent it; echoed back on update.
    pub created_at_raw: String,
    pub modified_at: Option<OffsetDateTime>,
    pub number: String,
    pub game_id: GameId,
    pub game_name: String,
    pub type_id: BetTypeId,
    pub type_name: String,
    pub amount: f64,
    pub user_id: UserId,
    pub business_date: Date,
    pub group_id: GroupId,
    pub group_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeOption {
    pub id: BetTypeId,
    pub label: String,
}

impl TypeOption {
    pub fn new(id: i64, label: &str) -> Self {
        Self {
            id: BetTypeId::new(id),
            label: label.to_owned(),
        }
    }

    pub fn none() -> Self {
        Self {
            id: BetTypeId::NONE,
            label: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
}

/// A group the signed-in user may record against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: GroupId,
    pub name: String,
}

/// Explicit per-run context; nothing in the core reads ambient process state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub user_id: UserId,
    pub game_id: GameId,
    pub date: Date,
    pub group_id: GroupId,
}

/// Everything the backend needs to overwrite one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePayload {
    pub id: HistoryId,
    pub number: String,
    pub game_id: GameId,
    pub game_name: String,
    pub type_id: BetTypeId,
    pub type_name: String,
    pub amount: f64,
    pub created_at: OffsetDateTime,
    pub created_at_raw: String,
    pub modified_at: OffsetDateTime,
    pub business_date: Date,
    pub user_id: UserId,
    pub group_id: GroupId,
    pub group_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabKind {
    History,
    Groups,
}

impl TabKind {
    pub const ALL: [Self; 2] = [Self::History, Self::Groups];

    pub const fn label(self) -> &'static str {
        match self {
            Self::History => "history",
            Self::Groups => "groups",
        }
    }
}
