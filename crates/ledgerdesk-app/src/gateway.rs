// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::{
    Game, Group, GroupFormInput, GroupId, HistoryId, HistoryQuery, HistoryRecord, TypeOption,
    UpdatePayload, UserGroup, UserId,
};

/// Backend operations the history screen depends on. Implementations own
/// transport, auth headers and wire formats.
pub trait LedgerGateway {
    /// `false` means the session is gone; callers drop the pending fetch quietly.
    fn require_authenticated(&mut self) -> Result<bool>;
    /// Full replacement of the working collection.
    fn fetch_records(&mut self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>>;
    fn fetch_type_options(&mut self) -> Result<Vec<TypeOption>>;
    fn fetch_games(&mut self) -> Result<Vec<Game>>;
    fn fetch_user_groups(&mut self, user_id: UserId) -> Result<Vec<UserGroup>>;
    fn submit_update(&mut self, payload: &UpdatePayload) -> Result<()>;
    fn submit_delete(&mut self, ids: &[HistoryId]) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupCreateOutcome {
    Created,
    NameTaken,
}

pub trait GroupGateway: LedgerGateway {
    fn list_groups(&mut self) -> Result<Vec<Group>>;
    fn create_group(&mut self, input: &GroupFormInput) -> Result<GroupCreateOutcome>;
    fn update_group(&mut self, id: GroupId, input: &GroupFormInput) -> Result<()>;
    fn delete_group(&mut self, id: GroupId) -> Result<()>;
}
