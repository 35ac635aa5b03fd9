// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::{Date, Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::filter::{Partition, RecordFilter, TYPE_BUCKETS, filter_records, partition_by_type};
use crate::groups::{Group, GroupFormError, GroupFormInput, filter_groups};
use crate::session::{EditSession, FieldChange, SubmitError};
use crate::{
    Game, GameId, GroupCreateOutcome, GroupGateway, GroupId, HistoryId, HistoryQuery,
    HistoryRecord, LedgerGateway, Notice, SelectionSet, SessionContext, TypeOption, UserGroup,
};

/// State behind the history screen: the fetched collection, its filter key,
/// the search queries, the bulk selection and at most one open edit.
#[derive(Debug, Clone)]
pub struct HistoryDesk {
    context: SessionContext,
    date: Date,
    requested_game: Option<GameId>,
    requested_group: Option<GroupId>,
    game: Option<Game>,
    group: Option<UserGroup>,
    games: Vec<Game>,
    groups: Vec<UserGroup>,
    type_options: Vec<TypeOption>,
    records: Vec<HistoryRecord>,
    filter: RecordFilter,
    selection: SelectionSet,
    edit: Option<EditSession>,
    notice: Option<Notice>,
}

impl HistoryDesk {
    pub fn new(context: SessionContext, date: Date) -> Self {
        Self {
            context,
            date,
            requested_game: None,
            requested_group: None,
            game: None,
            group: None,
            games: Vec::new(),
            groups: Vec::new(),
            type_options: Vec::new(),
            records: Vec::new(),
            filter: RecordFilter::default(),
            selection: SelectionSet::new(),
            edit: None,
            notice: None,
        }
    }

    /// Game and group to pick once the reference lists arrive.
    pub fn with_initial_selection(mut self, game: Option<GameId>, group: Option<GroupId>) -> Self {
        self.requested_game = game;
        self.requested_group = group;
        self
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn date(&self) -> Date {
        self.date
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn group(&self) -> Option<&UserGroup> {
        self.group.as_ref()
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn groups(&self) -> &[UserGroup] {
        &self.groups
    }

    pub fn type_options(&self) -> &[TypeOption] {
        &self.type_options
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn filter(&self) -> &RecordFilter {
        &self.filter
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn edit(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub fn load_reference_data<G: LedgerGateway + ?Sized>(&mut self, gateway: &mut G) {
        if !self.check_session(gateway) {
            return;
        }

        match gateway.fetch_games() {
            Ok(games) => {
                self.games = games;
                if let Some(wanted) = self.requested_game.take() {
                    self.game = self.games.iter().find(|game| game.id == wanted).cloned();
                }
            }
            Err(error) => {
                warn!("fetch games failed: {error:#}");
                self.notice = Some(Notice::error("failed to fetch games"));
            }
        }

        match gateway.fetch_type_options() {
            Ok(types) => {
                self.type_options = types;
                if let Some(session) = self.edit.as_mut() {
                    session.set_type_options(&self.type_options);
                }
            }
            Err(error) => {
                warn!("fetch types failed: {error:#}");
                self.notice = Some(Notice::error("failed to fetch types"));
            }
        }

        match gateway.fetch_user_groups(self.context.user_id) {
            Ok(groups) => {
                self.groups = groups;
                if let Some(wanted) = self.requested_group.take() {
                    self.group = self.groups.iter().find(|group| group.id == wanted).cloned();
                }
            }
            Err(error) => {
                warn!("fetch user groups failed: {error:#}");
                self.notice = Some(Notice::error("failed to load groups"));
            }
        }

        self.refresh(gateway);
    }

    /// The fetch key, once date, game and group are all chosen.
    pub fn query(&self) -> Option<HistoryQuery> {
        let game = self.game.as_ref()?;
        let group = self.group.as_ref()?;
        Some(HistoryQuery {
            user_id: self.context.user_id,
            game_id: game.id,
            date: self.date,
            group_id: group.id,
        })
    }

    pub fn select_date<G: LedgerGateway + ?Sized>(&mut self, gateway: &mut G, date: Date) {
        self.date = date;
        self.refresh(gateway);
    }

    pub fn shift_date<G: LedgerGateway + ?Sized>(&mut self, gateway: &mut G, days: i64) {
        let Some(date) = self.date.checked_add(Duration::days(days)) else {
            return;
        };
        self.select_date(gateway, date);
    }

    pub fn select_game<G: LedgerGateway + ?Sized>(&mut self, gateway: &mut G, id: GameId) {
        let Some(game) = self.games.iter().find(|game| game.id == id).cloned() else {
            return;
        };
        self.game = Some(game);
        self.refresh(gateway);
    }

    pub fn select_group<G: LedgerGateway + ?Sized>(&mut self, gateway: &mut G, id: GroupId) {
        let Some(group) = self.groups.iter().find(|group| group.id == id).cloned() else {
            return;
        };
        self.group = Some(group);
        self.refresh(gateway);
    }

    pub fn cycle_game<G: LedgerGateway + ?Sized>(&mut self, gateway: &mut G, delta: isize) {
        let current = self.game.as_ref().map(|game| game.id);
        let ids = self.games.iter().map(|game| game.id).collect::<Vec<_>>();
        if let Some(next) = rotate(&ids, current, delta) {
            self.select_game(gateway, next);
        }
    }

    pub fn cycle_group<G: LedgerGateway + ?Sized>(&mut self, gateway: &mut G, delta: isize) {
        let current = self.group.as_ref().map(|group| group.id);
        let ids = self.groups.iter().map(|group| group.id).collect::<Vec<_>>();
        if let Some(next) = rotate(&ids, current, delta) {
            self.select_group(gateway, next);
        }
    }

    /// Replaces the whole collection with the backend's current view.
    pub fn refresh<G: LedgerGateway + ?Sized>(&mut self, gateway: &mut G) {
        let Some(query) = self.query() else {
            return;
        };
        if !self.check_session(gateway) {
            return;
        }

        match gateway.fetch_records(&query) {
            Ok(records) => {
                debug!(count = records.len(), "history fetched");
                self.records = records;
            }
            Err(error) => {
                warn!("fetch history failed: {error:#}");
                self.notice = Some(Notice::error("failed to fetch history"));
            }
        }
    }

    pub fn set_number_query(&mut self, query: &str) {
        self.filter.number_query = query.to_owned();
    }

    pub fn set_amount_query(&mut self, query: &str) {
        self.filter.amount_query = query.to_owned();
    }

    pub fn visible_records(&self) -> Vec<&HistoryRecord> {
        filter_records(&self.records, &self.filter)
    }

    pub fn visible_ids(&self) -> Vec<HistoryId> {
        self.visible_records()
            .into_iter()
            .map(|record| record.id)
            .collect()
    }

    pub fn partitions(&self) -> Vec<Partition<'_>> {
        partition_by_type(&self.records, &TYPE_BUCKETS, &self.filter)
    }

    pub fn toggle_selection(&mut self, id: HistoryId) -> bool {
        self.selection.toggle(id)
    }

    pub fn set_select_all(&mut self, checked: bool) {
        if checked {
            let visible = self.visible_ids();
            self.selection.select_all(visible);
        } else {
            self.selection.clear();
        }
    }

    pub fn all_selected(&self) -> bool {
        self.selection.all_selected(self.visible_records().len())
    }

    pub fn delete_selected<G: LedgerGateway + ?Sized>(&mut self, gateway: &mut G) {
        if self.selection.is_empty() {
            return;
        }
        let ids = self.selection.ids();

        match gateway.submit_delete(&ids) {
            Ok(()) => {
                info!(count = ids.len(), "history records deleted");
                self.notice = Some(Notice::success("records deleted"));
                self.selection.clear();
                self.refresh(gateway);
            }
            Err(error) => {
                warn!("bulk delete failed: {error:#}");
                self.notice = Some(Notice::error("failed to delete selected records"));
            }
        }
    }

    pub fn delete_record<G: LedgerGateway + ?Sized>(&mut self, gateway: &mut G, id: HistoryId) {
        match gateway.submit_delete(&[id]) {
            Ok(()) => {
                info!(%id, "history record deleted");
                self.notice = Some(Notice::success("record deleted"));
                self.refresh(gateway);
            }
            Err(error) => {
                warn!("delete of record {id} failed: {error:#}");
                self.notice = Some(Notice::error("failed to delete record"));
            }
        }
    }

    /// Opens a fresh session for `id`, discarding any previous one.
    pub fn open_edit(&mut self, id: HistoryId) -> bool {
        let Some(record) = self.records.iter().find(|record| record.id == id) else {
            return false;
        };
        self.edit = Some(EditSession::start(record, &self.type_options));
        true
    }

    pub fn change_field(&mut self, change: FieldChange) {
        if let Some(session) = self.edit.as_mut() {
            session.change_field(change);
        }
    }

    pub fn cancel_edit(&mut self) {
        if let Some(mut session) = self.edit.take() {
            session.cancel();
        }
    }

    pub fn submit_edit<G: LedgerGateway + ?Sized>(
        &mut self,
        gateway: &mut G,
        now: OffsetDateTime,
    ) -> Result<(), SubmitError> {
        let Some(session) = self.edit.as_mut() else {
            return Err(SubmitError::Closed);
        };

        let payload = match session.begin_submit(&self.context, now) {
            Ok(payload) => payload,
            Err(SubmitError::NoChanges) => {
                self.notice = Some(Notice::error("no changes made to update"));
                return Err(SubmitError::NoChanges);
            }
            Err(error) => return Err(error),
        };

        let outcome = gateway.submit_update(&payload);
        if let Err(error) = &outcome {
            warn!("update of record {} failed: {error:#}", payload.id);
        }

        match session.finish_submit(outcome) {
            Ok(()) => {
                info!(id = %payload.id, "history record updated");
                self.edit = None;
                self.notice = Some(Notice::success("record updated"));
                self.refresh(gateway);
                Ok(())
            }
            Err(error) => {
                self.notice = Some(Notice::error("failed to update record"));
                Err(error)
            }
        }
    }

    fn check_session<G: LedgerGateway + ?Sized>(&mut self, gateway: &mut G) -> bool {
        match gateway.require_authenticated() {
            Ok(true) => true,
            Ok(false) => {
                debug!("session not authenticated; fetch skipped");
                false
            }
            Err(error) => {
                warn!("session check failed: {error:#}");
                self.notice = Some(Notice::error("failed to check session"));
                false
            }
        }
    }
}

fn rotate<T: Copy + PartialEq>(items: &[T], current: Option<T>, delta: isize) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    let len = items.len() as isize;
    let next = match current.and_then(|value| items.iter().position(|item| *item == value)) {
        Some(index) => (index as isize + delta).rem_euclid(len),
        None if delta < 0 => len - 1,
        None => 0,
    };
    Some(items[next as usize])
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupForm {
    pub editing: Option<GroupId>,
    pub input: GroupFormInput,
}

/// State behind the group administration screen.
#[derive(Debug, Clone, Default)]
pub struct GroupDesk {
    groups: Vec<Group>,
    search: String,
    form: Option<GroupForm>,
    notice: Option<Notice>,
}

impl GroupDesk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, query: &str) {
        self.search = query.to_owned();
    }

    pub fn visible(&self) -> Vec<&Group> {
        filter_groups(&self.groups, &self.search)
    }

    pub fn form(&self) -> Option<&GroupForm> {
        self.form.as_ref()
    }

    pub fn form_input_mut(&mut self) -> Option<&mut GroupFormInput> {
        self.form.as_mut().map(|form| &mut form.input)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub fn refresh<G: GroupGateway + ?Sized>(&mut self, gateway: &mut G) {
        match gateway.require_authenticated() {
            Ok(true) => {}
            Ok(false) => return,
            Err(error) => {
                warn!("session check failed: {error:#}");
                self.notice = Some(Notice::error("failed to check session"));
                return;
            }
        }

        match gateway.list_groups() {
            Ok(groups) => self.groups = groups,
            Err(error) => {
                warn!("fetch groups failed: {error:#}");
                self.notice = Some(Notice::error("failed to fetch groups"));
            }
        }
    }

    pub fn open_new_form(&mut self) {
        self.form = Some(GroupForm {
            editing: None,
            input: GroupFormInput::default(),
        });
    }

    pub fn open_edit_form(&mut self, id: GroupId) -> bool {
        let Some(group) = self.groups.iter().find(|group| group.id == id) else {
            return false;
        };
        self.form = Some(GroupForm {
            editing: Some(id),
            input: GroupFormInput::from_group(group),
        });
        true
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
    }

    pub fn submit_form<G: GroupGateway + ?Sized>(
        &mut self,
        gateway: &mut G,
    ) -> Result<(), GroupFormError> {
        let Some(form) = self.form.clone() else {
            return Ok(());
        };
        if let Err(error) = form.input.validate() {
            self.notice = Some(Notice::error(error.to_string()));
            return Err(error);
        }

        let result = match form.editing {
            Some(id) => gateway
                .update_group(id, &form.input)
                .map(|()| Notice::success("group updated")),
            None => gateway
                .create_group(&form.input)
                .map(|outcome| match outcome {
                    GroupCreateOutcome::Created => Notice::success("group added"),
                    GroupCreateOutcome::NameTaken => Notice::error("group name already exists"),
                }),
        };

        match result {
            Ok(notice) => {
                self.notice = Some(notice);
                self.form = None;
                self.refresh(gateway);
            }
            Err(error) => {
                warn!("save group failed: {error:#}");
                self.notice = Some(Notice::error("failed to save group"));
            }
        }
        Ok(())
    }

    pub fn delete_group<G: GroupGateway + ?Sized>(&mut self, gateway: &mut G, id: GroupId) {
        match gateway.delete_group(id) {
            Ok(()) => {
                info!(%id, "group deleted");
                self.notice = Some(Notice::success("group deleted"));
                self.refresh(gateway);
            }
            Err(error) => {
                warn!("delete group {id} failed: {error:#}");
                self.notice = Some(Notice::error("failed to delete group"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::rotate;

    #[test]
    fn rotate_wraps_both_ways() {
        let items = [1, 2, 3];
        assert_eq!(rotate(&items, Some(3), 1), Some(1));
        assert_eq!(rotate(&items, Some(1), -1), Some(3));
        assert_eq!(rotate(&items, None, 1), Some(1));
        assert_eq!(rotate(&items, None, -1), Some(3));
        assert_eq!(rotate::<i32>(&[], None, 1), None);
    }
}
