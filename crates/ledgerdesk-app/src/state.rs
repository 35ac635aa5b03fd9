// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{GroupId, HistoryId, Notice, TabKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Number,
    Amount,
    GroupName,
}

impl SearchField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Amount => "amount",
            Self::GroupName => "group",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteRecord(HistoryId),
    DeleteSelected,
    DeleteGroup(GroupId),
}

impl ConfirmAction {
    pub fn prompt(self) -> String {
        match self {
            Self::DeleteRecord(id) => format!("delete record {id}?"),
            Self::DeleteSelected => "delete all selected records?".to_owned(),
            Self::DeleteGroup(id) => format!("delete group {id}?"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Nav,
    Search(SearchField),
    Edit,
    Confirm(ConfirmAction),
    GroupForm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub active_tab: TabKind,
    pub status: Option<Notice>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            active_tab: TabKind::History,
            status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextTab,
    PrevTab,
    StartSearch(SearchField),
    OpenEditor,
    OpenGroupForm,
    RequestConfirm(ConfirmAction),
    ExitToNav,
    ShowNotice(Notice),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    TabChanged(TabKind),
    StatusUpdated(Notice),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextTab => self.rotate_tab(1),
            AppCommand::PrevTab => self.rotate_tab(-1),
            AppCommand::StartSearch(field) => self.enter(AppMode::Search(field)),
            AppCommand::OpenEditor => self.enter(AppMode::Edit),
            AppCommand::OpenGroupForm => self.enter(AppMode::GroupForm),
            AppCommand::RequestConfirm(action) => {
                let mut events = self.enter(AppMode::Confirm(action));
                events.push(self.set_status(Notice::info(action.prompt())));
                events
            }
            AppCommand::ExitToNav => {
                self.mode = AppMode::Nav;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ShowNotice(notice) => vec![self.set_status(notice)],
            AppCommand::ClearStatus => {
                self.status = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn enter(&mut self, mode: AppMode) -> Vec<AppEvent> {
        self.mode = mode;
        vec![AppEvent::ModeChanged(self.mode)]
    }

    fn rotate_tab(&mut self, delta: isize) -> Vec<AppEvent> {
        if self.mode != AppMode::Nav {
            return Vec::new();
        }
        let tabs = TabKind::ALL;
        let current = tabs
            .iter()
            .position(|tab| *tab == self.active_tab)
            .unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_tab = tabs[next];
        vec![AppEvent::TabChanged(self.active_tab)]
    }

    fn set_status(&mut self, notice: Notice) -> AppEvent {
        self.status = Some(notice.clone());
        AppEvent::StatusUpdated(notice)
    }
}
