// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ledgerdesk_app::format::{
    format_amount, format_business_date, format_clock, format_modified_clock,
};
use ledgerdesk_app::rules::parse_amount;
use ledgerdesk_app::{
    AppCommand, AppMode, AppState, ConfirmAction, EditField, EditSession, FieldChange, Game,
    Group, GroupDesk, GroupFormInput, GroupGateway, GroupId, HistoryDesk, HistoryId,
    HistoryRecord, Notice, NoticeLevel, SearchField, TabKind,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const EMPTY_VALUE: &str = "--";

/// Backend plus the clock the screens stamp edits with, in UTC.
pub trait AppRuntime: GroupGateway {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupField {
    Name,
    Commission,
    PanaPayable,
}

impl GroupField {
    const ALL: [Self; 3] = [Self::Name, Self::Commission, Self::PanaPayable];

    const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Commission => "commission",
            Self::PanaPayable => "pana payable",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct GroupInputs {
    name: String,
    commission: String,
    pana_payable: String,
}

impl GroupInputs {
    fn from_input(input: &GroupFormInput) -> Self {
        Self {
            name: input.name.clone(),
            commission: input.commission.map(format_amount).unwrap_or_default(),
            pana_payable: input.pana_payable.map(format_amount).unwrap_or_default(),
        }
    }

    fn field_mut(&mut self, field: GroupField) -> &mut String {
        match field {
            GroupField::Name => &mut self.name,
            GroupField::Commission => &mut self.commission,
            GroupField::PanaPayable => &mut self.pana_payable,
        }
    }

    fn field(&self, field: GroupField) -> &str {
        match field {
            GroupField::Name => &self.name,
            GroupField::Commission => &self.commission,
            GroupField::PanaPayable => &self.pana_payable,
        }
    }
}

#[derive(Debug, Clone)]
struct ViewData {
    history: HistoryDesk,
    groups: GroupDesk,
    cursor: usize,
    group_cursor: usize,
    search_input: String,
    edit_field: EditField,
    group_field: GroupField,
    group_inputs: GroupInputs,
    pending_notice: Option<Notice>,
    status_token: u64,
}

impl ViewData {
    fn new(history: HistoryDesk) -> Self {
        Self {
            history,
            groups: GroupDesk::new(),
            cursor: 0,
            group_cursor: 0,
            search_input: String::new(),
            edit_field: EditField::Number,
            group_field: GroupField::Name,
            group_inputs: GroupInputs::default(),
            pending_notice: None,
            status_token: 0,
        }
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    history: HistoryDesk,
    runtime: &mut R,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(history);
    let (internal_tx, internal_rx) = mpsc::channel();

    load_initial(runtime, &mut view_data);
    publish_notices(state, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn load_initial<R: AppRuntime>(runtime: &mut R, view_data: &mut ViewData) {
    view_data.history.load_reference_data(runtime);
    view_data.groups.refresh(runtime);
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    notice: Notice,
) {
    state.dispatch(AppCommand::ShowNotice(notice));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

/// Moves notices raised by the desks onto the status line.
fn publish_notices(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let history = view_data.history.notice().cloned();
    view_data.history.clear_notice();
    let groups = view_data.groups.notice().cloned();
    view_data.groups.clear_notice();
    let pending = view_data.pending_notice.take();

    for notice in [pending, history, groups].into_iter().flatten() {
        emit_status(state, view_data, internal_tx, notice);
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    let quit = match state.mode {
        AppMode::Nav => match state.active_tab {
            TabKind::History => handle_history_nav_key(state, runtime, view_data, key),
            TabKind::Groups => handle_groups_nav_key(state, runtime, view_data, key),
        },
        AppMode::Search(field) => {
            handle_search_key(state, view_data, field, key);
            false
        }
        AppMode::Edit => {
            handle_edit_key(state, runtime, view_data, key);
            false
        }
        AppMode::Confirm(action) => {
            handle_confirm_key(state, runtime, view_data, action, key);
            false
        }
        AppMode::GroupForm => {
            handle_group_form_key(state, runtime, view_data, key);
            false
        }
    };

    publish_notices(state, view_data, internal_tx);
    clamp_cursors(view_data);
    quit
}

fn handle_history_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => {
            state.dispatch(AppCommand::NextTab);
        }
        KeyCode::BackTab => {
            state.dispatch(AppCommand::PrevTab);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let len = history_rows(&view_data.history).len();
            view_data.cursor = step_cursor(view_data.cursor, len, 1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            let len = history_rows(&view_data.history).len();
            view_data.cursor = step_cursor(view_data.cursor, len, -1);
        }
        KeyCode::Char('/') => begin_search(state, view_data, SearchField::Number),
        KeyCode::Char('a') => begin_search(state, view_data, SearchField::Amount),
        KeyCode::Char(' ') => {
            if let Some(id) = cursor_record_id(view_data) {
                view_data.history.toggle_selection(id);
            }
        }
        KeyCode::Char('A') => {
            let checked = !view_data.history.all_selected();
            view_data.history.set_select_all(checked);
        }
        KeyCode::Char('e') => open_editor(state, view_data),
        KeyCode::Char('d') => {
            if let Some(id) = cursor_record_id(view_data) {
                state.dispatch(AppCommand::RequestConfirm(ConfirmAction::DeleteRecord(id)));
            }
        }
        KeyCode::Char('D') => {
            if view_data.history.selection().is_empty() {
                view_data.pending_notice = Some(Notice::info("nothing selected"));
            } else {
                state.dispatch(AppCommand::RequestConfirm(ConfirmAction::DeleteSelected));
            }
        }
        KeyCode::Char('r') => view_data.history.refresh(runtime),
        KeyCode::Char('[') => view_data.history.shift_date(runtime, -1),
        KeyCode::Char(']') => view_data.history.shift_date(runtime, 1),
        KeyCode::Char('g') => view_data.history.cycle_game(runtime, 1),
        KeyCode::Char('G') => view_data.history.cycle_group(runtime, 1),
        _ => {}
    }
    false
}

fn handle_groups_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => {
            state.dispatch(AppCommand::NextTab);
        }
        KeyCode::BackTab => {
            state.dispatch(AppCommand::PrevTab);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let len = view_data.groups.visible().len();
            view_data.group_cursor = step_cursor(view_data.group_cursor, len, 1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            let len = view_data.groups.visible().len();
            view_data.group_cursor = step_cursor(view_data.group_cursor, len, -1);
        }
        KeyCode::Char('/') => begin_search(state, view_data, SearchField::GroupName),
        KeyCode::Char('n') => {
            view_data.groups.open_new_form();
            view_data.group_inputs = GroupInputs::default();
            view_data.group_field = GroupField::Name;
            state.dispatch(AppCommand::OpenGroupForm);
        }
        KeyCode::Char('e') => {
            if let Some(id) = cursor_group_id(view_data)
                && view_data.groups.open_edit_form(id)
                && let Some(form) = view_data.groups.form()
            {
                view_data.group_inputs = GroupInputs::from_input(&form.input);
                view_data.group_field = GroupField::Name;
                state.dispatch(AppCommand::OpenGroupForm);
            }
        }
        KeyCode::Char('d') => {
            if let Some(id) = cursor_group_id(view_data) {
                state.dispatch(AppCommand::RequestConfirm(ConfirmAction::DeleteGroup(id)));
            }
        }
        KeyCode::Char('r') => view_data.groups.refresh(runtime),
        _ => {}
    }
    false
}

fn begin_search(state: &mut AppState, view_data: &mut ViewData, field: SearchField) {
    view_data.search_input = match field {
        SearchField::Number => view_data.history.filter().number_query.clone(),
        SearchField::Amount => view_data.history.filter().amount_query.clone(),
        SearchField::GroupName => view_data.groups.search().to_owned(),
    };
    state.dispatch(AppCommand::StartSearch(field));
}

fn handle_search_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    field: SearchField,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Enter => {
            state.dispatch(AppCommand::ExitToNav);
            return;
        }
        KeyCode::Esc => {
            view_data.search_input.clear();
            apply_search(view_data, field);
            state.dispatch(AppCommand::ExitToNav);
            return;
        }
        KeyCode::Backspace => {
            view_data.search_input.pop();
        }
        KeyCode::Char(ch) => view_data.search_input.push(ch),
        _ => return,
    }
    apply_search(view_data, field);
}

fn apply_search(view_data: &mut ViewData, field: SearchField) {
    match field {
        SearchField::Number => view_data.history.set_number_query(&view_data.search_input),
        SearchField::Amount => view_data.history.set_amount_query(&view_data.search_input),
        SearchField::GroupName => view_data.groups.set_search(&view_data.search_input),
    }
}

fn open_editor(state: &mut AppState, view_data: &mut ViewData) {
    let Some(id) = cursor_record_id(view_data) else {
        return;
    };
    if view_data.history.open_edit(id) {
        view_data.edit_field = EditField::Number;
        state.dispatch(AppCommand::OpenEditor);
    }
}

fn handle_edit_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.history.cancel_edit();
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Tab => view_data.edit_field = step_edit_field(view_data.edit_field, 1),
        KeyCode::BackTab => view_data.edit_field = step_edit_field(view_data.edit_field, -1),
        KeyCode::Enter => {
            let now = runtime.now();
            if view_data.history.submit_edit(runtime, now).is_ok() {
                state.dispatch(AppCommand::ExitToNav);
            }
        }
        KeyCode::Left => cycle_edit_choice(view_data, -1),
        KeyCode::Right => cycle_edit_choice(view_data, 1),
        KeyCode::Backspace => edit_text(view_data, None),
        KeyCode::Char(ch) => edit_text(view_data, Some(ch)),
        _ => {}
    }
}

fn step_edit_field(field: EditField, delta: isize) -> EditField {
    let fields = EditField::ALL;
    let current = fields.iter().position(|item| *item == field);
    step_index(current, fields.len(), delta)
        .map(|index| fields[index])
        .unwrap_or(field)
}

fn edit_text(view_data: &mut ViewData, ch: Option<char>) {
    let Some(session) = view_data.history.edit() else {
        return;
    };
    let change = match view_data.edit_field {
        EditField::Number => {
            let mut value = session.current().number.clone();
            apply_keystroke(&mut value, ch);
            FieldChange::Number(value)
        }
        EditField::Amount => {
            let mut value = session.amount_input().to_owned();
            apply_keystroke(&mut value, ch);
            FieldChange::Amount(value)
        }
        EditField::Game | EditField::Type => return,
    };
    view_data.history.change_field(change);
}

fn apply_keystroke(value: &mut String, ch: Option<char>) {
    match ch {
        Some(ch) => value.push(ch),
        None => {
            value.pop();
        }
    }
}

fn cycle_edit_choice(view_data: &mut ViewData, delta: isize) {
    let Some(session) = view_data.history.edit() else {
        return;
    };
    let change = match view_data.edit_field {
        EditField::Game => {
            let games = view_data.history.games();
            let current = games
                .iter()
                .position(|game| game.id == session.current().game_id);
            let Some(index) = step_index(current, games.len(), delta) else {
                return;
            };
            FieldChange::Game {
                id: games[index].id,
                name: games[index].name.clone(),
            }
        }
        EditField::Type => {
            let options = session.eligible_types();
            let current = options
                .iter()
                .position(|option| option.id == session.current().type_id);
            let Some(index) = step_index(current, options.len(), delta) else {
                return;
            };
            FieldChange::Type(options[index].clone())
        }
        EditField::Number | EditField::Amount => return,
    };
    view_data.history.change_field(change);
}

fn handle_confirm_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    action: ConfirmAction,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            state.dispatch(AppCommand::ClearStatus);
            match action {
                ConfirmAction::DeleteRecord(id) => view_data.history.delete_record(runtime, id),
                ConfirmAction::DeleteSelected => view_data.history.delete_selected(runtime),
                ConfirmAction::DeleteGroup(id) => view_data.groups.delete_group(runtime, id),
            }
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            state.dispatch(AppCommand::ClearStatus);
            state.dispatch(AppCommand::ExitToNav);
        }
        _ => {}
    }
}

fn handle_group_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.groups.cancel_form();
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Tab => view_data.group_field = step_group_field(view_data.group_field, 1),
        KeyCode::BackTab => view_data.group_field = step_group_field(view_data.group_field, -1),
        KeyCode::Enter => {
            if view_data.groups.submit_form(runtime).is_ok() && view_data.groups.form().is_none()
            {
                state.dispatch(AppCommand::ExitToNav);
            }
        }
        KeyCode::Backspace => {
            view_data.group_inputs.field_mut(view_data.group_field).pop();
            apply_group_inputs(view_data);
        }
        KeyCode::Char(ch) => {
            view_data
                .group_inputs
                .field_mut(view_data.group_field)
                .push(ch);
            apply_group_inputs(view_data);
        }
        _ => {}
    }
}

fn step_group_field(field: GroupField, delta: isize) -> GroupField {
    let fields = GroupField::ALL;
    let current = fields.iter().position(|item| *item == field);
    step_index(current, fields.len(), delta)
        .map(|index| fields[index])
        .unwrap_or(field)
}

fn apply_group_inputs(view_data: &mut ViewData) {
    let inputs = &view_data.group_inputs;
    if let Some(input) = view_data.groups.form_input_mut() {
        input.name = inputs.name.clone();
        input.commission = parse_amount(&inputs.commission);
        input.pana_payable = parse_amount(&inputs.pana_payable);
    }
}

fn step_index(current: Option<usize>, len: usize, delta: isize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let len = len as isize;
    let next = match current {
        Some(index) => (index as isize + delta).rem_euclid(len),
        None if delta < 0 => len - 1,
        None => 0,
    };
    Some(next as usize)
}

fn step_cursor(cursor: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = cursor as isize + delta;
    next.clamp(0, len as isize - 1) as usize
}

/// Row order on screen: bucket by bucket, records in fetch order.
fn history_rows(desk: &HistoryDesk) -> Vec<HistoryId> {
    desk.partitions()
        .iter()
        .flat_map(|partition| partition.records.iter().map(|record| record.id))
        .collect()
}

fn cursor_record_id(view_data: &ViewData) -> Option<HistoryId> {
    history_rows(&view_data.history)
        .get(view_data.cursor)
        .copied()
}

fn cursor_group_id(view_data: &ViewData) -> Option<GroupId> {
    view_data
        .groups
        .visible()
        .get(view_data.group_cursor)
        .map(|group| group.id)
}

fn clamp_cursors(view_data: &mut ViewData) {
    let rows = history_rows(&view_data.history).len();
    view_data.cursor = view_data.cursor.min(rows.saturating_sub(1));
    let groups = view_data.groups.visible().len();
    view_data.group_cursor = view_data.group_cursor.min(groups.saturating_sub(1));
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tab_titles = TabKind::ALL
        .iter()
        .map(|tab| tab.label().to_owned())
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("ledgerdesk").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    frame.render_widget(Paragraph::new(context_line(state, view_data)), layout[1]);

    match state.active_tab {
        TabKind::History => render_history(frame, layout[2], view_data),
        TabKind::Groups => render_groups(frame, layout[2], view_data),
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(status_color(state)))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[3]);

    if state.mode == AppMode::Edit
        && let Some(session) = view_data.history.edit()
    {
        let area = centered_rect(60, 50, frame.area());
        frame.render_widget(Clear, area);
        let text = edit_overlay_text(session, view_data.edit_field, view_data.history.games());
        let overlay = Paragraph::new(text).block(
            Block::default()
                .title(format!("edit record {}", session.original().id))
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(overlay, area);
    }

    if state.mode == AppMode::GroupForm && view_data.groups.form().is_some() {
        let area = centered_rect(56, 40, frame.area());
        frame.render_widget(Clear, area);
        let title = match view_data.groups.form().and_then(|form| form.editing) {
            Some(id) => format!("edit group {id}"),
            None => "new group".to_owned(),
        };
        let overlay = Paragraph::new(group_form_text(view_data))
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(overlay, area);
    }
}

fn render_history(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let partitions = view_data.history.partitions();
    let count = partitions.len().max(1) as u32;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            partitions
                .iter()
                .map(|_| Constraint::Ratio(1, count))
                .collect::<Vec<_>>(),
        )
        .split(area);

    let selection = view_data.history.selection();
    let mut offset = 0;
    for (partition, chunk) in partitions.iter().zip(chunks.iter()) {
        let rows = partition
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let style = if offset + index == view_data.cursor {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                Row::new(record_cells(record, selection.is_selected(record.id))).style(style)
            })
            .collect::<Vec<_>>();
        offset += partition.records.len();

        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Length(8),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(10),
            ],
        )
        .header(
            Row::new(["", "number", "amount", "created", "modified"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ({})", partition.label(), partition.records.len())),
        );
        frame.render_widget(table, *chunk);
    }
}

fn render_groups(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let rows = view_data
        .groups
        .visible()
        .into_iter()
        .enumerate()
        .map(|(index, group)| {
            let style = if index == view_data.group_cursor {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Row::new(group_cells(group)).style(style)
        })
        .collect::<Vec<_>>();

    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(12),
            Constraint::Length(16),
            Constraint::Length(14),
        ],
    )
    .header(
        Row::new(["name", "commission", "non-pana payable", "pana payable"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title("groups"));
    frame.render_widget(table, area);
}

fn record_cells(record: &HistoryRecord, selected: bool) -> [String; 5] {
    [
        if selected { "[x]" } else { "[ ]" }.to_owned(),
        record.number.clone(),
        format_amount(record.amount),
        format_clock(record.created_at),
        format_modified_clock(record.modified_at),
    ]
}

fn group_cells(group: &Group) -> [String; 4] {
    [
        group.name.clone(),
        format_amount(group.commission),
        format_amount(group.nonpana_payable),
        format_amount(group.pana_payable),
    ]
}

fn or_empty(value: &str) -> &str {
    if value.is_empty() { EMPTY_VALUE } else { value }
}

fn context_line(state: &AppState, view_data: &ViewData) -> String {
    match state.active_tab {
        TabKind::History => {
            let desk = &view_data.history;
            let game = desk.game().map_or(EMPTY_VALUE, |game| game.name.as_str());
            let group = desk.group().map_or(EMPTY_VALUE, |group| group.name.as_str());
            let all = if desk.all_selected() { " (all)" } else { "" };
            format!(
                " {} | game {game} | group {group} | number {} | amount {} | selected {}{all}",
                format_business_date(desk.date()),
                or_empty(&desk.filter().number_query),
                or_empty(&desk.filter().amount_query),
                desk.selection().len(),
            )
        }
        TabKind::Groups => format!(
            " search {} | {} groups",
            or_empty(view_data.groups.search()),
            view_data.groups.visible().len()
        ),
    }
}

fn mode_label(mode: AppMode) -> &'static str {
    match mode {
        AppMode::Nav => "NAV",
        AppMode::Search(_) => "SEARCH",
        AppMode::Edit => "EDIT",
        AppMode::Confirm(_) => "CONFIRM",
        AppMode::GroupForm => "FORM",
    }
}

fn key_hints(state: &AppState, view_data: &ViewData) -> String {
    match (state.mode, state.active_tab) {
        (AppMode::Nav, TabKind::History) => {
            "j/k move | / number a amount | space A select | e edit d del D del sel | [ ] day g/G game/group | r | tab | q".to_owned()
        }
        (AppMode::Nav, TabKind::Groups) => {
            "j/k move | / search | n new e edit d del | r | tab | q".to_owned()
        }
        (AppMode::Search(field), _) => format!(
            "{}: {}_ | enter keep | esc clear",
            field.label(),
            view_data.search_input
        ),
        (AppMode::Edit, _) => {
            "tab field | left/right choose | enter save | esc cancel".to_owned()
        }
        (AppMode::Confirm(_), _) => "y confirm | n cancel".to_owned(),
        (AppMode::GroupForm, _) => "tab field | enter save | esc cancel".to_owned(),
    }
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let mode = mode_label(state.mode);
    let hints = key_hints(state, view_data);
    match &state.status {
        Some(notice) if notice.level == NoticeLevel::Error => {
            format!("{mode} | error: {} | {hints}", notice.message)
        }
        Some(notice) => format!("{mode} | {} | {hints}", notice.message),
        None => format!("{mode} | {hints}"),
    }
}

fn status_color(state: &AppState) -> Color {
    match state.status.as_ref().map(|notice| notice.level) {
        Some(NoticeLevel::Error) => Color::Red,
        Some(NoticeLevel::Success) => Color::Green,
        _ => Color::Yellow,
    }
}

fn edit_overlay_text(session: &EditSession, focus: EditField, games: &[Game]) -> String {
    let current = session.current();
    let errors = session.errors();
    let type_label = if current.type_id.is_none() {
        "(no eligible type)"
    } else {
        current.type_name.as_str()
    };
    let game_label = games
        .iter()
        .find(|game| game.id == current.game_id)
        .map_or(current.game_name.as_str(), |game| game.name.as_str());

    let mut lines = Vec::new();
    for field in EditField::ALL {
        let marker = if field == focus { ">" } else { " " };
        let value = match field {
            EditField::Number => current.number.clone(),
            EditField::Amount => session.amount_input().to_owned(),
            EditField::Game => format!("< {game_label} >"),
            EditField::Type => format!("< {type_label} >"),
        };
        lines.push(format!("{marker} {:<7} {value}", field.label()));
        if let Some(error) = errors.get(field) {
            lines.push(format!("    ! {error}"));
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "created {} | modified {}",
        format_clock(current.created_at),
        format_modified_clock(current.modified_at)
    ));
    if session.is_dirty() {
        lines.push("unsaved changes".to_owned());
    }
    lines.join("\n")
}

fn group_form_text(view_data: &ViewData) -> String {
    let mut lines = GroupField::ALL
        .iter()
        .map(|field| {
            let marker = if *field == view_data.group_field {
                ">"
            } else {
                " "
            };
            format!(
                "{marker} {:<13} {}",
                field.label(),
                view_data.group_inputs.field(*field)
            )
        })
        .collect::<Vec<_>>();

    let derived = view_data
        .groups
        .form()
        .and_then(|form| form.input.nonpana_payable())
        .map_or_else(|| EMPTY_VALUE.to_owned(), format_amount);
    lines.push(format!("  non-pana payable {derived}"));
    lines.join("\n")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
