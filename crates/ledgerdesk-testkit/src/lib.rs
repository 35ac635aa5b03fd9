// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use ledgerdesk_app::format::format_timestamp;
use ledgerdesk_app::rules::digit_priority;
use ledgerdesk_app::{
    BetTypeId, Game, GameId, Group, GroupCreateOutcome, GroupFormInput, GroupGateway, GroupId,
    HistoryId, HistoryQuery, HistoryRecord, LedgerGateway, SessionContext, TypeOption,
    UpdatePayload, UserGroup, UserId,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use time::{Date, Month, OffsetDateTime, Time};

const TYPE_OPTIONS: [(i64, &str); 6] = [
    (2, "Jodi"),
    (3, "Open Pana"),
    (4, "Open"),
    (7, "Close"),
    (9, "Close Pana"),
    (11, "Half Sangam"),
];

const GAMES: [(i64, &str); 4] = [
    (1, "Kalyan"),
    (2, "Milan Day"),
    (3, "Rajdhani Night"),
    (4, "Main Bazar"),
];

const USER_GROUPS: [(i64, &str); 3] = [(10, "North Desk"), (11, "Harbor"), (12, "Old Town")];

const AMOUNTS: [f64; 8] = [5.0, 10.0, 20.0, 25.0, 50.0, 100.0, 150.0, 12.5];

pub const FIXTURE_USER: UserId = UserId::new(7);

pub fn fixture_context() -> SessionContext {
    SessionContext {
        user_id: FIXTURE_USER,
    }
}

pub fn fixture_date() -> Date {
    Date::from_calendar_date(2026, Month::February, 19).expect("valid fixture date")
}

pub fn fixture_datetime() -> OffsetDateTime {
    let noon = Time::from_hms(12, 34, 56).expect("valid fixture time");
    fixture_date().with_time(noon).assume_utc()
}

pub fn type_options() -> Vec<TypeOption> {
    TYPE_OPTIONS
        .iter()
        .map(|(id, label)| TypeOption::new(*id, label))
        .collect()
}

pub fn games() -> Vec<Game> {
    GAMES
        .iter()
        .map(|(id, name)| Game {
            id: GameId::new(*id),
            name: (*name).to_owned(),
        })
        .collect()
}

pub fn user_groups() -> Vec<UserGroup> {
    USER_GROUPS
        .iter()
        .map(|(id, name)| UserGroup {
            id: GroupId::new(*id),
            name: (*name).to_owned(),
        })
        .collect()
}

pub fn groups() -> Vec<Group> {
    vec![
        Group {
            id: GroupId::new(10),
            name: "North Desk".to_owned(),
            commission: 10.0,
            nonpana_payable: 90.0,
            pana_payable: 140.0,
        },
        Group {
            id: GroupId::new(11),
            name: "Harbor".to_owned(),
            commission: 12.5,
            nonpana_payable: 87.5,
            pana_payable: 130.0,
        },
    ]
}

/// A record on the first fixture game, date and group.
pub fn record(id: i64, number: &str, type_id: i64, amount: f64) -> HistoryRecord {
    let type_name = TYPE_OPTIONS
        .iter()
        .find(|(option, _)| *option == type_id)
        .map(|(_, label)| (*label).to_owned())
        .unwrap_or_default();
    HistoryRecord {
        id: HistoryId::new(id),
        created_at: fixture_datetime(),
        created_at_raw: format_timestamp(fixture_datetime()),
        modified_at: None,
        number: number.to_owned(),
        game_id: GameId::new(GAMES[0].0),
        game_name: GAMES[0].1.to_owned(),
        type_id: BetTypeId::new(type_id),
        type_name,
        amount,
        user_id: FIXTURE_USER,
        business_date: fixture_date(),
        group_id: GroupId::new(USER_GROUPS[0].0),
        group_name: USER_GROUPS[0].1.to_owned(),
    }
}

pub fn fixture_query() -> HistoryQuery {
    HistoryQuery {
        user_id: FIXTURE_USER,
        game_id: GameId::new(GAMES[0].0),
        date: fixture_date(),
        group_id: GroupId::new(USER_GROUPS[0].0),
    }
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator of well-formed records: every number fits its type and
/// every three digit number passes the priority check.
#[derive(Debug, Clone)]
pub struct LedgerFaker {
    rng: DeterministicRng,
    next_id: i64,
}

impl LedgerFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 1,
        }
    }

    pub fn number(&mut self, len: usize) -> String {
        let mut digits = (0..len)
            .map(|_| self.rng.int_n(10) as u8)
            .collect::<Vec<_>>();
        if len == 3 {
            digits.sort_by_key(|digit| digit_priority(*digit).unwrap_or(u8::MAX));
        }
        digits
            .into_iter()
            .map(|digit| char::from(b'0' + digit))
            .collect()
    }

    pub fn record(&mut self) -> HistoryRecord {
        let (type_id, _) = TYPE_OPTIONS[self.rng.int_n(5)];
        let len = match type_id {
            2 => 2,
            3 | 9 => 3,
            _ => 1,
        };
        let number = self.number(len);
        let amount = AMOUNTS[self.rng.int_n(AMOUNTS.len())];
        let id = self.next_id;
        self.next_id += 1;
        record(id, &number, type_id, amount)
    }

    pub fn records(&mut self, count: usize) -> Vec<HistoryRecord> {
        (0..count).map(|_| self.record()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FailPoint {
    Auth,
    Records,
    Types,
    Games,
    UserGroups,
    Update,
    Delete,
    ListGroups,
    SaveGroup,
    DeleteGroup,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Authenticate,
    FetchRecords(HistoryQuery),
    FetchTypes,
    FetchGames,
    FetchUserGroups(UserId),
    Update(UpdatePayload),
    Delete(Vec<HistoryId>),
    ListGroups,
    CreateGroup(String),
    UpdateGroup(GroupId),
    DeleteGroup(GroupId),
}

/// In-memory backend. Writes land in its own store so a refetch sees them.
#[derive(Debug, Clone)]
pub struct FakeGateway {
    pub authenticated: bool,
    pub records: Vec<HistoryRecord>,
    pub type_options: Vec<TypeOption>,
    pub games: Vec<Game>,
    pub user_groups: Vec<UserGroup>,
    pub groups: Vec<Group>,
    calls: Vec<GatewayCall>,
    failures: BTreeSet<FailPoint>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            authenticated: true,
            records: Vec::new(),
            type_options: type_options(),
            games: games(),
            user_groups: user_groups(),
            groups: groups(),
            calls: Vec::new(),
            failures: BTreeSet::new(),
        }
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<HistoryRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn fail_on(&mut self, point: FailPoint) {
        self.failures.insert(point);
    }

    pub fn recover(&mut self, point: FailPoint) {
        self.failures.remove(&point);
    }

    pub fn calls(&self) -> &[GatewayCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn count_calls(&self, matches: impl Fn(&GatewayCall) -> bool) -> usize {
        self.calls.iter().filter(|call| matches(call)).count()
    }

    fn record_call(&mut self, call: GatewayCall, point: FailPoint) -> Result<()> {
        self.calls.push(call);
        if self.failures.contains(&point) {
            bail!("injected {point:?} failure");
        }
        Ok(())
    }
}

impl LedgerGateway for FakeGateway {
    fn require_authenticated(&mut self) -> Result<bool> {
        self.record_call(GatewayCall::Authenticate, FailPoint::Auth)?;
        Ok(self.authenticated)
    }

    fn fetch_records(&mut self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>> {
        self.record_call(GatewayCall::FetchRecords(*query), FailPoint::Records)?;
        Ok(self
            .records
            .iter()
            .filter(|record| {
                record.game_id == query.game_id
                    && record.business_date == query.date
                    && (query.group_id == GroupId::ANY || record.group_id == query.group_id)
            })
            .cloned()
            .collect())
    }

    fn fetch_type_options(&mut self) -> Result<Vec<TypeOption>> {
        self.record_call(GatewayCall::FetchTypes, FailPoint::Types)?;
        Ok(self.type_options.clone())
    }

    fn fetch_games(&mut self) -> Result<Vec<Game>> {
        self.record_call(GatewayCall::FetchGames, FailPoint::Games)?;
        Ok(self.games.clone())
    }

    fn fetch_user_groups(&mut self, user_id: UserId) -> Result<Vec<UserGroup>> {
        self.record_call(GatewayCall::FetchUserGroups(user_id), FailPoint::UserGroups)?;
        Ok(self.user_groups.clone())
    }

    fn submit_update(&mut self, payload: &UpdatePayload) -> Result<()> {
        self.record_call(GatewayCall::Update(payload.clone()), FailPoint::Update)?;
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id == payload.id)
            .ok_or_else(|| anyhow!("record {} not found", payload.id))?;
        record.number = payload.number.clone();
        record.game_id = payload.game_id;
        record.game_name = payload.game_name.clone();
        record.type_id = payload.type_id;
        record.type_name = payload.type_name.clone();
        record.amount = payload.amount;
        record.modified_at = Some(payload.modified_at);
        Ok(())
    }

    fn submit_delete(&mut self, ids: &[HistoryId]) -> Result<()> {
        self.record_call(GatewayCall::Delete(ids.to_vec()), FailPoint::Delete)?;
        self.records.retain(|record| !ids.contains(&record.id));
        Ok(())
    }
}

impl GroupGateway for FakeGateway {
    fn list_groups(&mut self) -> Result<Vec<Group>> {
        self.record_call(GatewayCall::ListGroups, FailPoint::ListGroups)?;
        Ok(self.groups.clone())
    }

    fn create_group(&mut self, input: &GroupFormInput) -> Result<GroupCreateOutcome> {
        self.record_call(
            GatewayCall::CreateGroup(input.name.clone()),
            FailPoint::SaveGroup,
        )?;
        let name = input.name.trim();
        if self
            .groups
            .iter()
            .any(|group| group.name.eq_ignore_ascii_case(name))
        {
            return Ok(GroupCreateOutcome::NameTaken);
        }
        let next = self
            .groups
            .iter()
            .map(|group| group.id.get())
            .max()
            .unwrap_or(0)
            + 1;
        self.groups.push(Group {
            id: GroupId::new(next),
            name: name.to_owned(),
            commission: input.commission.unwrap_or_default(),
            nonpana_payable: input.nonpana_payable().unwrap_or_default(),
            pana_payable: input.pana_payable.unwrap_or_default(),
        });
        Ok(GroupCreateOutcome::Created)
    }

    fn update_group(&mut self, id: GroupId, input: &GroupFormInput) -> Result<()> {
        self.record_call(GatewayCall::UpdateGroup(id), FailPoint::SaveGroup)?;
        let group = self
            .groups
            .iter_mut()
            .find(|group| group.id == id)
            .ok_or_else(|| anyhow!("group {id} not found"))?;
        group.name = input.name.trim().to_owned();
        group.commission = input.commission.unwrap_or_default();
        group.nonpana_payable = input.nonpana_payable().unwrap_or_default();
        group.pana_payable = input.pana_payable.unwrap_or_default();
        Ok(())
    }

    fn delete_group(&mut self, id: GroupId) -> Result<()> {
        self.record_call(GatewayCall::DeleteGroup(id), FailPoint::DeleteGroup)?;
        self.groups.retain(|group| group.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FailPoint, FakeGateway, LedgerFaker, fixture_query, record};
    use ledgerdesk_app::LedgerGateway;
    use ledgerdesk_app::rules::{eligible_types, number_len, validate_number};

    #[test]
    fn faker_is_deterministic() {
        let first = LedgerFaker::new(42).records(20);
        let second = LedgerFaker::new(42).records(20);
        assert_eq!(first, second);
    }

    #[test]
    fn faker_records_are_valid_for_their_type() {
        let types = super::type_options();
        for record in LedgerFaker::new(9).records(200) {
            assert_eq!(validate_number(&record.number), None, "{}", record.number);
            let eligible = eligible_types(number_len(&record.number), &types);
            assert!(
                eligible.iter().any(|option| option.id == record.type_id),
                "type {} not eligible for {}",
                record.type_id,
                record.number,
            );
            assert!(record.amount > 0.0);
        }
    }

    #[test]
    fn fake_gateway_records_calls_and_injects_failures() {
        let mut gateway = FakeGateway::with_records(vec![record(1, "5", 4, 10.0)]);
        assert_eq!(
            gateway
                .fetch_records(&fixture_query())
                .expect("fetch records")
                .len(),
            1
        );

        gateway.fail_on(FailPoint::Records);
        assert!(gateway.fetch_records(&fixture_query()).is_err());
        gateway.recover(FailPoint::Records);
        assert!(gateway.fetch_records(&fixture_query()).is_ok());
        assert_eq!(gateway.calls().len(), 3);
    }
}
