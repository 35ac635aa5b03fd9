// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use ledgerdesk_app::format::{
    format_business_date, format_modification_stamp, format_timestamp, parse_business_date,
    parse_timestamp,
};
use ledgerdesk_app::{
    BetTypeId, Game, GameId, Group, GroupCreateOutcome, GroupFormInput, GroupId, HistoryId,
    HistoryQuery, HistoryRecord, TypeOption, UpdatePayload, UserGroup, UserId,
};
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_AUTH_CHECK_PATH: &str = "/auth/check";

/// Blocking client for the ledger backend. One instance per session; the
/// bearer token is fixed at construction.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    token: Option<String>,
    auth_check_path: String,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let parsed = url::Url::parse(&base_url).with_context(|| {
            format!("api.base_url {base_url:?} is not a valid URL -- use http://host[:port][/prefix]")
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "api.base_url {base_url:?} uses scheme {:?} -- only http and https are supported",
                parsed.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            token: None,
            auth_check_path: DEFAULT_AUTH_CHECK_PATH.to_owned(),
            http,
        })
    }

    pub fn with_token(mut self, token: Option<&str>) -> Self {
        self.token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_owned);
        self
    }

    pub fn with_auth_check_path(mut self, path: &str) -> Self {
        let path = path.trim();
        self.auth_check_path = if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        };
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// `Ok(false)` when there is no token or the backend rejects it.
    pub fn check_auth(&self) -> Result<bool> {
        if self.token.is_none() {
            debug!("no api token configured; treating session as signed out");
            return Ok(false);
        }

        let path = self.auth_check_path.as_str();
        let response = self
            .request(Method::GET, path)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;
        let status = response.status();
        debug!(method = "GET", path, status = status.as_u16(), "api request");

        if status.is_success() {
            return Ok(true);
        }
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Ok(false);
        }
        let body = response.text().unwrap_or_default();
        Err(clean_error_response(status, &body))
    }

    pub fn history_by_user(&self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>> {
        let request = HistoryRequest {
            uid: query.user_id.get(),
            game: query.game_id.get(),
            date: format_business_date(query.date),
            gid: query.group_id.get(),
        };
        let rows: Vec<HistoryWire> = self
            .send_json(Method::POST, "/history-by-uid", &request)?
            .json()
            .context("decode history response")?;
        rows.into_iter().map(HistoryWire::into_record).collect()
    }

    pub fn types(&self) -> Result<Vec<TypeOption>> {
        let rows: Vec<GameWire> = self.get("/types")?.json().context("decode type list")?;
        Ok(rows
            .into_iter()
            .map(|row| TypeOption {
                id: BetTypeId::new(row.gameid),
                label: row.gamename,
            })
            .collect())
    }

    pub fn games(&self) -> Result<Vec<Game>> {
        let rows: Vec<GameWire> = self.get("/games")?.json().context("decode game list")?;
        Ok(rows
            .into_iter()
            .map(|row| Game {
                id: GameId::new(row.gameid),
                name: row.gamename,
            })
            .collect())
    }

    pub fn user_groups(&self, user_id: UserId) -> Result<Vec<UserGroup>> {
        let rows: Vec<UserGroupWire> = self
            .get(&format!("/user/groups/{user_id}"))?
            .json()
            .context("decode user group list")?;
        Ok(rows
            .into_iter()
            .map(|row| UserGroup {
                id: GroupId::new(row.id),
                name: row.groupname,
            })
            .collect())
    }

    pub fn update_record(&self, payload: &UpdatePayload) -> Result<()> {
        let body = DataEnvelope {
            data: vec![UpdateRow::from_payload(payload)],
        };
        self.send_json(Method::POST, "/createorupdatedata", &body)?;
        Ok(())
    }

    pub fn delete_records(&self, ids: &[HistoryId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let body = DataEnvelope {
            data: ids
                .iter()
                .map(|id| DeleteRow {
                    flag: "D",
                    id: id.get(),
                })
                .collect(),
        };
        self.send_json(Method::POST, "/createorupdatedata", &body)?;
        Ok(())
    }

    pub fn list_groups(&self) -> Result<Vec<Group>> {
        let envelope: GroupEnvelope = self.get("/group")?.json().context("decode group list")?;
        if !envelope.success {
            bail!("group list request was not successful");
        }
        Ok(envelope.data.into_iter().map(GroupWire::into_group).collect())
    }

    /// The backend answers a duplicate name by echoing the existing group.
    pub fn create_group(&self, input: &GroupFormInput) -> Result<GroupCreateOutcome> {
        let body = GroupBody::from_input(input);
        let envelope: GroupEnvelope = self
            .send_json(Method::POST, "/groups", &body)?
            .json()
            .context("decode create group response")?;
        let echoed = envelope
            .data
            .first()
            .is_some_and(|group| group.groupname == body.groupname);
        Ok(if echoed {
            GroupCreateOutcome::NameTaken
        } else {
            GroupCreateOutcome::Created
        })
    }

    pub fn update_group(&self, id: GroupId, input: &GroupFormInput) -> Result<()> {
        let body = GroupBody::from_input(input);
        self.send_json(Method::PUT, &format!("/groups/{id}"), &body)?;
        Ok(())
    }

    pub fn delete_group(&self, id: GroupId) -> Result<()> {
        let path = format!("/delete-group/{id}");
        let request = self.request(Method::DELETE, &path);
        self.execute(&Method::DELETE, &path, request)?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{path}", self.base_url));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn get(&self, path: &str) -> Result<Response> {
        let request = self.request(Method::GET, path);
        self.execute(&Method::GET, path, request)
    }

    fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &T,
    ) -> Result<Response> {
        let request = self.request(method.clone(), path).json(body);
        self.execute(&method, path, request)
    }

    fn execute(&self, method: &Method, path: &str, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        debug!(method = %method, path, status = status.as_u16(), "api request");
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(response)
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check api.base_url in the config ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.message.or(parsed.error)
        && !message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    let excerpt = body.trim();
    if !excerpt.is_empty() && excerpt.len() < 100 && !excerpt.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), excerpt);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct HistoryRequest {
    uid: i64,
    game: i64,
    date: String,
    gid: i64,
}

#[derive(Debug, Deserialize)]
struct HistoryWire {
    history_id: i64,
    history_created_at: String,
    #[serde(default)]
    history_modified_at: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    history_number: String,
    history_game_id: i64,
    #[serde(default)]
    history_game_name: Option<String>,
    history_type_id: i64,
    #[serde(default)]
    history_type_name: Option<String>,
    #[serde(deserialize_with = "lenient_float")]
    history_amount: f64,
    history_user_id: i64,
    history_date: String,
    #[serde(default)]
    history_group: Option<i64>,
    #[serde(default)]
    history_groupname: Option<String>,
}

impl HistoryWire {
    fn into_record(self) -> Result<HistoryRecord> {
        let id = HistoryId::new(self.history_id);
        let created_at = parse_timestamp(&self.history_created_at)
            .with_context(|| format!("record {id}: history_created_at"))?;
        let modified_at = match self.history_modified_at.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                parse_timestamp(raw)
                    .with_context(|| format!("record {id}: history_modified_at"))?,
            ),
        };
        let business_date = parse_business_date(&self.history_date)
            .with_context(|| format!("record {id}: history_date"))?;

        Ok(HistoryRecord {
            id,
            created_at,
            created_at_raw: self.history_created_at,
            modified_at,
            number: self.history_number,
            game_id: GameId::new(self.history_game_id),
            game_name: self.history_game_name.unwrap_or_default(),
            type_id: BetTypeId::new(self.history_type_id),
            type_name: self.history_type_name.unwrap_or_default(),
            amount: self.history_amount,
            user_id: UserId::new(self.history_user_id),
            business_date,
            group_id: self.history_group.map_or(GroupId::ANY, GroupId::new),
            group_name: self.history_groupname.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GameWire {
    gameid: i64,
    gamename: String,
}

#[derive(Debug, Deserialize)]
struct UserGroupWire {
    id: i64,
    groupname: String,
}

#[derive(Debug, Serialize)]
struct DataEnvelope<T> {
    data: Vec<T>,
}

#[derive(Debug, Serialize)]
struct UpdateRow<'a> {
    flag: &'static str,
    number: &'a str,
    gameid: i64,
    game: &'a str,
    typeid: i64,
    #[serde(rename = "type")]
    type_name: &'a str,
    amount: f64,
    createdat: String,
    id: i64,
    modified: String,
    gamedate: String,
    uid: i64,
    group: i64,
    grpname: &'a str,
}

impl<'a> UpdateRow<'a> {
    fn from_payload(payload: &'a UpdatePayload) -> Self {
        Self {
            flag: "U",
            number: &payload.number,
            gameid: payload.game_id.get(),
            game: &payload.game_name,
            typeid: payload.type_id.get(),
            type_name: &payload.type_name,
            amount: payload.amount,
            createdat: created_stamp(payload),
            id: payload.id.get(),
            modified: format_modification_stamp(payload.modified_at),
            gamedate: format_business_date(payload.business_date),
            uid: payload.user_id.get(),
            group: payload.group_id.get(),
            grpname: &payload.group_name,
        }
    }
}

/// The creation stamp goes back as it arrived; only synthesized records
/// without one fall back to RFC 3339.
fn created_stamp(payload: &UpdatePayload) -> String {
    if payload.created_at_raw.trim().is_empty() {
        format_timestamp(payload.created_at)
    } else {
        payload.created_at_raw.clone()
    }
}

#[derive(Debug, Serialize)]
struct DeleteRow {
    flag: &'static str,
    id: i64,
}

#[derive(Debug, Deserialize)]
struct GroupEnvelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    data: Vec<GroupWire>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct GroupWire {
    id: i64,
    groupname: String,
    #[serde(default, deserialize_with = "lenient_float")]
    commission: f64,
    #[serde(default, deserialize_with = "lenient_float")]
    nonpana_payable: f64,
    #[serde(default, deserialize_with = "lenient_float")]
    pana_payable: f64,
}

impl GroupWire {
    fn into_group(self) -> Group {
        Group {
            id: GroupId::new(self.id),
            name: self.groupname,
            commission: self.commission,
            nonpana_payable: self.nonpana_payable,
            pana_payable: self.pana_payable,
        }
    }
}

#[derive(Debug, Serialize)]
struct GroupBody {
    groupname: String,
    commission: Option<f64>,
    nonpana_payable: Option<f64>,
    pana_payable: Option<f64>,
}

impl GroupBody {
    fn from_input(input: &GroupFormInput) -> Self {
        Self {
            groupname: input.name.trim().to_owned(),
            commission: input.commission,
            nonpana_payable: input.nonpana_payable(),
            pana_payable: input.pana_payable,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Int(i64),
    Float(f64),
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text,
        TextOrNumber::Int(value) => value.to_string(),
        TextOrNumber::Float(value) => value.to_string(),
    })
}

/// Numeric columns arrive as JSON numbers or as decimal strings.
fn lenient_float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("expected a number, got {text:?}"))),
        TextOrNumber::Int(value) => Ok(value as f64),
        TextOrNumber::Float(value) => Ok(value),
    }
}
