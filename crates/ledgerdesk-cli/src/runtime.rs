// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use ledgerdesk_api::Client;
use ledgerdesk_app::{
    Game, Group, GroupCreateOutcome, GroupFormInput, GroupGateway, GroupId, HistoryId,
    HistoryQuery, HistoryRecord, LedgerGateway, TypeOption, UpdatePayload, UserGroup, UserId,
};

/// Gateway over the HTTP backend.
pub struct ApiRuntime {
    client: Client,
}

impl ApiRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl LedgerGateway for ApiRuntime {
    fn require_authenticated(&mut self) -> Result<bool> {
        self.client.check_auth()
    }

    fn fetch_records(&mut self, query: &HistoryQuery) -> Result<Vec<HistoryRecord>> {
        self.client.history_by_user(query)
    }

    fn fetch_type_options(&mut self) -> Result<Vec<TypeOption>> {
        self.client.types()
    }

    fn fetch_games(&mut self) -> Result<Vec<Game>> {
        self.client.games()
    }

    fn fetch_user_groups(&mut self, user_id: UserId) -> Result<Vec<UserGroup>> {
        self.client.user_groups(user_id)
    }

    fn submit_update(&mut self, payload: &UpdatePayload) -> Result<()> {
        self.client.update_record(payload)
    }

    fn submit_delete(&mut self, ids: &[HistoryId]) -> Result<()> {
        self.client.delete_records(ids)
    }
}

impl GroupGateway for ApiRuntime {
    fn list_groups(&mut self) -> Result<Vec<Group>> {
        self.client.list_groups()
    }

    fn create_group(&mut self, input: &GroupFormInput) -> Result<GroupCreateOutcome> {
        self.client.create_group(input)
    }

    fn update_group(&mut self, id: GroupId, input: &GroupFormInput) -> Result<()> {
        self.client.update_group(id, input)
    }

    fn delete_group(&mut self, id: GroupId) -> Result<()> {
        self.client.delete_group(id)
    }
}

impl ledgerdesk_tui::AppRuntime for ApiRuntime {}

#[cfg(test)]
mod tests {
    use super::ApiRuntime;
    use anyhow::{Result, anyhow};
    use ledgerdesk_api::Client;
    use ledgerdesk_app::{GameId, GroupId, HistoryDesk, HistoryId, LedgerGateway, NoticeLevel};
    use ledgerdesk_testkit::{fixture_context, fixture_date};
    use std::thread;
    use std::time::Duration;
    use tiny_http::{Header, Response, Server};

    fn json_response(body: &str) -> Response<std::io::Cursor<Vec<u8>>> {
        Response::from_string(body).with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
    }

    #[test]
    fn runtime_without_token_reports_signed_out() -> Result<()> {
        let client = Client::new("http://127.0.0.1:1/api", Duration::from_millis(50))?;
        let mut runtime = ApiRuntime::new(client);
        assert!(!runtime.require_authenticated()?);
        Ok(())
    }

    #[test]
    fn desk_loads_through_http_runtime() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}/api", server.server_addr());

        let handle = thread::spawn(move || {
            let history = r#"[{
                "history_id": 41,
                "history_created_at": "2026-02-19 08:00:00",
                "history_modified_at": null,
                "history_number": "45",
                "history_game_id": 1,
                "history_game_name": "Kalyan",
                "history_type_id": 2,
                "history_type_name": "Jodi",
                "history_amount": "30",
                "history_user_id": 7,
                "history_date": "2026-02-19",
                "history_group": 10,
                "history_groupname": "North Desk"
            }]"#;
            let replies = [
                ("/api/auth/check", "{}"),
                ("/api/games", r#"[{"gameid":1,"gamename":"Kalyan"}]"#),
                ("/api/types", r#"[{"gameid":2,"gamename":"Jodi"}]"#),
                ("/api/user/groups/7", r#"[{"id":10,"groupname":"North Desk"}]"#),
                ("/api/auth/check", "{}"),
                ("/api/history-by-uid", history),
            ];
            for (url, body) in replies {
                let request = server.recv().expect("request expected");
                assert_eq!(request.url(), url);
                request
                    .respond(json_response(body))
                    .expect("response should succeed");
            }
        });

        let client = Client::new(&addr, Duration::from_secs(1))?.with_token(Some("secret"));
        let mut runtime = ApiRuntime::new(client);
        let mut desk = HistoryDesk::new(fixture_context(), fixture_date())
            .with_initial_selection(Some(GameId::new(1)), Some(GroupId::new(10)));
        desk.load_reference_data(&mut runtime);

        handle.join().expect("server thread should join");
        assert!(desk.notice().is_none());
        assert_eq!(desk.visible_ids(), vec![HistoryId::new(41)]);
        assert_eq!(desk.records()[0].amount, 30.0);
        Ok(())
    }

    #[test]
    fn backend_outage_surfaces_as_notice() -> Result<()> {
        let client = Client::new("http://127.0.0.1:1/api", Duration::from_millis(50))?
            .with_token(Some("secret"));
        let mut runtime = ApiRuntime::new(client);
        let mut desk = HistoryDesk::new(fixture_context(), fixture_date());
        desk.load_reference_data(&mut runtime);

        let notice = desk.notice().expect("notice expected");
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "failed to check session");
        Ok(())
    }
}
