// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use ledgerdesk_api::Client;
use ledgerdesk_app::format::parse_business_date;
use ledgerdesk_app::{
    AppState, GameId, GroupId, HistoryDesk, LedgerGateway, SessionContext, UserId,
};
use runtime::ApiRuntime;
use std::env;
use std::path::PathBuf;
use time::{Date, OffsetDateTime};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `ledgerdesk --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let log_path = config.log_path()?;
    logging::init(config.log_level(), &log_path)?;

    let user_id = options.user_id.or_else(|| config.user_id()).ok_or_else(|| {
        anyhow!(
            "no user id; set [session].user_id in {} or pass --user <id>",
            options.config_path.display()
        )
    })?;
    let context = SessionContext { user_id };

    let client = Client::new(config.api_base_url(), config.api_timeout()?)
        .with_context(|| {
            format!(
                "invalid [api] config in {}; fix base_url/timeout values",
                options.config_path.display()
            )
        })?
        .with_token(config.api_token().as_deref())
        .with_auth_check_path(config.auth_check_path());
    let mut runtime = ApiRuntime::new(client);

    if options.check_only {
        if !runtime.require_authenticated()? {
            bail!(
                "backend rejected the session; set api.token in {} or LEDGERDESK_API_TOKEN",
                options.config_path.display()
            );
        }
        return Ok(());
    }

    let date = options
        .date
        .unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let game = options.game_id.or_else(|| config.initial_game());
    let group = options.group_id.or_else(|| config.initial_group());
    tracing::info!(%user_id, %date, "starting ledgerdesk");

    let desk = HistoryDesk::new(context, date).with_initial_selection(game, group);
    let mut state = AppState::default();
    ledgerdesk_tui::run_app(&mut state, desk, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    user_id: Option<UserId>,
    game_id: Option<GameId>,
    group_id: Option<GroupId>,
    date: Option<Date>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
        user_id: None,
        game_id: None,
        group_id: None,
        date: None,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--user" => {
                options.user_id = Some(UserId::new(positive_id("--user", iter.next())?));
            }
            "--game" => {
                options.game_id = Some(GameId::new(positive_id("--game", iter.next())?));
            }
            "--group" => {
                options.group_id = Some(GroupId::new(positive_id("--group", iter.next())?));
            }
            "--date" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--date requires a YYYY-MM-DD value"))?;
                let date = parse_business_date(value.as_ref())
                    .with_context(|| format!("--date {:?}", value.as_ref()))?;
                options.date = Some(date);
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn positive_id<S: AsRef<str>>(flag: &str, value: Option<S>) -> Result<i64> {
    let value = value.ok_or_else(|| anyhow!("{flag} requires a numeric id"))?;
    let raw = value.as_ref();
    let id: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{flag} expects a numeric id, got {raw:?}"))?;
    if id <= 0 {
        bail!("{flag} must be a positive id, got {id}");
    }
    Ok(id)
}

fn print_help() {
    println!("ledgerdesk");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config and the backend session, then exit");
    println!("  --user <id>              Override [session].user_id");
    println!("  --game <id>              Start on this game");
    println!("  --group <id>             Start on this group");
    println!("  --date <YYYY-MM-DD>      Business date to open (default: today, UTC)");
    println!("  --help                   Show this help");
}
