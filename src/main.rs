// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use famfin::{auth, cli, commands, db, logging, utils};

fn main() -> Result<()> {
    logging::init();
    let matches = cli::build_cli().get_matches();

    let today = match matches.get_one::<String>("today") {
        Some(d) => utils::parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };
    let mut conn = db::open_or_init()?;
    let token = matches.get_one::<String>("token").map(String::as_str);

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("register", sub)) => commands::accounts::register(&conn, sub)?,
        Some(("login", sub)) => commands::accounts::login(&conn, sub)?,
        Some(("logout", _)) => {
            commands::accounts::logout(&conn, token.context("logout needs --token")?)?
        }
        Some(("config", sub)) => commands::config::handle(&conn, sub)?,
        Some((name, sub)) => {
            let session = auth::resolve(&conn, token.unwrap_or_default())
                .context("Not logged in: pass --token or set FAMFIN_TOKEN (see `famfin login`)")?;
            tracing::debug!(user = session.user_id, command = name, "dispatching");
            dispatch(&mut conn, &session, today, name, sub)?;
        }
        None => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

fn dispatch(
    conn: &mut rusqlite::Connection,
    session: &auth::Session,
    today: NaiveDate,
    name: &str,
    sub: &clap::ArgMatches,
) -> Result<()> {
    match name {
        "family" => commands::accounts::family(conn, session, sub)?,
        "tx" => commands::transactions::handle(conn, session, sub)?,
        "card" => commands::cards::handle(conn, session, today, sub)?,
        "invest" => commands::investments::handle(conn, session, sub)?,
        "debt" => commands::debts::handle(conn, session, sub)?,
        "goal" => commands::goals::handle(conn, session, sub)?,
        "budget" => commands::budgets::handle(conn, session, today, sub)?,
        "dashboard" => {
            commands::reports::dashboard(conn, session, today, sub)?;
        }
        "export" => commands::exporter::handle(conn, session, sub)?,
        "doctor" => commands::doctor::handle(conn, session, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
