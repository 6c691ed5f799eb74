// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Logins and family membership.

use super::{optional, required};
use crate::auth::{self, Session};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn register(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let reg = auth::register(
        conn,
        required(sub, "email")?,
        required(sub, "password")?,
        optional(sub, "family"),
    )?;
    if !maybe_print_json(sub.get_flag("json"), &reg)? {
        println!("Registered user {} in family {}", reg.user_id, reg.family_id);
    }
    Ok(())
}

/// Prints only the token so it can be captured into `FAMFIN_TOKEN`.
pub fn login(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let token = auth::login(conn, required(sub, "email")?, required(sub, "password")?)?;
    println!("{}", token);
    Ok(())
}

pub fn logout(conn: &Connection, token: &str) -> Result<()> {
    auth::logout(conn, token)?;
    println!("Logged out");
    Ok(())
}

pub fn family(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("members", sub)) = m.subcommand() {
        let members = auth::family_members(conn, session)?;
        if !maybe_print_json(sub.get_flag("json"), &members)? {
            println!("Family {}", session.family_id);
            let rows = members.into_iter().map(|e| vec![e]).collect();
            println!("{}", pretty_table(&["Member"], rows));
        }
    }
    Ok(())
}
