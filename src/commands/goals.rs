// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{optional_number, required, required_id};
use crate::auth::Session;
use crate::ledger::goals;
use crate::models::Goal;
use crate::utils::{
    currency_symbol, fmt_money, maybe_print_json, parse_amount, parse_decimal,
    pretty_table,
};
use anyhow::Result;
use rust_decimal::Decimal;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Serialize)]
pub struct GoalView {
    #[serde(flatten)]
    pub goal: Goal,
    pub progress_percentage: Decimal,
}

impl From<Goal> for GoalView {
    fn from(goal: Goal) -> Self {
        GoalView {
            progress_percentage: goal.progress_percentage(),
            goal,
        }
    }
}

pub fn handle(conn: &mut Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let saved = parse_decimal("saved_amount", required(sub, "saved")?)?;
            let goal = goals::add(
                conn,
                session,
                required(sub, "name")?,
                parse_amount("target_amount", required(sub, "target")?)?,
                saved,
            )?;
            println!("Added goal '{}' (id {})", goal.name, goal.id);
        }
        Some(("list", sub)) => list(conn, session, sub)?,
        Some(("update", sub)) => {
            let saved = parse_decimal("saved_amount", required(sub, "saved")?)?;
            let goal = goals::update_saved(
                conn,
                session,
                required_id(sub, "id")?,
                saved,
                optional_number(sub, "version")?,
            )?;
            report(conn, goal)?;
        }
        Some(("contribute", sub)) => {
            let goal = goals::contribute(
                conn,
                session,
                required_id(sub, "id")?,
                parse_amount("amount", required(sub, "amount")?)?,
            )?;
            report(conn, goal)?;
        }
        Some(("rm", sub)) => {
            let id = required_id(sub, "id")?;
            goals::delete(conn, session, id)?;
            println!("Deleted goal {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn report(conn: &Connection, goal: Goal) -> Result<()> {
    let symbol = currency_symbol(conn)?;
    println!(
        "Goal '{}': {} of {} ({}%), version {}",
        goal.name,
        fmt_money(&goal.saved_amount, &symbol),
        fmt_money(&goal.target_amount, &symbol),
        goal.progress_percentage(),
        goal.version
    );
    Ok(())
}

fn list(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let data: Vec<GoalView> = goals::list(conn, session)?
        .into_iter()
        .map(GoalView::from)
        .collect();
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let symbol = currency_symbol(conn)?;
        let rows = data
            .iter()
            .map(|v| {
                vec![
                    v.goal.id.to_string(),
                    v.goal.name.clone(),
                    fmt_money(&v.goal.target_amount, &symbol),
                    fmt_money(&v.goal.saved_amount, &symbol),
                    format!("{}%", v.progress_percentage),
                    v.goal.version.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Goal", "Target", "Saved", "Progress", "Version"], rows)
        );
    }
    Ok(())
}
