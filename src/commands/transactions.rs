// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{optional, optional_number, required, required_id};
use crate::auth::Session;
use crate::ledger::transactions::{self, TransactionFilter};
use crate::models::{NewTransaction, Transaction};
use crate::utils::{
    currency_symbol, fmt_money, maybe_print_json, parse_amount, parse_date, parse_month,
    pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, session, sub)?,
        Some(("list", sub)) => list(conn, session, sub)?,
        Some(("edit", sub)) => edit(conn, session, sub)?,
        Some(("rm", sub)) => {
            let id = required_id(sub, "id")?;
            transactions::delete(conn, session, id)?;
            println!("Deleted transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let new = NewTransaction {
        date: parse_date(required(sub, "date")?)?,
        description: required(sub, "description")?.to_string(),
        category: required(sub, "category")?.to_string(),
        amount: parse_amount("amount", required(sub, "amount")?)?,
        kind: required(sub, "type")?.parse()?,
        payment_method: required(sub, "payment-method")?.to_string(),
        installment: None,
    };
    let t = transactions::add(conn, session, new)?;
    println!(
        "Recorded {} {} on {} '{}' (id {})",
        t.kind.as_str(),
        fmt_money(&t.amount, &currency_symbol(conn)?),
        t.date,
        t.description,
        t.id
    );
    Ok(())
}

fn edit(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = required_id(sub, "id")?;
    let current = transactions::get(conn, session, id)?;
    let edit = NewTransaction {
        date: match optional(sub, "date") {
            Some(d) => parse_date(d)?,
            None => current.date,
        },
        description: optional(sub, "description")
            .map(str::to_string)
            .unwrap_or(current.description),
        category: optional(sub, "category")
            .map(str::to_string)
            .unwrap_or(current.category),
        amount: match optional(sub, "amount") {
            Some(a) => parse_amount("amount", a)?,
            None => current.amount,
        },
        kind: match optional(sub, "type") {
            Some(k) => k.parse()?,
            None => current.kind,
        },
        payment_method: optional(sub, "payment-method")
            .map(str::to_string)
            .unwrap_or(current.payment_method),
        installment: current.installment,
    };
    let t = transactions::update(conn, session, id, edit)?;
    println!("Updated transaction {}", t.id);
    Ok(())
}

/// Rows for `tx list`, newest first.
pub fn query_rows(
    conn: &Connection,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<Vec<Transaction>> {
    let filter = TransactionFilter {
        month: optional(sub, "month").map(parse_month).transpose()?,
        category: optional(sub, "category").map(str::to_string),
        limit: optional_number(sub, "limit")?,
    };
    Ok(transactions::list(conn, session, &filter)?)
}

fn list(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, session, sub)?;
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let symbol = currency_symbol(conn)?;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.date.to_string(),
                    t.description.clone(),
                    t.category.clone(),
                    t.kind.as_str().to_string(),
                    fmt_money(&t.amount, &symbol),
                    t.payment_method.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Description", "Category", "Type", "Amount", "Method"],
                rows,
            )
        );
    }
    Ok(())
}
