// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{optional, optional_number, required, required_id};
use crate::auth::Session;
use crate::ledger::cards;
use crate::models::{NewPurchase, YearMonth};
use crate::utils::{
    currency_symbol, days_until, fmt_money, maybe_print_json, parse_amount, parse_date,
    parse_month, pretty_table,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(
    conn: &mut Connection,
    session: &Session,
    today: NaiveDate,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let closing: u32 = required(sub, "closing-day")?
                .parse()
                .context("--closing-day expects a day number")?;
            let due: u32 = required(sub, "due-day")?
                .parse()
                .context("--due-day expects a day number")?;
            let card = cards::add_card(conn, session, required(sub, "name")?, closing, due)?;
            println!("Added card '{}' (id {})", card.name, card.id);
        }
        Some(("list", sub)) => list(conn, session, today, sub)?,
        Some(("rm", sub)) => {
            let id = required_id(sub, "id")?;
            cards::delete_card(conn, session, id)?;
            println!("Deleted card {} with its purchases", id);
        }
        Some(("purchase", sub)) => purchase(conn, session, sub)?,
        Some(("purchases", sub)) => purchases(conn, session, sub)?,
        Some(("installments", sub)) => installments(conn, session, sub)?,
        Some(("pay", sub)) => {
            let purchase_id = required_id(sub, "purchase")?;
            let index: u32 = required(sub, "index")?
                .parse()
                .context("--index expects an installment number")?;
            let date = optional(sub, "date").map(parse_date).transpose()?.unwrap_or(today);
            let t = cards::pay_installment(conn, session, purchase_id, index, date)?;
            println!(
                "Installment {} of purchase {} paid by transaction {}",
                index, purchase_id, t.id
            );
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct CardRow {
    pub id: i64,
    pub name: String,
    pub closing_day: u32,
    pub due_day: u32,
    pub days_to_closing: i64,
    pub days_to_due: i64,
}

pub fn card_rows(conn: &Connection, session: &Session, today: NaiveDate) -> Result<Vec<CardRow>> {
    Ok(cards::list_cards(conn, session)?
        .into_iter()
        .map(|c| CardRow {
            days_to_closing: days_until(c.closing_day, today),
            days_to_due: days_until(c.due_day, today),
            id: c.id,
            name: c.name,
            closing_day: c.closing_day,
            due_day: c.due_day,
        })
        .collect())
}

fn list(
    conn: &Connection,
    session: &Session,
    today: NaiveDate,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let data = card_rows(conn, session, today)?;
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let rows = data
            .iter()
            .map(|c| {
                vec![
                    c.id.to_string(),
                    c.name.clone(),
                    c.closing_day.to_string(),
                    c.due_day.to_string(),
                    c.days_to_closing.to_string(),
                    c.days_to_due.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Card", "Closes", "Due", "Days to close", "Days to due"],
                rows
            )
        );
    }
    Ok(())
}

fn purchase(conn: &mut Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let card_id = required_id(sub, "card")?;
    let new = NewPurchase {
        description: required(sub, "description")?.to_string(),
        category: optional(sub, "category").unwrap_or_default().to_string(),
        total_amount: parse_amount("total_amount", required(sub, "amount")?)?,
        installment_count: optional_number(sub, "installments")?.unwrap_or(1),
        purchase_date: parse_date(required(sub, "date")?)?,
    };
    let (p, schedule) = cards::add_purchase(conn, session, card_id, new)?;
    if maybe_print_json(sub.get_flag("json"), &schedule)? {
        return Ok(());
    }
    let symbol = currency_symbol(conn)?;
    println!(
        "Purchase {} '{}' of {} in {}x",
        p.id,
        p.description,
        fmt_money(&p.total_amount, &symbol),
        p.installment_count
    );
    let rows = schedule
        .iter()
        .map(|i| {
            vec![
                format!("{}/{}", i.index, p.installment_count),
                i.due_month.to_string(),
                i.due_date.to_string(),
                fmt_money(&i.amount, &symbol),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["#", "Month", "Due", "Amount"], rows));
    Ok(())
}

fn purchases(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let data = cards::list_purchases(conn, session)?;
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let symbol = currency_symbol(conn)?;
        let rows = data
            .iter()
            .map(|p| {
                vec![
                    p.id.to_string(),
                    p.card_id.to_string(),
                    p.purchase_date.to_string(),
                    p.description.clone(),
                    p.category.clone(),
                    fmt_money(&p.total_amount, &symbol),
                    p.installment_count.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Card", "Date", "Description", "Category", "Total", "Installments"],
                rows
            )
        );
    }
    Ok(())
}

fn installments(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let card = optional(sub, "card")
        .map(|c| c.trim().parse::<i64>())
        .transpose()
        .context("--card expects a numeric id")?;
    let from = optional(sub, "from").map(parse_month).transpose()?;
    let to = optional(sub, "to").map(parse_month).transpose()?;
    let months = match (from, to) {
        (None, None) => None,
        (f, t) => Some((
            f.unwrap_or(YearMonth { year: 1, month: 1 }),
            t.unwrap_or(YearMonth { year: 9999, month: 12 }),
        )),
    };
    let data = cards::scheduled(conn, session, card, months)?;
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let symbol = currency_symbol(conn)?;
        let rows = data
            .iter()
            .map(|s| {
                vec![
                    s.installment.due_month.to_string(),
                    s.installment.due_date.to_string(),
                    s.description.clone(),
                    format!("{}/{}", s.installment.index, s.installment_count),
                    fmt_money(&s.installment.amount, &symbol),
                    s.paid_by.map(|id| format!("tx {}", id)).unwrap_or_else(|| "open".into()),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Due", "Purchase", "#", "Amount", "Status"], rows)
        );
    }
    Ok(())
}
