// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{required, required_id};
use crate::auth::Session;
use crate::ledger::debts;
use crate::models::Debt;
use crate::utils::{
    currency_symbol, fmt_money, maybe_print_json, parse_amount, parse_decimal,
    pretty_table,
};
use anyhow::Result;
use rust_decimal::Decimal;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &mut Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let paid = parse_decimal("paid_amount", required(sub, "paid")?)?;
            let debt = debts::add(
                conn,
                session,
                required(sub, "description")?,
                parse_amount("total_amount", required(sub, "total")?)?,
                paid,
                parse_amount("monthly_payment", required(sub, "monthly")?)?,
            )?;
            println!("Added debt '{}' (id {})", debt.description, debt.id);
        }
        Some(("list", sub)) => list(conn, session, sub)?,
        Some(("rm", sub)) => {
            let id = required_id(sub, "id")?;
            debts::delete(conn, session, id)?;
            println!("Deleted debt {}", id);
        }
        Some(("pay", sub)) => {
            let id = required_id(sub, "id")?;
            let amount = parse_amount("amount", required(sub, "amount")?)?;
            let debt = debts::pay(conn, session, id, amount)?;
            println!(
                "Debt {} now has {} remaining",
                debt.id,
                fmt_money(&debt.remaining_amount(), &currency_symbol(conn)?)
            );
        }
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
struct DebtView {
    #[serde(flatten)]
    debt: Debt,
    remaining_amount: Decimal,
}

fn list(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let data: Vec<DebtView> = debts::list(conn, session)?
        .into_iter()
        .map(|debt| DebtView {
            remaining_amount: debt.remaining_amount(),
            debt,
        })
        .collect();
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let symbol = currency_symbol(conn)?;
        let rows = data
            .iter()
            .map(|v| {
                vec![
                    v.debt.id.to_string(),
                    v.debt.description.clone(),
                    fmt_money(&v.debt.total_amount, &symbol),
                    fmt_money(&v.debt.paid_amount, &symbol),
                    fmt_money(&v.remaining_amount, &symbol),
                    fmt_money(&v.debt.monthly_payment, &symbol),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Description", "Total", "Paid", "Remaining", "Monthly"],
                rows
            )
        );
    }
    Ok(())
}
