// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{required, required_id};
use crate::aggregate::investment_summary;
use crate::auth::Session;
use crate::ledger::investments;
use crate::utils::{
    currency_symbol, fmt_money, maybe_print_json, parse_amount, parse_date, pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let inv = investments::add(
                conn,
                session,
                parse_date(required(sub, "date")?)?,
                required(sub, "asset")?,
                required(sub, "type")?,
                required(sub, "broker")?,
                parse_amount("amount", required(sub, "amount")?)?,
            )?;
            println!(
                "Recorded {} in {} (id {})",
                fmt_money(&inv.amount, &currency_symbol(conn)?),
                inv.asset_name,
                inv.id
            );
        }
        Some(("list", sub)) => {
            let data = investments::list(conn, session)?;
            if !maybe_print_json(sub.get_flag("json"), &data)? {
                let symbol = currency_symbol(conn)?;
                let rows = data
                    .iter()
                    .map(|i| {
                        vec![
                            i.id.to_string(),
                            i.date.to_string(),
                            i.asset_name.clone(),
                            i.asset_type.clone(),
                            i.broker.clone(),
                            fmt_money(&i.amount, &symbol),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Date", "Asset", "Type", "Broker", "Amount"], rows)
                );
            }
        }
        Some(("rm", sub)) => {
            let id = required_id(sub, "id")?;
            investments::delete(conn, session, id)?;
            println!("Deleted investment {}", id);
        }
        Some(("summary", sub)) => {
            let summary = investment_summary(&investments::list(conn, session)?);
            if !maybe_print_json(sub.get_flag("json"), &summary)? {
                let symbol = currency_symbol(conn)?;
                println!("Total invested: {}", fmt_money(&summary.total_invested, &symbol));
                let rows = summary
                    .by_asset_type
                    .iter()
                    .map(|t| vec![t.asset_type.clone(), fmt_money(&t.amount, &symbol)])
                    .collect();
                println!("{}", pretty_table(&["Asset type", "Invested"], rows));
                let rows = summary
                    .monthly_evolution
                    .iter()
                    .map(|m| vec![m.month.to_string(), fmt_money(&m.amount, &symbol)])
                    .collect();
                println!("{}", pretty_table(&["Month", "Contributed"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
