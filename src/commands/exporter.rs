// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::required;
use crate::auth::Session;
use crate::ledger::transactions::{self, TransactionFilter};
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, session, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.to_lowercase();
    let out = required(sub, "out")?;

    let mut rows = transactions::list(conn, session, &TransactionFilter::default())?;
    rows.reverse();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Cannot write {}", out))?;
            wtr.write_record([
                "id",
                "date",
                "description",
                "category",
                "type",
                "amount",
                "payment_method",
                "purchase_id",
                "installment",
            ])?;
            for t in &rows {
                wtr.write_record([
                    t.id.to_string(),
                    t.date.to_string(),
                    t.description.clone(),
                    t.category.clone(),
                    t.kind.as_str().to_string(),
                    t.amount.to_string(),
                    t.payment_method.clone(),
                    t.installment.map(|l| l.purchase_id.to_string()).unwrap_or_default(),
                    t.installment.map(|l| l.index.to_string()).unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = rows
                .iter()
                .map(|t| {
                    json!({
                        "id": t.id,
                        "date": t.date.to_string(),
                        "description": t.description,
                        "category": t.category,
                        "type": t.kind.as_str(),
                        "amount": t.amount.to_string(),
                        "payment_method": t.payment_method,
                        "installment": t.installment,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)
                .with_context(|| format!("Cannot write {}", out))?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    tracing::info!(
        family = %session.family_id,
        count = rows.len(),
        format = %fmt,
        "transactions exported"
    );
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
