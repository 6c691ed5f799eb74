// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::Session;
use crate::error::{FinanceError, Result};
use crate::models::Investment;
use crate::utils::{check_amount, require_text, stored_date, stored_decimal};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rusqlite::{Connection, params};

pub fn add(
    conn: &Connection,
    session: &Session,
    date: NaiveDate,
    asset_name: &str,
    asset_type: &str,
    broker: &str,
    amount: Decimal,
) -> Result<Investment> {
    let asset_name = require_text("asset_name", asset_name)?;
    let asset_type = require_text("asset_type", asset_type)?;
    let broker = require_text("broker", broker)?;
    let amount = check_amount("amount", amount, false)?;
    conn.execute(
        "INSERT INTO investments(family_id, date, asset_name, asset_type, broker, amount)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            &session.family_id,
            date.to_string(),
            &asset_name,
            &asset_type,
            &broker,
            amount.to_string()
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, family = %session.family_id, %amount, "investment contribution recorded");
    Ok(Investment {
        id,
        family_id: session.family_id.clone(),
        date,
        asset_name,
        asset_type,
        broker,
        amount,
    })
}

/// Contributions, oldest first.
pub fn list(conn: &Connection, session: &Session) -> Result<Vec<Investment>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, asset_name, asset_type, broker, amount FROM investments
         WHERE family_id=?1 ORDER BY date, id",
    )?;
    let mut rows = stmt.query(params![&session.family_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let date: String = r.get(1)?;
        let amount: String = r.get(5)?;
        out.push(Investment {
            id,
            family_id: session.family_id.clone(),
            date: stored_date("investments", id, &date)?,
            asset_name: r.get(2)?,
            asset_type: r.get(3)?,
            broker: r.get(4)?,
            amount: stored_decimal("investments", id, &amount)?,
        });
    }
    Ok(out)
}

pub fn delete(conn: &Connection, session: &Session, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM investments WHERE id=?1 AND family_id=?2",
        params![id, &session.family_id],
    )?;
    if n == 0 {
        return Err(FinanceError::not_found("investment", id));
    }
    tracing::info!(id, family = %session.family_id, "investment deleted");
    Ok(())
}
