// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::Session;
use crate::error::{FinanceError, Result};
use crate::models::Goal;
use crate::utils::{check_amount, require_text, stored_decimal};
use rust_decimal::Decimal;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

pub fn add(
    conn: &Connection,
    session: &Session,
    name: &str,
    target_amount: Decimal,
    saved_amount: Decimal,
) -> Result<Goal> {
    let name = require_text("name", name)?;
    let target_amount = check_amount("target_amount", target_amount, false)?;
    let saved_amount = check_amount("saved_amount", saved_amount, true)?;
    conn.execute(
        "INSERT INTO goals(family_id, name, target_amount, saved_amount) VALUES (?1, ?2, ?3, ?4)",
        params![
            &session.family_id,
            &name,
            target_amount.to_string(),
            saved_amount.to_string()
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, family = %session.family_id, "goal created");
    get(conn, session, id)
}

fn decode(r: &Row<'_>) -> rusqlite::Result<(i64, String, String, String, String, i64)> {
    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?))
}

fn to_goal(
    (id, family_id, name, target, saved, version): (i64, String, String, String, String, i64),
) -> Result<Goal> {
    Ok(Goal {
        target_amount: stored_decimal("goals", id, &target)?,
        saved_amount: stored_decimal("goals", id, &saved)?,
        id,
        family_id,
        name,
        version,
    })
}

pub fn get(conn: &Connection, session: &Session, id: i64) -> Result<Goal> {
    let row = conn
        .query_row(
            "SELECT id, family_id, name, target_amount, saved_amount, version
             FROM goals WHERE id=?1 AND family_id=?2",
            params![id, &session.family_id],
            decode,
        )
        .optional()?
        .ok_or_else(|| FinanceError::not_found("goal", id))?;
    to_goal(row)
}

pub fn list(conn: &Connection, session: &Session) -> Result<Vec<Goal>> {
    let mut stmt = conn.prepare(
        "SELECT id, family_id, name, target_amount, saved_amount, version
         FROM goals WHERE family_id=?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![&session.family_id], decode)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(to_goal(row?)?);
    }
    Ok(out)
}

/// Overwrites the saved amount.
///
/// With `expected_version`, the write only lands if nobody changed the goal since it was read.
pub fn update_saved(
    conn: &Connection,
    session: &Session,
    id: i64,
    saved_amount: Decimal,
    expected_version: Option<i64>,
) -> Result<Goal> {
    let saved_amount = check_amount("saved_amount", saved_amount, true)?;
    let n = conn.execute(
        "UPDATE goals SET saved_amount=?1, version=version+1
         WHERE id=?2 AND family_id=?3 AND (?4 IS NULL OR version=?4)",
        params![saved_amount.to_string(), id, &session.family_id, expected_version],
    )?;
    if n == 0 {
        let current = get(conn, session, id)?;
        return Err(FinanceError::Conflict(format!(
            "goal {} is at version {}, not {}",
            id,
            current.version,
            expected_version.unwrap_or_default()
        )));
    }
    tracing::info!(id, family = %session.family_id, %saved_amount, "goal progress updated");
    get(conn, session, id)
}

/// Adds to the saved amount inside one write transaction, so concurrent deposits all land.
pub fn contribute(
    conn: &mut Connection,
    session: &Session,
    id: i64,
    amount: Decimal,
) -> Result<Goal> {
    let amount = check_amount("amount", amount, false)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let goal = get(&tx, session, id)?;
    tx.execute(
        "UPDATE goals SET saved_amount=?1, version=version+1 WHERE id=?2 AND family_id=?3",
        params![(goal.saved_amount + amount).to_string(), id, &session.family_id],
    )?;
    let updated = get(&tx, session, id)?;
    tx.commit()?;
    tracing::info!(id, family = %session.family_id, %amount, "goal contribution recorded");
    Ok(updated)
}

pub fn delete(conn: &Connection, session: &Session, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM goals WHERE id=?1 AND family_id=?2",
        params![id, &session.family_id],
    )?;
    if n == 0 {
        return Err(FinanceError::not_found("goal", id));
    }
    tracing::info!(id, family = %session.family_id, "goal deleted");
    Ok(())
}
