// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::Session;
use crate::error::{FinanceError, Result};
use crate::models::Debt;
use crate::utils::{check_amount, require_text, stored_decimal};
use rust_decimal::Decimal;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

fn check_paid(total: Decimal, paid: Decimal) -> Result<()> {
    if paid > total {
        return Err(FinanceError::validation(
            "paid_amount",
            format!("{} exceeds the total of {}", paid, total),
        ));
    }
    Ok(())
}

pub fn add(
    conn: &Connection,
    session: &Session,
    description: &str,
    total_amount: Decimal,
    paid_amount: Decimal,
    monthly_payment: Decimal,
) -> Result<Debt> {
    let description = require_text("description", description)?;
    let total_amount = check_amount("total_amount", total_amount, false)?;
    let paid_amount = check_amount("paid_amount", paid_amount, true)?;
    let monthly_payment = check_amount("monthly_payment", monthly_payment, false)?;
    check_paid(total_amount, paid_amount)?;
    conn.execute(
        "INSERT INTO debts(family_id, description, total_amount, paid_amount, monthly_payment)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            &session.family_id,
            &description,
            total_amount.to_string(),
            paid_amount.to_string(),
            monthly_payment.to_string()
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, family = %session.family_id, "debt added");
    get(conn, session, id)
}

fn decode(r: &Row<'_>) -> rusqlite::Result<(i64, String, String, String, String, String)> {
    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?))
}

fn to_debt(
    (id, family_id, description, total, paid, monthly): (
        i64,
        String,
        String,
        String,
        String,
        String,
    ),
) -> Result<Debt> {
    let debt = Debt {
        total_amount: stored_decimal("debts", id, &total)?,
        paid_amount: stored_decimal("debts", id, &paid)?,
        monthly_payment: stored_decimal("debts", id, &monthly)?,
        id,
        family_id,
        description,
    };
    if debt.paid_amount > debt.total_amount {
        return Err(FinanceError::integrity(format!(
            "debt {} has paid {} above total {}",
            debt.id, debt.paid_amount, debt.total_amount
        )));
    }
    Ok(debt)
}

pub fn get(conn: &Connection, session: &Session, id: i64) -> Result<Debt> {
    let row = conn
        .query_row(
            "SELECT id, family_id, description, total_amount, paid_amount, monthly_payment
             FROM debts WHERE id=?1 AND family_id=?2",
            params![id, &session.family_id],
            decode,
        )
        .optional()?
        .ok_or_else(|| FinanceError::not_found("debt", id))?;
    to_debt(row)
}

pub fn list(conn: &Connection, session: &Session) -> Result<Vec<Debt>> {
    let mut stmt = conn.prepare(
        "SELECT id, family_id, description, total_amount, paid_amount, monthly_payment
         FROM debts WHERE family_id=?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![&session.family_id], decode)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(to_debt(row?)?);
    }
    Ok(out)
}

/// Adds a payment; rejected when it would push `paid_amount` past the total.
pub fn pay(conn: &mut Connection, session: &Session, id: i64, amount: Decimal) -> Result<Debt> {
    let amount = check_amount("amount", amount, false)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let debt = get(&tx, session, id)?;
    let paid = debt.paid_amount + amount;
    check_paid(debt.total_amount, paid)?;
    tx.execute(
        "UPDATE debts SET paid_amount=?1 WHERE id=?2 AND family_id=?3",
        params![paid.to_string(), id, &session.family_id],
    )?;
    let updated = get(&tx, session, id)?;
    tx.commit()?;
    tracing::info!(id, family = %session.family_id, %amount, "debt payment recorded");
    Ok(updated)
}

pub fn delete(conn: &Connection, session: &Session, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM debts WHERE id=?1 AND family_id=?2",
        params![id, &session.family_id],
    )?;
    if n == 0 {
        return Err(FinanceError::not_found("debt", id));
    }
    tracing::info!(id, family = %session.family_id, "debt deleted");
    Ok(())
}
