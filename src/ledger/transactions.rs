// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::Session;
use crate::error::{FinanceError, Result};
use crate::models::{InstallmentLink, NewTransaction, Transaction, YearMonth};
use crate::utils::{check_amount, require_text, stored_date, stored_decimal};
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str = "id, family_id, date, description, category, amount, kind, payment_method, \
                       purchase_id, installment_index";

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub month: Option<YearMonth>,
    pub category: Option<String>,
    pub limit: Option<usize>,
}

struct RawTransaction {
    id: i64,
    family_id: String,
    date: String,
    description: String,
    category: String,
    amount: String,
    kind: String,
    payment_method: String,
    purchase_id: Option<i64>,
    installment_index: Option<u32>,
}

fn raw(r: &Row<'_>) -> rusqlite::Result<RawTransaction> {
    Ok(RawTransaction {
        id: r.get(0)?,
        family_id: r.get(1)?,
        date: r.get(2)?,
        description: r.get(3)?,
        category: r.get(4)?,
        amount: r.get(5)?,
        kind: r.get(6)?,
        payment_method: r.get(7)?,
        purchase_id: r.get(8)?,
        installment_index: r.get(9)?,
    })
}

fn decode(t: RawTransaction) -> Result<Transaction> {
    let installment = match (t.purchase_id, t.installment_index) {
        (Some(purchase_id), Some(index)) => Some(InstallmentLink { purchase_id, index }),
        _ => None,
    };
    let kind = t.kind.parse().map_err(|_| {
        FinanceError::integrity(format!("transactions row {} has kind '{}'", t.id, t.kind))
    })?;
    Ok(Transaction {
        date: stored_date("transactions", t.id, &t.date)?,
        amount: stored_decimal("transactions", t.id, &t.amount)?,
        id: t.id,
        family_id: t.family_id,
        description: t.description,
        category: t.category,
        kind,
        payment_method: t.payment_method,
        installment,
    })
}

pub fn add(conn: &Connection, session: &Session, new: NewTransaction) -> Result<Transaction> {
    let description = require_text("description", &new.description)?;
    let category = require_text("category", &new.category)?;
    let payment_method = require_text("payment_method", &new.payment_method)?;
    let amount = check_amount("amount", new.amount, false)?;

    conn.execute(
        "INSERT INTO transactions
             (family_id, date, description, category, amount, kind, payment_method,
              purchase_id, installment_index)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            &session.family_id,
            new.date.to_string(),
            &description,
            &category,
            amount.to_string(),
            new.kind.as_str(),
            &payment_method,
            new.installment.map(|l| l.purchase_id),
            new.installment.map(|l| l.index),
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(
        id,
        family = %session.family_id,
        kind = new.kind.as_str(),
        %amount,
        "transaction recorded"
    );
    get(conn, session, id)
}

pub fn get(conn: &Connection, session: &Session, id: i64) -> Result<Transaction> {
    let sql = format!("SELECT {} FROM transactions WHERE id=?1 AND family_id=?2", COLUMNS);
    let row = conn
        .query_row(&sql, params![id, &session.family_id], raw)
        .optional()?
        .ok_or_else(|| FinanceError::not_found("transaction", id))?;
    decode(row)
}

pub fn list(
    conn: &Connection,
    session: &Session,
    filter: &TransactionFilter,
) -> Result<Vec<Transaction>> {
    let mut sql = format!("SELECT {} FROM transactions WHERE family_id=?", COLUMNS);
    let mut params_vec: Vec<String> = vec![session.family_id.clone()];
    if let Some(month) = filter.month {
        sql.push_str(" AND substr(date,1,7)=?");
        params_vec.push(month.to_string());
    }
    if let Some(cat) = &filter.category {
        sql.push_str(" AND category=?");
        params_vec.push(cat.trim().to_string());
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), raw)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(decode(row?)?);
    }
    Ok(out)
}

/// Transactions dated inside `[from, to]` months, oldest first.
pub fn in_months(
    conn: &Connection,
    session: &Session,
    from: YearMonth,
    to: YearMonth,
) -> Result<Vec<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE family_id=?1 AND date>=?2 AND date<=?3
         ORDER BY date, id",
        COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![
            &session.family_id,
            from.first_day().to_string(),
            to.last_day().to_string()
        ],
        raw,
    )?;
    let mut out = Vec::new();
    for row in rows {
        out.push(decode(row?)?);
    }
    Ok(out)
}

pub fn delete(conn: &Connection, session: &Session, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM transactions WHERE id=?1 AND family_id=?2",
        params![id, &session.family_id],
    )?;
    if n == 0 {
        return Err(FinanceError::not_found("transaction", id));
    }
    tracing::info!(id, family = %session.family_id, "transaction deleted");
    Ok(())
}

/// Rewrites every editable field; the installment link of the original row is kept.
pub fn update(
    conn: &Connection,
    session: &Session,
    id: i64,
    edit: NewTransaction,
) -> Result<Transaction> {
    let description = require_text("description", &edit.description)?;
    let category = require_text("category", &edit.category)?;
    let payment_method = require_text("payment_method", &edit.payment_method)?;
    let amount = check_amount("amount", edit.amount, false)?;

    let n = conn.execute(
        "UPDATE transactions
         SET date=?1, description=?2, category=?3, amount=?4, kind=?5, payment_method=?6
         WHERE id=?7 AND family_id=?8",
        params![
            edit.date.to_string(),
            &description,
            &category,
            amount.to_string(),
            edit.kind.as_str(),
            &payment_method,
            id,
            &session.family_id,
        ],
    )?;
    if n == 0 {
        return Err(FinanceError::not_found("transaction", id));
    }
    tracing::info!(id, family = %session.family_id, "transaction edited");
    get(conn, session, id)
}
