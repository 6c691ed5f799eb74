// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::Session;
use crate::error::{FinanceError, Result};
use crate::installments;
use crate::models::{
    CreditCard, Installment, InstallmentLink, NewPurchase, NewTransaction, Purchase, Transaction,
    TxKind, YearMonth,
};
use crate::utils::{check_amount, check_day_of_month, require_text, stored_date, stored_decimal};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use serde::Serialize;

pub const DEFAULT_PURCHASE_CATEGORY: &str = "Cartão de Crédito";
pub const CARD_PAYMENT_METHOD: &str = "credit_card";

/// An installment joined with its purchase, as listed per card.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledInstallment {
    pub card_id: i64,
    pub description: String,
    pub category: String,
    pub installment_count: u32,
    pub paid_by: Option<i64>,
    #[serde(flatten)]
    pub installment: Installment,
}

pub fn add_card(
    conn: &Connection,
    session: &Session,
    name: &str,
    closing_day: u32,
    due_day: u32,
) -> Result<CreditCard> {
    let name = require_text("name", name)?;
    let closing_day = check_day_of_month("closing_day", closing_day)?;
    let due_day = check_day_of_month("due_day", due_day)?;
    conn.execute(
        "INSERT INTO credit_cards(family_id, name, closing_day, due_day) VALUES (?1, ?2, ?3, ?4)",
        params![&session.family_id, &name, closing_day, due_day],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, family = %session.family_id, "credit card added");
    get_card(conn, session, id)
}

fn card_row(r: &Row<'_>) -> rusqlite::Result<CreditCard> {
    Ok(CreditCard {
        id: r.get(0)?,
        family_id: r.get(1)?,
        name: r.get(2)?,
        closing_day: r.get(3)?,
        due_day: r.get(4)?,
    })
}

pub fn get_card(conn: &Connection, session: &Session, id: i64) -> Result<CreditCard> {
    conn.query_row(
        "SELECT id, family_id, name, closing_day, due_day FROM credit_cards
         WHERE id=?1 AND family_id=?2",
        params![id, &session.family_id],
        card_row,
    )
    .optional()?
    .ok_or_else(|| FinanceError::not_found("credit card", id))
}

pub fn list_cards(conn: &Connection, session: &Session) -> Result<Vec<CreditCard>> {
    let mut stmt = conn.prepare(
        "SELECT id, family_id, name, closing_day, due_day FROM credit_cards
         WHERE family_id=?1 ORDER BY name, id",
    )?;
    let rows = stmt.query_map(params![&session.family_id], card_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Removes the card together with its purchases and their installments.
pub fn delete_card(conn: &Connection, session: &Session, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM credit_cards WHERE id=?1 AND family_id=?2",
        params![id, &session.family_id],
    )?;
    if n == 0 {
        return Err(FinanceError::not_found("credit card", id));
    }
    tracing::info!(id, family = %session.family_id, "credit card deleted");
    Ok(())
}

/// Stores the purchase and every projected installment in one immediate transaction.
pub fn add_purchase(
    conn: &mut Connection,
    session: &Session,
    card_id: i64,
    new: NewPurchase,
) -> Result<(Purchase, Vec<Installment>)> {
    let description = require_text("description", &new.description)?;
    let category = match new.category.trim() {
        "" => DEFAULT_PURCHASE_CATEGORY.to_string(),
        c => c.to_string(),
    };
    let total_amount = check_amount("total_amount", new.total_amount, false)?;
    let installment_count = installments::check_count(new.installment_count)?;

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let card = get_card(&tx, session, card_id)?;
    tx.execute(
        "INSERT INTO purchases
             (card_id, description, category, total_amount, installment_count, purchase_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            card.id,
            &description,
            &category,
            total_amount.to_string(),
            installment_count,
            new.purchase_date.to_string()
        ],
    )?;
    let purchase = Purchase {
        id: tx.last_insert_rowid(),
        card_id: card.id,
        description,
        category,
        total_amount,
        installment_count,
        purchase_date: new.purchase_date,
    };
    let schedule = installments::expand(&purchase, &card)?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO installments(purchase_id, idx, amount, due_month, due_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for inst in &schedule {
            stmt.execute(params![
                inst.purchase_id,
                inst.index,
                inst.amount.to_string(),
                inst.due_month.to_string(),
                inst.due_date.to_string()
            ])?;
        }
    }
    tx.commit()?;
    tracing::info!(
        purchase_id = purchase.id,
        card_id,
        installments = schedule.len(),
        total = %purchase.total_amount,
        "card purchase recorded"
    );
    Ok((purchase, schedule))
}

fn purchase_row(r: &Row<'_>) -> rusqlite::Result<(i64, i64, String, String, String, u32, String)> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
    ))
}

fn decode_purchase(
    (id, card_id, description, category, total, count, date): (
        i64,
        i64,
        String,
        String,
        String,
        u32,
        String,
    ),
) -> Result<Purchase> {
    Ok(Purchase {
        total_amount: stored_decimal("purchases", id, &total)?,
        purchase_date: stored_date("purchases", id, &date)?,
        id,
        card_id,
        description,
        category,
        installment_count: count,
    })
}

pub fn get_purchase(conn: &Connection, session: &Session, id: i64) -> Result<Purchase> {
    let row = conn
        .query_row(
            "SELECT p.id, p.card_id, p.description, p.category, p.total_amount,
                    p.installment_count, p.purchase_date
             FROM purchases p JOIN credit_cards c ON p.card_id=c.id
             WHERE p.id=?1 AND c.family_id=?2",
            params![id, &session.family_id],
            purchase_row,
        )
        .optional()?
        .ok_or_else(|| FinanceError::not_found("purchase", id))?;
    decode_purchase(row)
}

pub fn list_purchases(conn: &Connection, session: &Session) -> Result<Vec<Purchase>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.card_id, p.description, p.category, p.total_amount,
                p.installment_count, p.purchase_date
         FROM purchases p JOIN credit_cards c ON p.card_id=c.id
         WHERE c.family_id=?1 ORDER BY p.purchase_date, p.id",
    )?;
    let rows = stmt.query_map(params![&session.family_id], purchase_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(decode_purchase(row?)?);
    }
    Ok(out)
}

/// Installments for the family, optionally limited to one card and a due-month range.
pub fn scheduled(
    conn: &Connection,
    session: &Session,
    card_id: Option<i64>,
    months: Option<(YearMonth, YearMonth)>,
) -> Result<Vec<ScheduledInstallment>> {
    let (from, to) = months
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .unwrap_or_else(|| ("0000-01".to_string(), "9999-12".to_string()));
    let mut stmt = conn.prepare(
        "SELECT p.card_id, p.description, p.category, p.installment_count,
                i.purchase_id, i.idx, i.amount, i.due_month, i.due_date, t.id
         FROM installments i
         JOIN purchases p ON i.purchase_id=p.id
         JOIN credit_cards c ON p.card_id=c.id
         LEFT JOIN transactions t ON t.purchase_id=i.purchase_id AND t.installment_index=i.idx
         WHERE c.family_id=?1 AND (?2 IS NULL OR c.id=?2) AND i.due_month>=?3 AND i.due_month<=?4
         ORDER BY i.due_month, i.purchase_id, i.idx",
    )?;
    let mut rows = stmt.query(params![&session.family_id, card_id, &from, &to])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let purchase_id: i64 = r.get(4)?;
        let amount: String = r.get(6)?;
        let due_month: String = r.get(7)?;
        let due_date: String = r.get(8)?;
        let due_month = due_month.parse().map_err(|_| {
            FinanceError::integrity(format!(
                "installment {} holds invalid due month '{}'",
                purchase_id, due_month
            ))
        })?;
        out.push(ScheduledInstallment {
            card_id: r.get(0)?,
            description: r.get(1)?,
            category: r.get(2)?,
            installment_count: r.get(3)?,
            paid_by: r.get(9)?,
            installment: Installment {
                purchase_id,
                index: r.get(5)?,
                amount: stored_decimal("installments", purchase_id, &amount)?,
                due_month,
                due_date: stored_date("installments", purchase_id, &due_date)?,
            },
        });
    }
    Ok(out)
}

/// Records the expense settling one installment and links it, so it is counted once.
pub fn pay_installment(
    conn: &mut Connection,
    session: &Session,
    purchase_id: i64,
    index: u32,
    date: NaiveDate,
) -> Result<Transaction> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let purchase = get_purchase(&tx, session, purchase_id)?;
    let amount: String = tx
        .query_row(
            "SELECT amount FROM installments WHERE purchase_id=?1 AND idx=?2",
            params![purchase_id, index],
            |r| r.get(0),
        )
        .optional()?
        .ok_or_else(|| {
            FinanceError::not_found("installment", format!("{}/{}", purchase_id, index))
        })?;
    let settled: Option<i64> = tx
        .query_row(
            "SELECT id FROM transactions WHERE purchase_id=?1 AND installment_index=?2",
            params![purchase_id, index],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(existing) = settled {
        return Err(FinanceError::Conflict(format!(
            "installment {}/{} already settled by transaction {}",
            index, purchase.installment_count, existing
        )));
    }
    let created = super::transactions::add(
        &tx,
        session,
        NewTransaction {
            date,
            description: format!(
                "{} ({}/{})",
                purchase.description, index, purchase.installment_count
            ),
            category: purchase.category.clone(),
            amount: stored_decimal("installments", purchase_id, &amount)?,
            kind: TxKind::Expense,
            payment_method: CARD_PAYMENT_METHOD.to_string(),
            installment: Some(InstallmentLink { purchase_id, index }),
        },
    )?;
    tx.commit()?;
    Ok(created)
}
