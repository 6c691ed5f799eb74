// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::Session;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rust_decimal::Decimal;
use rusqlite::{Connection, params};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

fn issue(kind: &'static str, detail: String) -> Issue {
    Issue { kind, detail }
}

/// Money columns scoped to one family; each query yields `(id, raw amount)`.
const AMOUNT_COLUMNS: &[(&str, &str)] = &[
    ("transactions.amount", "SELECT id, amount FROM transactions WHERE family_id=?1"),
    ("investments.amount", "SELECT id, amount FROM investments WHERE family_id=?1"),
    ("debts.total_amount", "SELECT id, total_amount FROM debts WHERE family_id=?1"),
    ("debts.paid_amount", "SELECT id, paid_amount FROM debts WHERE family_id=?1"),
    ("goals.target_amount", "SELECT id, target_amount FROM goals WHERE family_id=?1"),
    ("goals.saved_amount", "SELECT id, saved_amount FROM goals WHERE family_id=?1"),
    (
        "purchases.total_amount",
        "SELECT p.id, p.total_amount FROM purchases p
         JOIN credit_cards c ON p.card_id=c.id WHERE c.family_id=?1",
    ),
    (
        "installments.amount",
        "SELECT i.purchase_id, i.amount FROM installments i JOIN purchases p ON i.purchase_id=p.id
         JOIN credit_cards c ON p.card_id=c.id WHERE c.family_id=?1",
    ),
    (
        "budget_categories.planned_amount",
        "SELECT bc.id, bc.planned_amount FROM budget_categories bc
         JOIN budgets b ON bc.budget_id=b.id WHERE b.family_id=?1",
    ),
];

pub fn issues(conn: &Connection, session: &Session) -> Result<Vec<Issue>> {
    let mut out = Vec::new();

    for (column, sql) in AMOUNT_COLUMNS {
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(params![&session.family_id])?;
        while let Some(r) = rows.next()? {
            let id: i64 = r.get(0)?;
            let raw: String = r.get(1)?;
            if raw.parse::<Decimal>().is_err() {
                out.push(issue("bad_amount", format!("{} row {}: '{}'", column, id, raw)));
            }
        }
    }

    let mut stmt = conn.prepare(
        "SELECT p.id, p.total_amount, p.installment_count FROM purchases p
         JOIN credit_cards c ON p.card_id=c.id WHERE c.family_id=?1 ORDER BY p.id",
    )?;
    let purchases = stmt.query_map(params![&session.family_id], |r| {
        Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?, r.get::<_, u32>(2)?))
    })?;
    for p in purchases {
        let (id, total, count) = p?;
        let Ok(total) = total.parse::<Decimal>() else {
            continue;
        };
        let mut st = conn.prepare("SELECT amount FROM installments WHERE purchase_id=?1")?;
        let amounts = st.query_map(params![id], |r| r.get::<_, String>(0))?;
        let mut sum = Decimal::ZERO;
        let mut n = 0u32;
        for a in amounts {
            n += 1;
            sum += a?.parse::<Decimal>().unwrap_or(Decimal::ZERO);
        }
        if n != count {
            out.push(issue(
                "installment_count",
                format!("purchase {} has {} of {} installments", id, n, count),
            ));
        }
        if sum != total {
            out.push(issue(
                "installment_sum",
                format!("purchase {} installments sum to {}, total is {}", id, sum, total),
            ));
        }
    }

    let mut stmt = conn.prepare(
        "SELECT id, total_amount, paid_amount FROM debts WHERE family_id=?1 ORDER BY id",
    )?;
    let debts = stmt.query_map(params![&session.family_id], |r| {
        Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?, r.get::<_, String>(2)?))
    })?;
    for d in debts {
        let (id, total, paid) = d?;
        if let (Ok(total), Ok(paid)) = (total.parse::<Decimal>(), paid.parse::<Decimal>()) {
            if paid > total {
                out.push(issue(
                    "debt_overpaid",
                    format!("debt {} paid {} exceeds total {}", id, paid, total),
                ));
            }
        }
    }

    for i in &out {
        tracing::error!(kind = i.kind, detail = %i.detail, "ledger integrity fault");
    }
    Ok(out)
}

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    let found = issues(conn, session)?;
    if maybe_print_json(m.get_flag("json"), &found)? {
        return Ok(());
    }
    if found.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = found
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
