// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Family-scoped persistence. Every function takes the caller's [`Session`] and
//! never touches rows belonging to another family.

pub mod budgets;
pub mod cards;
pub mod debts;
pub mod goals;
pub mod investments;
pub mod transactions;

use crate::auth::Session;
use crate::error::Result;
use crate::models::{Entry, EntrySource, TxKind, YearMonth};

/// Everything that moves income or expense totals in `[from, to]`.
///
/// Installments count as expenses in their due month unless a linked transaction
/// already settled them; investments and debts never appear here.
pub fn entries(
    conn: &rusqlite::Connection,
    session: &Session,
    from: YearMonth,
    to: YearMonth,
) -> Result<Vec<Entry>> {
    let mut out: Vec<Entry> = transactions::in_months(conn, session, from, to)?
        .into_iter()
        .map(|t| Entry {
            month: YearMonth::of(t.date),
            date: t.date,
            category: t.category,
            amount: t.amount,
            kind: t.kind,
            source: EntrySource::Transaction { id: t.id },
        })
        .collect();

    for s in cards::scheduled(conn, session, None, Some((from, to)))? {
        if s.paid_by.is_some() {
            continue;
        }
        out.push(Entry {
            date: s.installment.due_date,
            month: s.installment.due_month,
            category: s.category,
            amount: s.installment.amount,
            kind: TxKind::Expense,
            source: EntrySource::Installment {
                purchase_id: s.installment.purchase_id,
                index: s.installment.index,
            },
        });
    }
    tracing::debug!(
        family = %session.family_id,
        %from,
        %to,
        count = out.len(),
        "ledger entries loaded"
    );
    Ok(out)
}
