// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Period summaries over the ledger's entry stream.

use crate::auth::Session;
use crate::error::{FinanceError, Result};
use crate::ledger;
use crate::models::{Entry, EntrySource, Investment, TxKind, YearMonth};
use crate::utils::same_category;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub const EVOLUTION_MONTHS: i32 = 6;

/// Inclusive date range a summary covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(FinanceError::validation(
                "window",
                format!("start {} is after end {}", start, end),
            ));
        }
        Ok(Window { start, end })
    }

    pub fn month(ym: YearMonth) -> Self {
        Window {
            start: ym.first_day(),
            end: ym.last_day(),
        }
    }

    /// The calendar month containing `today`.
    pub fn current(today: NaiveDate) -> Self {
        Window::month(YearMonth::of(today))
    }

    pub fn first_month(&self) -> YearMonth {
        YearMonth::of(self.start)
    }

    pub fn last_month(&self) -> YearMonth {
        YearMonth::of(self.end)
    }

    /// Transactions match by date; installments by due month.
    pub fn includes(&self, entry: &Entry) -> bool {
        match entry.source {
            EntrySource::Transaction { .. } => entry.date >= self.start && entry.date <= self.end,
            EntrySource::Installment { .. } => {
                entry.month >= self.first_month() && entry.month <= self.last_month()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    #[serde(rename = "month")]
    pub month_label: String,
    pub income: Decimal,
    pub expenses: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub window: Window,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub monthly_evolution: Vec<MonthBucket>,
}

/// Income, expense and per-category spend of one month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthTotals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub by_category: BTreeMap<String, Decimal>,
    pub entries: usize,
}

impl MonthTotals {
    fn add(&mut self, entry: &Entry) {
        self.entries += 1;
        match entry.kind {
            TxKind::Income => self.income += entry.amount,
            TxKind::Expense => {
                self.expenses += entry.amount;
                *self
                    .by_category
                    .entry(entry.category.clone())
                    .or_insert(Decimal::ZERO) += entry.amount;
            }
        }
    }

    /// Spend recorded under `category`, matched the way budget categories are.
    pub fn spent_on(&self, category: &str) -> Decimal {
        self.by_category
            .iter()
            .filter(|(name, _)| same_category(name, category))
            .map(|(_, amount)| *amount)
            .sum()
    }
}

/// Groups entries by their attributed month.
pub fn monthly_totals(entries: &[Entry]) -> BTreeMap<YearMonth, MonthTotals> {
    let mut map: BTreeMap<YearMonth, MonthTotals> = BTreeMap::new();
    for e in entries {
        map.entry(e.month).or_default().add(e);
    }
    map
}

/// Descending by amount, ties by name ascending.
pub fn sort_categories(totals: impl IntoIterator<Item = (String, Decimal)>) -> Vec<CategoryTotal> {
    let mut items: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, amount)| CategoryTotal { category, amount })
        .collect();
    items.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    items
}

/// Pure summary of `entries` over `window`; the evolution always spans six months.
pub fn summarize_entries(entries: &[Entry], window: Window) -> Summary {
    let mut income = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;
    let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
    for e in entries.iter().filter(|e| window.includes(e)) {
        match e.kind {
            TxKind::Income => income += e.amount,
            TxKind::Expense => {
                expenses += e.amount;
                *by_category.entry(e.category.clone()).or_insert(Decimal::ZERO) += e.amount;
            }
        }
    }

    let monthly = monthly_totals(entries);
    let last = window.last_month();
    let monthly_evolution = last
        .add_months(1 - EVOLUTION_MONTHS)
        .through(last)
        .into_iter()
        .map(|m| {
            let t = monthly.get(&m).cloned().unwrap_or_default();
            MonthBucket {
                month_label: m.label(),
                income: t.income,
                expenses: t.expenses,
            }
        })
        .collect();

    Summary {
        window,
        total_income: income,
        total_expenses: expenses,
        balance: income - expenses,
        expenses_by_category: sort_categories(by_category),
        monthly_evolution,
    }
}

pub fn summarize(
    conn: &rusqlite::Connection,
    session: &Session,
    window: Window,
) -> Result<Summary> {
    let last = window.last_month();
    let from = window.first_month().min(last.add_months(1 - EVOLUTION_MONTHS));
    let entries = ledger::entries(conn, session, from, last)?;
    let summary = summarize_entries(&entries, window);
    tracing::debug!(
        family = %session.family_id,
        start = %window.start,
        end = %window.end,
        income = %summary.total_income,
        expenses = %summary.total_expenses,
        "summary computed"
    );
    Ok(summary)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthAmount {
    pub month: YearMonth,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetTypeTotal {
    pub asset_type: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvestmentSummary {
    pub total_invested: Decimal,
    pub monthly_evolution: Vec<MonthAmount>,
    pub by_asset_type: Vec<AssetTypeTotal>,
}

pub fn investment_summary(investments: &[Investment]) -> InvestmentSummary {
    let mut by_month: BTreeMap<YearMonth, Decimal> = BTreeMap::new();
    let mut by_type: BTreeMap<String, Decimal> = BTreeMap::new();
    for inv in investments {
        *by_month.entry(YearMonth::of(inv.date)).or_insert(Decimal::ZERO) += inv.amount;
        *by_type.entry(inv.asset_type.clone()).or_insert(Decimal::ZERO) += inv.amount;
    }
    let mut by_asset_type: Vec<AssetTypeTotal> = by_type
        .into_iter()
        .map(|(asset_type, amount)| AssetTypeTotal { asset_type, amount })
        .collect();
    by_asset_type.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.asset_type.cmp(&b.asset_type))
    });
    InvestmentSummary {
        total_invested: investments.iter().map(|i| i.amount).sum(),
        monthly_evolution: by_month
            .into_iter()
            .map(|(month, amount)| MonthAmount { month, amount })
            .collect(),
        by_asset_type,
    }
}
