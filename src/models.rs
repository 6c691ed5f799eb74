// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{FinanceError, Result};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month, rendered `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(FinanceError::validation(
                "month",
                format!("{} is not between 1 and 12", month),
            ));
        }
        Ok(YearMonth { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(self) -> NaiveDate {
        self.add_months(1)
            .first_day()
            .pred_opt()
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn days(self) -> u32 {
        self.last_day().day()
    }

    /// Day `day` of this month, clamped to the month's last day.
    pub fn clamped_day(self, day: u32) -> NaiveDate {
        let d = day.clamp(1, self.days());
        NaiveDate::from_ymd_opt(self.year, self.month, d).unwrap_or_else(|| self.last_day())
    }

    pub fn add_months(self, n: i32) -> Self {
        let idx = self.year * 12 + (self.month as i32 - 1) + n;
        YearMonth {
            year: idx.div_euclid(12),
            month: (idx.rem_euclid(12) + 1) as u32,
        }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// `MM/YYYY`, the label used on evolution charts.
    pub fn label(self) -> String {
        format!("{:02}/{}", self.month, self.year)
    }

    /// Inclusive range of months from `self` to `end`.
    pub fn through(self, end: YearMonth) -> Vec<YearMonth> {
        let mut out = Vec::new();
        let mut cur = self;
        while cur <= end {
            out.push(cur);
            cur = cur.add_months(1);
        }
        out
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (y, m) = s
            .split_once('-')
            .ok_or_else(|| FinanceError::validation("month", format!("'{}' is not YYYY-MM", s)))?;
        let year: i32 = y
            .parse()
            .map_err(|_| FinanceError::validation("month", format!("'{}' is not YYYY-MM", s)))?;
        let month: u32 = m
            .parse()
            .map_err(|_| FinanceError::validation("month", format!("'{}' is not YYYY-MM", s)))?;
        YearMonth::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = FinanceError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> String {
        ym.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    #[serde(alias = "receita")]
    Income,
    #[serde(alias = "despesa")]
    Expense,
}

impl TxKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TxKind::Income => "income",
            TxKind::Expense => "expense",
        }
    }
}

impl FromStr for TxKind {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" | "receita" => Ok(TxKind::Income),
            "expense" | "despesa" => Ok(TxKind::Expense),
            other => Err(FinanceError::validation(
                "type",
                format!("'{}' is neither income nor expense", other),
            )),
        }
    }
}

/// Links a transaction to the card installment it settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentLink {
    pub purchase_id: i64,
    pub index: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub family_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub amount: Decimal,
    pub kind: TxKind,
    pub payment_method: String,
    pub installment: Option<InstallmentLink>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub amount: Decimal,
    pub kind: TxKind,
    pub payment_method: String,
    pub installment: Option<InstallmentLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: i64,
    pub family_id: String,
    pub name: String,
    pub closing_day: u32,
    pub due_day: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub card_id: i64,
    pub description: String,
    pub category: String,
    pub total_amount: Decimal,
    pub installment_count: u32,
    pub purchase_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub description: String,
    pub category: String,
    pub total_amount: Decimal,
    pub installment_count: u32,
    pub purchase_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub purchase_id: i64,
    pub index: u32,
    pub amount: Decimal,
    pub due_month: YearMonth,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investment {
    pub id: i64,
    pub family_id: String,
    pub date: NaiveDate,
    pub asset_name: String,
    pub asset_type: String,
    pub broker: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    pub id: i64,
    pub family_id: String,
    pub description: String,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub monthly_payment: Decimal,
}

impl Debt {
    pub fn remaining_amount(&self) -> Decimal {
        (self.total_amount - self.paid_amount).max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub family_id: String,
    pub name: String,
    pub target_amount: Decimal,
    pub saved_amount: Decimal,
    pub version: i64,
}

impl Goal {
    /// Clamped to 100 once the target is reached.
    pub fn progress_percentage(&self) -> Decimal {
        if self.target_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let pct = self.saved_amount / self.target_amount * Decimal::ONE_HUNDRED;
        crate::utils::round_money(pct.min(Decimal::ONE_HUNDRED))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Alta = 1,
    Media = 2,
    Baixa = 3,
}

impl Priority {
    pub fn rank(self) -> i64 {
        self as i64
    }

    pub fn from_rank(rank: i64) -> Result<Self> {
        match rank {
            1 => Ok(Priority::Alta),
            2 => Ok(Priority::Media),
            3 => Ok(Priority::Baixa),
            other => Err(FinanceError::integrity(format!(
                "budget category priority {} is out of range",
                other
            ))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Alta => "alta",
            Priority::Media => "media",
            Priority::Baixa => "baixa",
        }
    }
}

impl FromStr for Priority {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1" | "alta" | "high" => Ok(Priority::Alta),
            "2" | "media" | "média" | "medium" => Ok(Priority::Media),
            "3" | "baixa" | "low" => Ok(Priority::Baixa),
            other => Err(FinanceError::validation(
                "priority",
                format!("'{}' is not alta, media or baixa", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub id: i64,
    pub budget_id: i64,
    pub category_name: String,
    pub planned_amount: Decimal,
    pub color: String,
    pub description: String,
    pub priority: Priority,
    pub version: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub family_id: String,
    pub month: u32,
    pub year: i32,
    pub planned_income: Decimal,
    pub planned_expenses: Decimal,
    pub categories: Vec<BudgetCategory>,
}

impl Budget {
    pub fn period(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }
}

/// Where an aggregated ledger entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum EntrySource {
    Transaction { id: i64 },
    Installment { purchase_id: i64, index: u32 },
}

/// One row of the union the engine aggregates over: transactions plus open installments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub date: NaiveDate,
    pub month: YearMonth,
    pub category: String,
    pub amount: Decimal,
    pub kind: TxKind,
    pub source: EntrySource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_months_crosses_year_boundaries() {
        let nov = YearMonth::new(2025, 11).unwrap();
        assert_eq!(nov.add_months(3), YearMonth::new(2026, 2).unwrap());
        assert_eq!(nov.add_months(-11), YearMonth::new(2024, 12).unwrap());
    }

    #[test]
    fn clamped_day_respects_month_length() {
        let feb = YearMonth::new(2024, 2).unwrap();
        assert_eq!(feb.clamped_day(31), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let apr = YearMonth::new(2025, 4).unwrap();
        assert_eq!(apr.clamped_day(31), NaiveDate::from_ymd_opt(2025, 4, 30).unwrap());
    }

    #[test]
    fn parses_and_renders_year_month() {
        let ym: YearMonth = " 2025-03 ".parse().unwrap();
        assert_eq!(ym.to_string(), "2025-03");
        assert_eq!(ym.label(), "03/2025");
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("march".parse::<YearMonth>().is_err());
    }

    #[test]
    fn goal_progress_is_clamped() {
        let mut goal = Goal {
            id: 1,
            family_id: "f".into(),
            name: "Trip".into(),
            target_amount: Decimal::new(5000, 0),
            saved_amount: Decimal::new(5000, 0),
            version: 0,
        };
        assert_eq!(goal.progress_percentage(), Decimal::ONE_HUNDRED);
        goal.saved_amount = Decimal::new(7500, 0);
        assert_eq!(goal.progress_percentage(), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn debt_remaining_never_negative() {
        let debt = Debt {
            id: 1,
            family_id: "f".into(),
            description: "Car".into(),
            total_amount: Decimal::new(1000, 0),
            paid_amount: Decimal::new(1000, 0),
            monthly_payment: Decimal::new(100, 0),
        };
        assert_eq!(debt.remaining_amount(), Decimal::ZERO);
    }
}
