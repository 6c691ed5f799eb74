// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Budget plan versus ledger actuals.

use crate::aggregate::{MonthTotals, monthly_totals};
use crate::auth::Session;
use crate::error::Result;
use crate::ledger;
use crate::models::{Budget, BudgetCategory, Priority, YearMonth};
use crate::utils::{percentage, ratio_percent, round_money};
use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

const SAFE_LIMIT: u32 = 70;
const MODERATE_LIMIT: u32 = 90;
const FULL: u32 = 100;
const TRENDING_UP_LIMIT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    NoBudget,
    Safe,
    Moderate,
    High,
    Exceeded,
}

impl Status {
    pub fn for_percentage(pct: Decimal) -> Status {
        if pct <= Decimal::from(SAFE_LIMIT) {
            Status::Safe
        } else if pct <= Decimal::from(MODERATE_LIMIT) {
            Status::Moderate
        } else if pct <= Decimal::from(FULL) {
            Status::High
        } else {
            Status::Exceeded
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::NoBudget => "no_budget",
            Status::Safe => "safe",
            Status::Moderate => "moderate",
            Status::High => "high",
            Status::Exceeded => "exceeded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    Safe,
    Moderate,
    High,
    Exceeded,
    Danger,
}

impl Health {
    fn from_status(s: Status) -> Health {
        match s {
            Status::NoBudget | Status::Safe => Health::Safe,
            Status::Moderate => Health::Moderate,
            Status::High => Health::High,
            Status::Exceeded => Health::Exceeded,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Health::Safe => "safe",
            Health::Moderate => "moderate",
            Health::High => "high",
            Health::Exceeded => "exceeded",
            Health::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluatedCategory {
    #[serde(flatten)]
    pub category: BudgetCategory,
    pub priority_label: &'static str,
    pub actual_spent: Decimal,
    pub percentage_used: Decimal,
    pub remaining_amount: Decimal,
    pub is_over_budget: bool,
    pub status: Status,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluatedBudget {
    pub id: i64,
    pub month: u32,
    pub year: i32,
    pub planned_income: Decimal,
    pub planned_expenses: Decimal,
    pub actual_income: Decimal,
    pub actual_expenses: Decimal,
    pub income_percentage: Decimal,
    pub expenses_percentage: Decimal,
    pub budget_health: Health,
    pub categories: Vec<EvaluatedCategory>,
}

pub fn evaluate_category(category: &BudgetCategory, actuals: &MonthTotals) -> EvaluatedCategory {
    let actual_spent = actuals.spent_on(&category.category_name);
    let remaining_amount = category.planned_amount - actual_spent;
    let (percentage_used, status) = if category.planned_amount.is_zero() {
        (Decimal::ZERO, Status::NoBudget)
    } else {
        let ratio = ratio_percent(actual_spent, category.planned_amount);
        (round_money(ratio), Status::for_percentage(ratio))
    };
    EvaluatedCategory {
        category: category.clone(),
        priority_label: category.priority.label(),
        actual_spent,
        percentage_used,
        remaining_amount,
        is_over_budget: remaining_amount < Decimal::ZERO,
        status,
    }
}

/// Worst band across the planned categories; an `alta` category past its plan means `danger`.
/// `expenses_ratio` is the unrounded share of planned expenses spent.
pub fn budget_health(categories: &[EvaluatedCategory], expenses_ratio: Decimal) -> Health {
    let planned: Vec<&EvaluatedCategory> = categories
        .iter()
        .filter(|c| c.status != Status::NoBudget)
        .collect();
    if planned
        .iter()
        .any(|c| c.category.priority == Priority::Alta && c.status == Status::Exceeded)
    {
        return Health::Danger;
    }
    match planned.iter().map(|c| c.status).max() {
        Some(worst) => Health::from_status(worst),
        None if expenses_ratio.is_zero() => Health::Safe,
        None => Health::from_status(Status::for_percentage(expenses_ratio)),
    }
}

/// Pure: same budget and actuals always give the same result.
pub fn evaluate(budget: &Budget, actuals: &MonthTotals) -> EvaluatedBudget {
    let categories: Vec<EvaluatedCategory> = budget
        .categories
        .iter()
        .map(|c| evaluate_category(c, actuals))
        .collect();
    let expenses_ratio = ratio_percent(actuals.expenses, budget.planned_expenses);
    EvaluatedBudget {
        id: budget.id,
        month: budget.month,
        year: budget.year,
        planned_income: budget.planned_income,
        planned_expenses: budget.planned_expenses,
        actual_income: actuals.income,
        actual_expenses: actuals.expenses,
        income_percentage: percentage(actuals.income, budget.planned_income),
        expenses_percentage: round_money(expenses_ratio),
        budget_health: budget_health(&categories, expenses_ratio),
        categories,
    }
}

fn month_actuals(
    conn: &rusqlite::Connection,
    session: &Session,
    month: YearMonth,
) -> Result<MonthTotals> {
    let entries = ledger::entries(conn, session, month, month)?;
    Ok(monthly_totals(&entries).remove(&month).unwrap_or_default())
}

pub fn evaluate_stored(
    conn: &rusqlite::Connection,
    session: &Session,
    budget: &Budget,
) -> Result<EvaluatedBudget> {
    let actuals = month_actuals(conn, session, budget.period())?;
    let evaluated = evaluate(budget, &actuals);
    tracing::debug!(
        budget = budget.id,
        health = evaluated.budget_health.as_str(),
        "budget evaluated"
    );
    Ok(evaluated)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedCategory {
    #[serde(flatten)]
    pub evaluated: EvaluatedCategory,
    pub previous_spent: Decimal,
    pub trend: Decimal,
    pub trend_direction: TrendDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Success,
    Info,
}

#[derive(Debug, Clone, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetAnalytics {
    pub budget_overview: EvaluatedBudget,
    pub projected_month_expense: Decimal,
    pub projection_vs_budget: Decimal,
    pub categories: Vec<AnalyzedCategory>,
    pub insights: Vec<Insight>,
}

fn one_decimal(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Month-over-month change in percent; no previous spend reads as stable.
pub fn trend(current: Decimal, previous: Decimal) -> (Decimal, TrendDirection) {
    if previous <= Decimal::ZERO {
        return (Decimal::ZERO, TrendDirection::Stable);
    }
    let t = one_decimal((current - previous) / previous * Decimal::ONE_HUNDRED);
    let dir = if t > Decimal::ZERO {
        TrendDirection::Up
    } else if t < Decimal::ZERO {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };
    (t, dir)
}

fn names_where(
    categories: &[AnalyzedCategory],
    pred: impl Fn(&AnalyzedCategory) -> bool,
) -> Vec<String> {
    categories
        .iter()
        .filter(|c| pred(c))
        .map(|c| c.evaluated.category.category_name.clone())
        .collect()
}

fn insights(categories: &[AnalyzedCategory]) -> Vec<Insight> {
    let mut out = Vec::new();

    let over = names_where(categories, |c| c.evaluated.is_over_budget);
    if !over.is_empty() {
        out.push(Insight {
            kind: InsightKind::Warning,
            title: "Categories over budget".into(),
            message: format!("{} category(ies) exceeded the planned amount.", over.len()),
            categories: over,
        });
    }

    let efficient = names_where(categories, |c| {
        c.evaluated.status != Status::NoBudget
            && ratio_percent(c.evaluated.actual_spent, c.evaluated.category.planned_amount)
                < Decimal::from(SAFE_LIMIT)
    });
    if !efficient.is_empty() {
        out.push(Insight {
            kind: InsightKind::Success,
            title: "Good savings".into(),
            message: format!("{} category(ies) are well below budget.", efficient.len()),
            categories: efficient,
        });
    }

    let rising = names_where(categories, |c| c.trend > Decimal::from(TRENDING_UP_LIMIT));
    if !rising.is_empty() {
        out.push(Insight {
            kind: InsightKind::Info,
            title: "Spending on the rise".into(),
            message: format!(
                "{} category(ies) grew more than {}% over last month.",
                rising.len(),
                TRENDING_UP_LIMIT
            ),
            categories: rising,
        });
    }
    out
}

/// Evaluation plus trends against `previous`, a month-end projection and insights.
pub fn analyze(
    budget: &Budget,
    current: &MonthTotals,
    previous: &MonthTotals,
    today: NaiveDate,
) -> BudgetAnalytics {
    let overview = evaluate(budget, current);
    let period = budget.period();
    let days = period.days();
    let elapsed = if period.contains(today) {
        today.day()
    } else {
        days
    };
    let projected = round_money(current.expenses / Decimal::from(elapsed) * Decimal::from(days));
    let projection_vs_budget = if budget.planned_expenses.is_zero() {
        Decimal::ZERO
    } else {
        one_decimal(projected / budget.planned_expenses * Decimal::ONE_HUNDRED)
    };

    let categories: Vec<AnalyzedCategory> = overview
        .categories
        .iter()
        .map(|c| {
            let previous_spent = previous.spent_on(&c.category.category_name);
            let (t, dir) = trend(c.actual_spent, previous_spent);
            AnalyzedCategory {
                evaluated: c.clone(),
                previous_spent,
                trend: t,
                trend_direction: dir,
            }
        })
        .collect();

    BudgetAnalytics {
        insights: insights(&categories),
        budget_overview: overview,
        projected_month_expense: projected,
        projection_vs_budget,
        categories,
    }
}

pub fn analyze_stored(
    conn: &rusqlite::Connection,
    session: &Session,
    budget: &Budget,
    today: NaiveDate,
) -> Result<BudgetAnalytics> {
    let period = budget.period();
    let current = month_actuals(conn, session, period)?;
    let previous = month_actuals(conn, session, period.add_months(-1))?;
    Ok(analyze(budget, &current, &previous, today))
}
