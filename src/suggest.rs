// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Advisory budget built from the three complete months before a reference month.

use crate::aggregate::{MonthTotals, monthly_totals};
use crate::auth::Session;
use crate::error::Result;
use crate::ledger;
use crate::models::YearMonth;
use crate::utils::round_money;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub const HISTORY_MONTHS: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySuggestion {
    pub category_name: String,
    pub suggested_amount: Decimal,
    pub confidence: Confidence,
    pub months_with_spend: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestions {
    pub reference_month: YearMonth,
    pub history: Vec<YearMonth>,
    pub suggested_income: Decimal,
    pub income_confidence: Confidence,
    pub category_suggestions: Vec<CategorySuggestion>,
    pub total_suggested_expenses: Decimal,
}

/// The history months for `reference`, oldest first.
pub fn history_months(reference: YearMonth) -> Vec<YearMonth> {
    reference
        .add_months(-HISTORY_MONTHS)
        .through(reference.add_months(-1))
}

/// Pure over `monthly`; months outside the history are ignored.
pub fn suggest(reference: YearMonth, monthly: &BTreeMap<YearMonth, MonthTotals>) -> Suggestions {
    let history = history_months(reference);
    let qualifying: Vec<&MonthTotals> = history
        .iter()
        .filter_map(|m| monthly.get(m))
        .filter(|t| t.entries > 0)
        .collect();

    let (suggested_income, income_confidence) = if qualifying.is_empty() {
        (Decimal::ZERO, Confidence::Low)
    } else {
        let n = Decimal::from(qualifying.len());
        let total: Decimal = qualifying.iter().map(|t| t.income).sum();
        let confidence = if qualifying.len() == history.len() {
            Confidence::High
        } else {
            Confidence::Medium
        };
        (round_money(total / n), confidence)
    };

    let names: BTreeSet<&String> = qualifying
        .iter()
        .flat_map(|t| t.by_category.keys())
        .collect();
    let mut category_suggestions: Vec<CategorySuggestion> = names
        .into_iter()
        .map(|name| {
            let spends: Vec<Decimal> = qualifying
                .iter()
                .map(|t| t.spent_on(name))
                .collect();
            let months_with_spend = spends.iter().filter(|d| **d > Decimal::ZERO).count();
            let total: Decimal = spends.iter().copied().sum();
            let confidence = if months_with_spend == history.len() {
                Confidence::High
            } else {
                Confidence::Medium
            };
            CategorySuggestion {
                category_name: name.clone(),
                suggested_amount: round_money(total / Decimal::from(qualifying.len())),
                confidence,
                months_with_spend,
                reason: format!(
                    "Average of {} month(s) of history, spend in {} of them",
                    qualifying.len(),
                    months_with_spend
                ),
            }
        })
        .collect();
    category_suggestions.sort_by(|a, b| {
        b.suggested_amount
            .cmp(&a.suggested_amount)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });

    Suggestions {
        reference_month: reference,
        total_suggested_expenses: category_suggestions
            .iter()
            .map(|c| c.suggested_amount)
            .sum(),
        history,
        suggested_income,
        income_confidence,
        category_suggestions,
    }
}

pub fn suggest_for(
    conn: &rusqlite::Connection,
    session: &Session,
    reference: YearMonth,
) -> Result<Suggestions> {
    let from = reference.add_months(-HISTORY_MONTHS);
    let to = reference.add_months(-1);
    let entries = ledger::entries(conn, session, from, to)?;
    let s = suggest(reference, &monthly_totals(&entries));
    tracing::debug!(
        family = %session.family_id,
        %reference,
        categories = s.category_suggestions.len(),
        "budget suggestions computed"
    );
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn month(income: &str, spend: &[(&str, &str)]) -> MonthTotals {
        let mut t = MonthTotals {
            income: dec(income),
            entries: 1,
            ..Default::default()
        };
        for (name, amount) in spend {
            t.by_category.insert((*name).into(), dec(amount));
            t.expenses += dec(amount);
            t.entries += 1;
        }
        t
    }

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    #[test]
    fn history_is_three_months_before_reference() {
        assert_eq!(
            history_months(ym("2025-02")),
            vec![ym("2024-11"), ym("2024-12"), ym("2025-01")]
        );
    }

    #[test]
    fn averages_income_across_history() {
        let mut m = BTreeMap::new();
        m.insert(ym("2025-01"), month("1000", &[("Mercado", "300")]));
        m.insert(ym("2025-02"), month("1200", &[("Mercado", "600"), ("Lazer", "90")]));
        m.insert(ym("2025-03"), month("800", &[("Mercado", "300")]));
        // Outside the history.
        m.insert(ym("2025-04"), month("99999", &[]));

        let s = suggest(ym("2025-04"), &m);
        assert_eq!(s.suggested_income, dec("1000.00"));
        assert_eq!(s.income_confidence, Confidence::High);

        let names: Vec<&str> = s
            .category_suggestions
            .iter()
            .map(|c| c.category_name.as_str())
            .collect();
        assert_eq!(names, vec!["Mercado", "Lazer"]);
        assert_eq!(s.category_suggestions[0].suggested_amount, dec("400.00"));
        assert_eq!(s.category_suggestions[0].confidence, Confidence::High);
        assert_eq!(s.category_suggestions[1].suggested_amount, dec("30.00"));
        assert_eq!(s.category_suggestions[1].confidence, Confidence::Medium);
        assert_eq!(s.total_suggested_expenses, dec("430.00"));
    }

    #[test]
    fn empty_history_is_low_confidence_zero() {
        let s = suggest(ym("2025-04"), &BTreeMap::new());
        assert_eq!(s.suggested_income, Decimal::ZERO);
        assert_eq!(s.income_confidence, Confidence::Low);
        assert!(s.category_suggestions.is_empty());
        assert_eq!(s.total_suggested_expenses, Decimal::ZERO);
    }

    #[test]
    fn only_qualifying_months_divide() {
        let mut m = BTreeMap::new();
        m.insert(ym("2025-03"), month("900", &[("Casa", "150")]));
        let s = suggest(ym("2025-04"), &m);
        assert_eq!(s.suggested_income, dec("900.00"));
        assert_eq!(s.income_confidence, Confidence::Medium);
        assert_eq!(s.category_suggestions[0].suggested_amount, dec("150.00"));
        assert_eq!(s.category_suggestions[0].confidence, Confidence::Medium);
    }
}
