// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Splits a card purchase into monthly installments.

use crate::error::{FinanceError, Result};
use crate::models::{CreditCard, Installment, Purchase, YearMonth};
use chrono::Datelike;
use rust_decimal::{Decimal, RoundingStrategy};

pub const MAX_INSTALLMENTS: u32 = 36;

pub fn check_count(count: u32) -> Result<u32> {
    if !(1..=MAX_INSTALLMENTS).contains(&count) {
        return Err(FinanceError::InvalidInstallmentCount(count));
    }
    Ok(count)
}

/// Month the first installment is billed in.
///
/// Purchases made on or after the closing day miss the current cycle and slide one month.
pub fn first_due_month(purchase: &Purchase, card: &CreditCard) -> YearMonth {
    let shift = if purchase.purchase_date.day() >= card.closing_day {
        2
    } else {
        1
    };
    YearMonth::of(purchase.purchase_date).add_months(shift)
}

/// Amounts for `count` installments of `total`; the last one absorbs the rounding remainder.
pub fn split_amount(total: Decimal, count: u32) -> Result<Vec<Decimal>> {
    let count = check_count(count)?;
    let n = Decimal::from(count);
    let base = (total / n).round_dp_with_strategy(2, RoundingStrategy::ToNegativeInfinity);
    let last = total - base * Decimal::from(count - 1);
    let mut out = vec![base; (count - 1) as usize];
    out.push(last);
    Ok(out)
}

pub fn expand(purchase: &Purchase, card: &CreditCard) -> Result<Vec<Installment>> {
    let amounts = split_amount(purchase.total_amount, purchase.installment_count)?;
    let first = first_due_month(purchase, card);
    let out = amounts
        .into_iter()
        .enumerate()
        .map(|(i, amount)| {
            let due_month = first.add_months(i as i32);
            Installment {
                purchase_id: purchase.id,
                index: i as u32 + 1,
                amount,
                due_month,
                due_date: due_month.clamped_day(card.due_day),
            }
        })
        .collect();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn card(closing_day: u32, due_day: u32) -> CreditCard {
        CreditCard {
            id: 1,
            family_id: "fam".into(),
            name: "Nubank".into(),
            closing_day,
            due_day,
        }
    }

    fn purchase(total: &str, count: u32, date: NaiveDate) -> Purchase {
        Purchase {
            id: 7,
            card_id: 1,
            description: "TV".into(),
            category: "Casa".into(),
            total_amount: Decimal::from_str(total).unwrap(),
            installment_count: count,
            purchase_date: date,
        }
    }

    #[test]
    fn hundred_over_three() {
        let p = purchase("100.00", 3, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
        let amounts: Vec<String> = expand(&p, &card(10, 20))
            .unwrap()
            .iter()
            .map(|i| i.amount.to_string())
            .collect();
        assert_eq!(amounts, vec!["33.33", "33.33", "33.34"]);
    }

    #[test]
    fn sums_reconcile_for_every_count() {
        for total in ["0.01", "1.00", "99.99", "1234.57", "100000.00"] {
            let total_d = Decimal::from_str(total).unwrap();
            for count in 1..=MAX_INSTALLMENTS {
                let parts = split_amount(total_d, count).unwrap();
                assert_eq!(parts.len(), count as usize);
                let sum: Decimal = parts.iter().copied().sum();
                assert_eq!(sum, total_d, "{} / {}", total, count);
                assert!(parts.iter().all(|p| p.scale() <= 2));
            }
        }
    }

    #[test]
    fn rejects_out_of_range_counts() {
        assert!(matches!(
            split_amount(Decimal::ONE, 0),
            Err(FinanceError::InvalidInstallmentCount(0))
        ));
        assert!(matches!(
            split_amount(Decimal::ONE, 37),
            Err(FinanceError::InvalidInstallmentCount(37))
        ));
    }

    #[test]
    fn closing_day_shifts_first_due_month() {
        let c = card(10, 20);
        let before = purchase("300.00", 3, NaiveDate::from_ymd_opt(2025, 11, 9).unwrap());
        let on = purchase("300.00", 3, NaiveDate::from_ymd_opt(2025, 11, 10).unwrap());

        let months: Vec<String> = expand(&before, &c)
            .unwrap()
            .iter()
            .map(|i| i.due_month.to_string())
            .collect();
        assert_eq!(months, vec!["2025-12", "2026-01", "2026-02"]);

        let months: Vec<String> = expand(&on, &c)
            .unwrap()
            .iter()
            .map(|i| i.due_month.to_string())
            .collect();
        assert_eq!(months, vec!["2026-01", "2026-02", "2026-03"]);
    }

    #[test]
    fn due_date_clamps_to_short_month() {
        let p = purchase("50.00", 2, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        let inst = expand(&p, &card(25, 31)).unwrap();
        assert_eq!(inst[0].due_date, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        assert_eq!(inst[1].due_date, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
        assert_eq!(inst[1].index, 2);
    }
}
