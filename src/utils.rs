// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{FinanceError, Result};
use crate::models::YearMonth;
use chrono::{Datelike, NaiveDate};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::{Decimal, RoundingStrategy};

pub const DEFAULT_CURRENCY: &str = "R$";

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        FinanceError::validation("date", format!("'{}' is not YYYY-MM-DD", s.trim()))
    })
}

pub fn parse_month(s: &str) -> Result<YearMonth> {
    s.parse()
}

pub fn parse_decimal(field: &'static str, s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|_| FinanceError::validation(field, format!("'{}' is not a number", s.trim())))
}

/// Currency amount: at most two decimals, never negative, and positive unless `allow_zero`.
pub fn check_amount(field: &'static str, d: Decimal, allow_zero: bool) -> Result<Decimal> {
    if d.is_sign_negative() && !d.is_zero() {
        return Err(FinanceError::validation(field, "must not be negative"));
    }
    if d.is_zero() && !allow_zero {
        return Err(FinanceError::validation(field, "must be greater than zero"));
    }
    if d.normalize().scale() > 2 {
        return Err(FinanceError::validation(
            field,
            format!("{} has more than two decimal places", d),
        ));
    }
    Ok(d.round_dp(2))
}

pub fn parse_amount(field: &'static str, s: &str) -> Result<Decimal> {
    check_amount(field, parse_decimal(field, s)?, false)
}

pub fn require_text(field: &'static str, s: &str) -> Result<String> {
    let t = s.trim();
    if t.is_empty() {
        return Err(FinanceError::validation(field, "must not be empty"));
    }
    Ok(t.to_string())
}

pub fn check_day_of_month(field: &'static str, day: u32) -> Result<u32> {
    if !(1..=31).contains(&day) {
        return Err(FinanceError::validation(
            field,
            format!("{} is not a day between 1 and 31", day),
        ));
    }
    Ok(day)
}

pub fn round_money(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `part / whole * 100` at full precision; zero when `whole` is zero.
pub fn ratio_percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part / whole * Decimal::ONE_HUNDRED
}

/// [`ratio_percent`] rounded to two decimals for display.
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    round_money(ratio_percent(part, whole))
}

/// Category names match ignoring case and surrounding blanks.
pub fn same_category(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Reads a money column stored as TEXT; unparseable values are integrity faults.
pub fn stored_decimal(table: &str, id: i64, raw: &str) -> Result<Decimal> {
    raw.parse::<Decimal>().map_err(|_| {
        FinanceError::integrity(format!("{} row {} holds invalid amount '{}'", table, id, raw))
    })
}

pub fn stored_date(table: &str, id: i64, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        FinanceError::integrity(format!("{} row {} holds invalid date '{}'", table, id, raw))
    })
}

pub fn fmt_money(d: &Decimal, symbol: &str) -> String {
    format!("{} {:.2}", symbol, round_money(*d))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> anyhow::Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn currency_symbol(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, "currency")?.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
}

/// Days from `today` until the next occurrence of `target_day`, today included.
///
/// A target past the end of a short month lands on that month's last day.
pub fn days_until(target_day: u32, today: NaiveDate) -> i64 {
    let this_month = YearMonth::of(today);
    let target = if target_day >= today.day() {
        this_month.clamped_day(target_day)
    } else {
        this_month.add_months(1).clamped_day(target_day)
    };
    (target - today).num_days().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn days_until_same_month() {
        assert_eq!(days_until(20, d(2025, 3, 10)), 10);
        assert_eq!(days_until(10, d(2025, 3, 10)), 0);
    }

    #[test]
    fn days_until_rolls_to_next_month() {
        assert_eq!(days_until(5, d(2025, 3, 10)), 26);
        assert_eq!(days_until(1, d(2025, 12, 31)), 1);
    }

    #[test]
    fn days_until_clamps_short_months() {
        // April has 30 days: the 31st collapses onto the 30th.
        assert_eq!(days_until(31, d(2025, 4, 30)), 0);
        assert_eq!(days_until(31, d(2025, 4, 15)), 15);
        // Rolling from January into a non-leap February.
        assert_eq!(days_until(30, d(2025, 1, 31)), 28);
    }

    #[test]
    fn days_until_is_bounded_and_stable() {
        let mut day = d(2024, 1, 1);
        while day < d(2025, 1, 1) {
            for target in 1..=31 {
                let a = days_until(target, day);
                assert!((0..=31).contains(&a), "{} {} -> {}", target, day, a);
                assert_eq!(a, days_until(target, day));
            }
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn amount_validation() {
        assert!(parse_amount("amount", "-1").is_err());
        assert!(parse_amount("amount", "0").is_err());
        assert!(parse_amount("amount", "1.234").is_err());
        assert_eq!(
            parse_amount("amount", " 12.50 ").unwrap(),
            Decimal::from_str("12.50").unwrap()
        );
        assert!(check_amount("paid", Decimal::ZERO, true).is_ok());
    }

    #[test]
    fn percentage_of_zero_whole_is_zero() {
        assert_eq!(percentage(Decimal::from(5), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(
            percentage(Decimal::from(950), Decimal::from(1000)),
            Decimal::from(95)
        );
    }

    #[test]
    fn category_names_match_ignoring_case() {
        assert!(same_category("Saúde", " SAÚDE "));
        assert!(!same_category("Casa", "Casas"));
    }
}
