// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::optional;
use crate::aggregate::{self, Summary, Window};
use crate::auth::Session;
use crate::utils::{currency_symbol, fmt_money, maybe_print_json, parse_date, pretty_table};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

/// Window from `--from/--to`; either bound defaults to the current month's.
pub fn window(sub: &clap::ArgMatches, today: NaiveDate) -> Result<Window> {
    let current = Window::current(today);
    let start = optional(sub, "from").map(parse_date).transpose()?.unwrap_or(current.start);
    let end = optional(sub, "to").map(parse_date).transpose()?.unwrap_or(current.end);
    Ok(Window::new(start, end)?)
}

pub fn dashboard(
    conn: &Connection,
    session: &Session,
    today: NaiveDate,
    sub: &clap::ArgMatches,
) -> Result<Summary> {
    let summary = aggregate::summarize(conn, session, window(sub, today)?)?;
    if maybe_print_json(sub.get_flag("json"), &summary)? {
        return Ok(summary);
    }
    let symbol = currency_symbol(conn)?;
    println!(
        "{} to {}: income {}  expenses {}  balance {}",
        summary.window.start,
        summary.window.end,
        fmt_money(&summary.total_income, &symbol),
        fmt_money(&summary.total_expenses, &symbol),
        fmt_money(&summary.balance, &symbol)
    );
    let rows = summary
        .expenses_by_category
        .iter()
        .map(|c| vec![c.category.clone(), fmt_money(&c.amount, &symbol)])
        .collect();
    println!("{}", pretty_table(&["Category", "Spent"], rows));
    let rows = summary
        .monthly_evolution
        .iter()
        .map(|b| {
            vec![
                b.month_label.clone(),
                fmt_money(&b.income, &symbol),
                fmt_money(&b.expenses, &symbol),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Month", "Income", "Expenses"], rows));
    Ok(summary)
}
