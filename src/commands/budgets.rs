// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{optional, optional_number, required, required_id};
use crate::auth::Session;
use crate::evaluate::{self, EvaluatedBudget};
use crate::ledger::budgets::{self, CategoryUpdate, NewBudgetCategory};
use crate::models::{Budget, Priority, YearMonth};
use crate::suggest;
use crate::utils::{
    currency_symbol, fmt_money, maybe_print_json, parse_decimal, parse_month, pretty_table,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;

pub fn handle(
    conn: &Connection,
    session: &Session,
    today: NaiveDate,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, session, sub)?,
        Some(("show", sub)) => show(conn, session, today, sub)?,
        Some(("category", sub)) => category(conn, session, sub)?,
        Some(("analytics", sub)) => analytics(conn, session, today, sub)?,
        Some(("suggest", sub)) => suggestions(conn, session, today, sub)?,
        _ => {}
    }
    Ok(())
}

fn month_or_current(sub: &clap::ArgMatches, today: NaiveDate) -> Result<YearMonth> {
    Ok(match optional(sub, "month") {
        Some(m) => parse_month(m)?,
        None => YearMonth::of(today),
    })
}

fn budget_for(conn: &Connection, session: &Session, period: YearMonth) -> Result<Budget> {
    budgets::for_month(conn, session, period)?
        .with_context(|| format!("No budget for {}; create it with `famfin budget set`", period))
}

fn set(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let period = parse_month(required(sub, "month")?)?;
    let income = parse_decimal("planned_income", required(sub, "income")?)?;
    let expenses = parse_decimal("planned_expenses", required(sub, "expenses")?)?;
    let b = budgets::upsert(conn, session, period, income, expenses)?;
    println!("Budget {} saved for {} (id {})", period, session.family_id, b.id);
    Ok(())
}

/// Plan against actuals for one month.
pub fn evaluated(
    conn: &Connection,
    session: &Session,
    period: YearMonth,
) -> Result<EvaluatedBudget> {
    let budget = budget_for(conn, session, period)?;
    Ok(evaluate::evaluate_stored(conn, session, &budget)?)
}

fn show(
    conn: &Connection,
    session: &Session,
    today: NaiveDate,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let period = month_or_current(sub, today)?;
    let e = evaluated(conn, session, period)?;
    if maybe_print_json(sub.get_flag("json"), &e)? {
        return Ok(());
    }
    let symbol = currency_symbol(conn)?;
    println!(
        "{}  income {} / {} ({}%)  expenses {} / {} ({}%)  health: {}",
        period,
        fmt_money(&e.actual_income, &symbol),
        fmt_money(&e.planned_income, &symbol),
        e.income_percentage,
        fmt_money(&e.actual_expenses, &symbol),
        fmt_money(&e.planned_expenses, &symbol),
        e.expenses_percentage,
        e.budget_health.as_str()
    );
    let rows = e
        .categories
        .iter()
        .map(|c| {
            vec![
                c.category.id.to_string(),
                c.category.category_name.clone(),
                c.priority_label.to_string(),
                fmt_money(&c.category.planned_amount, &symbol),
                fmt_money(&c.actual_spent, &symbol),
                fmt_money(&c.remaining_amount, &symbol),
                format!("{}%", c.percentage_used),
                c.status.as_str().to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Category", "Priority", "Planned", "Spent", "Remaining", "Used", "Status"],
            rows
        )
    );
    Ok(())
}

fn category(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let budget = match optional_number::<i64>(sub, "budget")? {
                Some(id) => budgets::get(conn, session, id)?,
                None => budget_for(conn, session, parse_month(required(sub, "month")?)?)?,
            };
            let planned = parse_decimal("planned_amount", required(sub, "amount")?)?;
            let c = budgets::add_category(
                conn,
                session,
                budget.id,
                NewBudgetCategory {
                    category_name: required(sub, "name")?.to_string(),
                    planned_amount: planned,
                    color: optional(sub, "color").map(str::to_string),
                    description: optional(sub, "description").unwrap_or_default().to_string(),
                    priority: required(sub, "priority")?.parse()?,
                },
            )?;
            println!("Added category '{}' (id {})", c.category_name, c.id);
        }
        Some(("update", sub)) => {
            let edit = CategoryUpdate {
                category_name: optional(sub, "name").map(str::to_string),
                planned_amount: optional(sub, "amount")
                    .map(|a| parse_decimal("planned_amount", a))
                    .transpose()?,
                color: optional(sub, "color").map(str::to_string),
                description: optional(sub, "description").map(str::to_string),
                priority: optional(sub, "priority").map(str::parse::<Priority>).transpose()?,
            };
            let c = budgets::update_category(
                conn,
                session,
                required_id(sub, "id")?,
                edit,
                optional_number(sub, "version")?,
            )?;
            println!("Updated category '{}' (version {})", c.category_name, c.version);
        }
        Some(("rm", sub)) => {
            let id = required_id(sub, "id")?;
            budgets::delete_category(conn, session, id)?;
            println!("Deleted budget category {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn analytics(
    conn: &Connection,
    session: &Session,
    today: NaiveDate,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let budget = budget_for(conn, session, month_or_current(sub, today)?)?;
    let a = evaluate::analyze_stored(conn, session, &budget, today)?;
    if maybe_print_json(sub.get_flag("json"), &a)? {
        return Ok(());
    }
    let symbol = currency_symbol(conn)?;
    println!(
        "Projected month expense: {} ({}% of plan), health: {}",
        fmt_money(&a.projected_month_expense, &symbol),
        a.projection_vs_budget,
        a.budget_overview.budget_health.as_str()
    );
    let rows = a
        .categories
        .iter()
        .map(|c| {
            vec![
                c.evaluated.category.category_name.clone(),
                fmt_money(&c.previous_spent, &symbol),
                fmt_money(&c.evaluated.actual_spent, &symbol),
                format!("{}%", c.trend),
                format!("{:?}", c.trend_direction).to_lowercase(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Last month", "This month", "Trend", "Direction"], rows)
    );
    for i in &a.insights {
        println!("[{:?}] {}: {} {}", i.kind, i.title, i.message, i.categories.join(", "));
    }
    Ok(())
}

fn suggestions(
    conn: &Connection,
    session: &Session,
    today: NaiveDate,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let reference = month_or_current(sub, today)?;
    let s = suggest::suggest_for(conn, session, reference)?;
    if maybe_print_json(sub.get_flag("json"), &s)? {
        return Ok(());
    }
    let symbol = currency_symbol(conn)?;
    println!(
        "Suggested income for {}: {} ({:?} confidence)",
        reference,
        fmt_money(&s.suggested_income, &symbol),
        s.income_confidence
    );
    let rows = s
        .category_suggestions
        .iter()
        .map(|c| {
            vec![
                c.category_name.clone(),
                fmt_money(&c.suggested_amount, &symbol),
                format!("{:?}", c.confidence).to_lowercase(),
                c.reason.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Suggested", "Confidence", "Reason"], rows)
    );
    println!(
        "Total suggested expenses: {}",
        fmt_money(&s.total_suggested_expenses, &symbol)
    );
    Ok(())
}
