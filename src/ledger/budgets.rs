// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::auth::Session;
use crate::error::{FinanceError, Result};
use crate::models::{Budget, BudgetCategory, Priority, YearMonth};
use crate::utils::{check_amount, require_text, same_category, stored_decimal};
use rust_decimal::Decimal;
use rusqlite::{Connection, OptionalExtension, params};

pub const DEFAULT_COLOR: &str = "#3B82F6";

#[derive(Debug, Clone)]
pub struct NewBudgetCategory {
    pub category_name: String,
    pub planned_amount: Decimal,
    pub color: Option<String>,
    pub description: String,
    pub priority: Priority,
}

/// Partial edit; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub category_name: Option<String>,
    pub planned_amount: Option<Decimal>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
}

/// Rejects `name` when another category of the budget already uses it.
fn ensure_unique_name(
    siblings: &[BudgetCategory],
    budget_id: i64,
    name: &str,
    except: Option<i64>,
) -> Result<()> {
    if siblings
        .iter()
        .any(|c| Some(c.id) != except && same_category(&c.category_name, name))
    {
        return Err(FinanceError::Conflict(format!(
            "budget {} already has a '{}' category",
            budget_id, name
        )));
    }
    Ok(())
}

fn check_color(color: &str) -> Result<String> {
    let c = color.trim();
    let hex_ok =
        c.len() == 7 && c.starts_with('#') && c[1..].chars().all(|ch| ch.is_ascii_hexdigit());
    if !hex_ok {
        return Err(FinanceError::validation(
            "color",
            format!("'{}' is not a #RRGGBB color", c),
        ));
    }
    Ok(c.to_uppercase())
}

/// Creates the family's budget for `period` or replaces its planned totals.
pub fn upsert(
    conn: &Connection,
    session: &Session,
    period: YearMonth,
    planned_income: Decimal,
    planned_expenses: Decimal,
) -> Result<Budget> {
    let planned_income = check_amount("planned_income", planned_income, true)?;
    let planned_expenses = check_amount("planned_expenses", planned_expenses, true)?;
    conn.execute(
        "INSERT INTO budgets(family_id, month, year, planned_income, planned_expenses)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(family_id, year, month) DO UPDATE SET
            planned_income=excluded.planned_income,
            planned_expenses=excluded.planned_expenses,
            updated_at=datetime('now')",
        params![
            &session.family_id,
            period.month,
            period.year,
            planned_income.to_string(),
            planned_expenses.to_string()
        ],
    )?;
    tracing::info!(family = %session.family_id, %period, "budget saved");
    for_month(conn, session, period)?
        .ok_or_else(|| FinanceError::not_found("budget", period))
}

pub fn for_month(
    conn: &Connection,
    session: &Session,
    period: YearMonth,
) -> Result<Option<Budget>> {
    let id: Option<i64> = conn
        .query_row(
            "SELECT id FROM budgets WHERE family_id=?1 AND year=?2 AND month=?3",
            params![&session.family_id, period.year, period.month],
            |r| r.get(0),
        )
        .optional()?;
    match id {
        Some(id) => Ok(Some(get(conn, session, id)?)),
        None => Ok(None),
    }
}

pub fn get(conn: &Connection, session: &Session, id: i64) -> Result<Budget> {
    let row: Option<(u32, i32, String, String)> = conn
        .query_row(
            "SELECT month, year, planned_income, planned_expenses FROM budgets
             WHERE id=?1 AND family_id=?2",
            params![id, &session.family_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .optional()?;
    let (month, year, income, expenses) = row.ok_or_else(|| FinanceError::not_found("budget", id))?;
    Ok(Budget {
        id,
        family_id: session.family_id.clone(),
        month,
        year,
        planned_income: stored_decimal("budgets", id, &income)?,
        planned_expenses: stored_decimal("budgets", id, &expenses)?,
        categories: categories(conn, id)?,
    })
}

/// Categories ordered by priority, then name.
fn categories(conn: &Connection, budget_id: i64) -> Result<Vec<BudgetCategory>> {
    let mut stmt = conn.prepare(
        "SELECT id, category_name, planned_amount, color, description, priority, version
         FROM budget_categories WHERE budget_id=?1 ORDER BY priority ASC, category_name ASC",
    )?;
    let mut rows = stmt.query(params![budget_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let planned: String = r.get(2)?;
        out.push(BudgetCategory {
            id,
            budget_id,
            category_name: r.get(1)?,
            planned_amount: stored_decimal("budget_categories", id, &planned)?,
            color: r.get(3)?,
            description: r.get(4)?,
            priority: Priority::from_rank(r.get(5)?)?,
            version: r.get(6)?,
        });
    }
    Ok(out)
}

fn get_category(conn: &Connection, session: &Session, id: i64) -> Result<BudgetCategory> {
    let budget_id: i64 = conn
        .query_row(
            "SELECT bc.budget_id FROM budget_categories bc JOIN budgets b ON bc.budget_id=b.id
             WHERE bc.id=?1 AND b.family_id=?2",
            params![id, &session.family_id],
            |r| r.get(0),
        )
        .optional()?
        .ok_or_else(|| FinanceError::not_found("budget category", id))?;
    categories(conn, budget_id)?
        .into_iter()
        .find(|c| c.id == id)
        .ok_or_else(|| FinanceError::not_found("budget category", id))
}

pub fn add_category(
    conn: &Connection,
    session: &Session,
    budget_id: i64,
    new: NewBudgetCategory,
) -> Result<BudgetCategory> {
    let budget = get(conn, session, budget_id)?;
    let name = require_text("category_name", &new.category_name)?;
    let planned = check_amount("planned_amount", new.planned_amount, true)?;
    let color = check_color(new.color.as_deref().unwrap_or(DEFAULT_COLOR))?;
    ensure_unique_name(&budget.categories, budget_id, &name, None)?;
    conn.execute(
        "INSERT INTO budget_categories
             (budget_id, category_name, planned_amount, color, description, priority)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            budget_id,
            &name,
            planned.to_string(),
            &color,
            new.description.trim(),
            new.priority.rank()
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, budget_id, family = %session.family_id, "budget category added");
    get_category(conn, session, id)
}

pub fn update_category(
    conn: &Connection,
    session: &Session,
    id: i64,
    edit: CategoryUpdate,
    expected_version: Option<i64>,
) -> Result<BudgetCategory> {
    let current = get_category(conn, session, id)?;
    if let Some(v) = expected_version {
        if v != current.version {
            return Err(FinanceError::Conflict(format!(
                "budget category {} is at version {}, not {}",
                id, current.version, v
            )));
        }
    }
    let name = match edit.category_name {
        Some(n) => {
            let n = require_text("category_name", &n)?;
            let siblings = categories(conn, current.budget_id)?;
            ensure_unique_name(&siblings, current.budget_id, &n, Some(id))?;
            n
        }
        None => current.category_name,
    };
    let planned = match edit.planned_amount {
        Some(p) => check_amount("planned_amount", p, true)?,
        None => current.planned_amount,
    };
    let color = match edit.color {
        Some(c) => check_color(&c)?,
        None => current.color,
    };
    let description = edit
        .description
        .map(|d| d.trim().to_string())
        .unwrap_or(current.description);
    let priority = edit.priority.unwrap_or(current.priority);

    let n = conn.execute(
        "UPDATE budget_categories
         SET category_name=?1, planned_amount=?2, color=?3, description=?4, priority=?5,
             version=version+1
         WHERE id=?6 AND version=?7",
        params![
            &name,
            planned.to_string(),
            &color,
            &description,
            priority.rank(),
            id,
            current.version
        ],
    )?;
    if n == 0 {
        return Err(FinanceError::Conflict(format!(
            "budget category {} changed while being edited",
            id
        )));
    }
    tracing::info!(id, family = %session.family_id, "budget category updated");
    get_category(conn, session, id)
}

pub fn delete_category(conn: &Connection, session: &Session, id: i64) -> Result<()> {
    get_category(conn, session, id)?;
    conn.execute("DELETE FROM budget_categories WHERE id=?1", params![id])?;
    tracing::info!(id, family = %session.family_id, "budget category deleted");
    Ok(())
}
