// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use famfin::auth::{self, Session};
use famfin::commands::{budgets, cards, config, doctor, exporter, goals, reports, transactions};
use famfin::{cli, db, utils};
use rusqlite::{Connection, params};
use serde_json::json;
use tempfile::tempdir;

fn setup() -> (Connection, Session) {
    let conn = db::open_in_memory().unwrap();
    auth::register(&conn, "ana@example.com", "secret1", None).unwrap();
    let token = auth::login(&conn, "ana@example.com", "secret1").unwrap();
    let session = auth::resolve(&conn, &token).unwrap();
    (conn, session)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()
}

/// Runs `args` through the parser and returns the matches of the leaf's parent command.
fn sub_matches(args: &[&str]) -> clap::ArgMatches {
    let mut full = vec!["famfin"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(full);
    match matches.subcommand() {
        Some((_, m)) => m.clone(),
        None => panic!("no subcommand in {:?}", args),
    }
}

#[test]
fn tx_add_then_list_with_limit() {
    let (conn, s) = setup();
    for day in 1..=3 {
        let d = format!("2025-01-0{}", day);
        let m = sub_matches(&[
            "tx", "add", "--date", &d, "--description", "Padaria", "--category", "Mercado",
            "--amount", "10.50", "--type", "despesa",
        ]);
        transactions::handle(&conn, &s, &m).unwrap();
    }
    let m = sub_matches(&["tx", "list", "--limit", "2"]);
    if let Some(("list", list_m)) = m.subcommand() {
        let rows = transactions::query_rows(&conn, &s, list_m).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date.to_string(), "2025-01-03");
        assert_eq!(rows[0].payment_method, "cash");
    } else {
        panic!("no list subcommand");
    }
}

#[test]
fn tx_edit_keeps_unspecified_fields() {
    let (conn, s) = setup();
    let m = sub_matches(&[
        "tx", "add", "--date", "2025-02-01", "--description", "Salário", "--category",
        "Salário", "--amount", "5000", "--type", "income",
    ]);
    transactions::handle(&conn, &s, &m).unwrap();
    let m = sub_matches(&["tx", "edit", "--id", "1", "--amount", "5200"]);
    transactions::handle(&conn, &s, &m).unwrap();

    let t = famfin::ledger::transactions::get(&conn, &s, 1).unwrap();
    assert_eq!(t.amount.to_string(), "5200");
    assert_eq!(t.description, "Salário");
    assert_eq!(t.kind, famfin::models::TxKind::Income);
}

#[test]
fn card_list_counts_days_to_closing_and_due() {
    let (mut conn, s) = setup();
    let m = sub_matches(&[
        "card", "add", "--name", "Visa", "--closing-day", "25", "--due-day", "5",
    ]);
    cards::handle(&mut conn, &s, today(), &m).unwrap();

    let rows = cards::card_rows(&conn, &s, today()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].days_to_closing, 5);
    // March 20 to April 5.
    assert_eq!(rows[0].days_to_due, 16);
}

#[test]
fn card_purchase_rejects_bad_installment_count() {
    let (mut conn, s) = setup();
    let m = sub_matches(&[
        "card", "add", "--name", "Visa", "--closing-day", "10", "--due-day", "17",
    ]);
    cards::handle(&mut conn, &s, today(), &m).unwrap();
    let m = sub_matches(&[
        "card", "purchase", "--card", "1", "--description", "Sofa", "--amount", "900",
        "--installments", "40", "--date", "2025-03-01",
    ]);
    let err = cards::handle(&mut conn, &s, today(), &m).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<famfin::FinanceError>(),
        Some(famfin::FinanceError::InvalidInstallmentCount(40))
    ));
}

#[test]
fn goal_update_with_stale_version_fails() {
    let (mut conn, s) = setup();
    let add = sub_matches(&["goal", "add", "--name", "Trip", "--target", "3000"]);
    goals::handle(&mut conn, &s, &add).unwrap();
    goals::handle(
        &mut conn,
        &s,
        &sub_matches(&["goal", "update", "--id", "1", "--saved", "100", "--version", "0"]),
    )
    .unwrap();
    let stale = goals::handle(
        &mut conn,
        &s,
        &sub_matches(&["goal", "update", "--id", "1", "--saved", "200", "--version", "0"]),
    );
    assert!(matches!(
        stale.unwrap_err().downcast_ref::<famfin::FinanceError>(),
        Some(famfin::FinanceError::Conflict(_))
    ));
}

#[test]
fn budget_show_requires_an_existing_budget() {
    let (conn, s) = setup();
    let m = sub_matches(&["budget", "show", "--month", "2025-03"]);
    assert!(budgets::handle(&conn, &s, today(), &m).is_err());

    let m = sub_matches(&[
        "budget", "set", "--month", "2025-03", "--income", "5000", "--expenses", "3000",
    ]);
    budgets::handle(&conn, &s, today(), &m).unwrap();
    let m = sub_matches(&[
        "budget", "category", "add", "--month", "2025-03", "--name", "Mercado", "--amount", "800",
        "--priority", "alta",
    ]);
    budgets::handle(&conn, &s, today(), &m).unwrap();

    let e = budgets::evaluated(&conn, &s, "2025-03".parse().unwrap()).unwrap();
    assert_eq!(e.categories.len(), 1);
    assert_eq!(e.categories[0].priority_label, "alta");
    assert_eq!(e.categories[0].category.color, "#3B82F6");
}

#[test]
fn budget_category_add_by_budget_id() {
    let (conn, s) = setup();
    let m = sub_matches(&[
        "budget", "set", "--month", "2025-04", "--income", "5000", "--expenses", "3000",
    ]);
    budgets::handle(&conn, &s, today(), &m).unwrap();
    let id = famfin::ledger::budgets::for_month(&conn, &s, "2025-04".parse().unwrap())
        .unwrap()
        .unwrap()
        .id;
    let id = id.to_string();
    let m = sub_matches(&[
        "budget", "category", "add", "--budget", &id, "--name", "Lazer", "--amount", "200",
    ]);
    budgets::handle(&conn, &s, today(), &m).unwrap();

    let e = budgets::evaluated(&conn, &s, "2025-04".parse().unwrap()).unwrap();
    assert_eq!(e.categories[0].category.category_name, "Lazer");
    assert_eq!(e.categories[0].priority_label, "media");

    let m = sub_matches(&[
        "budget", "category", "add", "--budget", "999", "--name", "Casa", "--amount", "1",
    ]);
    let err = budgets::handle(&conn, &s, today(), &m).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<famfin::FinanceError>(),
        Some(famfin::FinanceError::NotFound { .. })
    ));
}

#[test]
fn dashboard_window_defaults_to_current_month() {
    let m = sub_matches(&["dashboard"]);
    let w = reports::window(&m, today()).unwrap();
    assert_eq!(w.start.to_string(), "2025-03-01");
    assert_eq!(w.end.to_string(), "2025-03-31");

    let m = sub_matches(&["dashboard", "--from", "2025-03-25", "--to", "2025-03-01"]);
    assert!(reports::window(&m, today()).is_err());
}

#[test]
fn export_transactions_writes_pretty_json() {
    let (conn, s) = setup();
    let m = sub_matches(&[
        "tx", "add", "--date", "2025-01-02", "--description", "Feira", "--category", "Mercado",
        "--amount", "12.34", "--type", "expense", "--payment-method", "pix",
    ]);
    transactions::handle(&conn, &s, &m).unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();
    let m = sub_matches(&["export", "transactions", "--format", "json", "--out", &out_str]);
    exporter::handle(&conn, &s, &m).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "id": 1,
                "date": "2025-01-02",
                "description": "Feira",
                "category": "Mercado",
                "type": "expense",
                "amount": "12.34",
                "payment_method": "pix",
                "installment": null
            }
        ])
    );
}

#[test]
fn export_transactions_writes_csv_header() {
    let (conn, s) = setup();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let out_str = out_path.to_string_lossy().to_string();
    let m = sub_matches(&["export", "transactions", "--out", &out_str]);
    exporter::handle(&conn, &s, &m).unwrap();
    let contents = std::fs::read_to_string(&out_path).unwrap();
    assert!(contents.starts_with("id,date,description,category,type,amount,payment_method"));
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let (conn, s) = setup();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.xml");
    let out_str = out_path.to_string_lossy().to_string();
    let m = sub_matches(&["export", "transactions", "--format", "xml", "--out", &out_str]);
    assert!(exporter::handle(&conn, &s, &m).is_err());
    assert!(!out_path.exists());
}

#[test]
fn doctor_reports_corrupted_rows() {
    let (conn, s) = setup();
    assert!(doctor::issues(&conn, &s).unwrap().is_empty());

    conn.execute(
        "INSERT INTO transactions
             (family_id, date, description, category, amount, kind, payment_method)
         VALUES (?1, '2025-01-01', 'x', 'y', 'abc', 'expense', 'pix')",
        params![&s.family_id],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO debts(family_id, description, total_amount, paid_amount, monthly_payment)
         VALUES (?1, 'Car', '100', '150', '10')",
        params![&s.family_id],
    )
    .unwrap();
    let kinds: Vec<&str> = doctor::issues(&conn, &s)
        .unwrap()
        .into_iter()
        .map(|i| i.kind)
        .collect();
    assert_eq!(kinds, vec!["bad_amount", "debt_overpaid"]);

    // Corrupt rows surface as integrity errors, not defaults.
    assert!(matches!(
        famfin::ledger::debts::list(&conn, &s),
        Err(famfin::FinanceError::Integrity(_))
    ));
}

#[test]
fn config_currency_round_trips() {
    let (conn, _) = setup();
    assert_eq!(utils::currency_symbol(&conn).unwrap(), "R$");
    let set = sub_matches(&["config", "set", "--key", "currency", "--value", "US$"]);
    config::handle(&conn, &set).unwrap();
    assert_eq!(utils::currency_symbol(&conn).unwrap(), "US$");
    let unknown = sub_matches(&["config", "set", "--key", "theme", "--value", "x"]);
    assert!(config::handle(&conn, &unknown).is_err());
}
