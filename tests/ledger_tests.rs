// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use famfin::auth::{self, Session};
use famfin::db;
use famfin::ledger::{cards, debts, goals, transactions};
use famfin::models::{NewPurchase, NewTransaction, TxKind, YearMonth};
use famfin::FinanceError;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn session(conn: &Connection, email: &str) -> Session {
    auth::register(conn, email, "secret1", None).unwrap();
    let token = auth::login(conn, email, "secret1").unwrap();
    auth::resolve(conn, &token).unwrap()
}

fn purchase(description: &str, total: &str, count: u32, on: &str) -> NewPurchase {
    NewPurchase {
        description: description.into(),
        category: String::new(),
        total_amount: dec(total),
        installment_count: count,
        purchase_date: date(on),
    }
}

fn expense(on: &str, category: &str, amount: &str) -> NewTransaction {
    NewTransaction {
        date: date(on),
        description: format!("{} purchase", category),
        category: category.into(),
        amount: dec(amount),
        kind: TxKind::Expense,
        payment_method: "pix".into(),
        installment: None,
    }
}

#[test]
fn purchase_after_closing_slides_a_month_and_sums_exactly() {
    let mut conn = db::open_in_memory().unwrap();
    let s = session(&conn, "ana@example.com");
    let card = cards::add_card(&conn, &s, "Nubank", 10, 17).unwrap();

    let (p, schedule) =
        cards::add_purchase(&mut conn, &s, card.id, purchase("TV", "100.00", 3, "2025-01-15"))
            .unwrap();
    assert_eq!(p.category, cards::DEFAULT_PURCHASE_CATEGORY);
    let amounts: Vec<Decimal> = schedule.iter().map(|i| i.amount).collect();
    assert_eq!(amounts, vec![dec("33.33"), dec("33.33"), dec("33.34")]);
    assert_eq!(amounts.iter().copied().sum::<Decimal>(), dec("100.00"));
    let months: Vec<String> = schedule.iter().map(|i| i.due_month.to_string()).collect();
    assert_eq!(months, vec!["2025-03", "2025-04", "2025-05"]);
    assert_eq!(schedule[0].due_date, date("2025-03-17"));

    let stored = cards::scheduled(&conn, &s, Some(card.id), None).unwrap();
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|i| i.paid_by.is_none()));
}

#[test]
fn purchase_before_closing_bills_next_month() {
    let mut conn = db::open_in_memory().unwrap();
    let s = session(&conn, "ana@example.com");
    let card = cards::add_card(&conn, &s, "Visa", 10, 31).unwrap();
    let (_, schedule) =
        cards::add_purchase(&mut conn, &s, card.id, purchase("Shoes", "250", 1, "2025-01-05"))
            .unwrap();
    assert_eq!(schedule[0].due_month, YearMonth::new(2025, 2).unwrap());
    // February has no 31st.
    assert_eq!(schedule[0].due_date, date("2025-02-28"));
}

#[test]
fn invalid_installment_count_persists_nothing() {
    let mut conn = db::open_in_memory().unwrap();
    let s = session(&conn, "ana@example.com");
    let card = cards::add_card(&conn, &s, "Visa", 10, 17).unwrap();
    for count in [0, 37] {
        let sofa = purchase("Sofa", "900", count, "2025-01-05");
        let err = cards::add_purchase(&mut conn, &s, card.id, sofa).unwrap_err();
        assert!(matches!(err, FinanceError::InvalidInstallmentCount(c) if c == count));
    }
    assert!(cards::list_purchases(&conn, &s).unwrap().is_empty());
    assert!(cards::scheduled(&conn, &s, None, None).unwrap().is_empty());
}

#[test]
fn deleting_a_card_drops_its_installments() {
    let mut conn = db::open_in_memory().unwrap();
    let s = session(&conn, "ana@example.com");
    let card = cards::add_card(&conn, &s, "Visa", 10, 17).unwrap();
    cards::add_purchase(&mut conn, &s, card.id, purchase("Sofa", "900", 3, "2025-01-05")).unwrap();
    cards::delete_card(&conn, &s, card.id).unwrap();
    assert!(cards::list_purchases(&conn, &s).unwrap().is_empty());
    assert!(cards::scheduled(&conn, &s, None, None).unwrap().is_empty());
}

#[test]
fn paying_an_installment_links_it_once() {
    let mut conn = db::open_in_memory().unwrap();
    let s = session(&conn, "ana@example.com");
    let card = cards::add_card(&conn, &s, "Visa", 10, 17).unwrap();
    let sofa = purchase("Sofa", "900", 3, "2025-01-05");
    let (p, _) = cards::add_purchase(&mut conn, &s, card.id, sofa).unwrap();

    let t = cards::pay_installment(&mut conn, &s, p.id, 1, date("2025-02-17")).unwrap();
    assert_eq!(t.amount, dec("300"));
    assert_eq!(t.kind, TxKind::Expense);
    assert_eq!(t.description, "Sofa (1/3)");
    assert_eq!(t.payment_method, cards::CARD_PAYMENT_METHOD);

    let again = cards::pay_installment(&mut conn, &s, p.id, 1, date("2025-02-18"));
    assert!(matches!(again, Err(FinanceError::Conflict(_))));
    assert!(matches!(
        cards::pay_installment(&mut conn, &s, p.id, 4, date("2025-02-18")),
        Err(FinanceError::NotFound { .. })
    ));

    let paid: Vec<Option<i64>> = cards::scheduled(&conn, &s, None, None)
        .unwrap()
        .into_iter()
        .map(|i| i.paid_by)
        .collect();
    assert_eq!(paid, vec![Some(t.id), None, None]);

    // Removing the settling transaction reopens the installment.
    transactions::delete(&conn, &s, t.id).unwrap();
    assert!(cards::scheduled(&conn, &s, None, None)
        .unwrap()
        .iter()
        .all(|i| i.paid_by.is_none()));
}

#[test]
fn families_cannot_see_each_other() {
    let conn = db::open_in_memory().unwrap();
    let a = session(&conn, "a@example.com");
    let b = session(&conn, "b@example.com");
    assert_ne!(a.family_id, b.family_id);

    let t = transactions::add(&conn, &a, expense("2025-03-05", "Mercado", "42.10")).unwrap();
    assert!(matches!(
        transactions::get(&conn, &b, t.id),
        Err(FinanceError::NotFound { .. })
    ));
    assert!(matches!(
        transactions::delete(&conn, &b, t.id),
        Err(FinanceError::NotFound { .. })
    ));
    let filter = transactions::TransactionFilter::default();
    assert!(transactions::list(&conn, &b, &filter).unwrap().is_empty());
    assert_eq!(transactions::list(&conn, &a, &filter).unwrap().len(), 1);
}

#[test]
fn members_of_one_family_share_the_ledger() {
    let conn = db::open_in_memory().unwrap();
    let a = session(&conn, "a@example.com");
    auth::register(&conn, "b@example.com", "secret2", Some(&a.family_id)).unwrap();
    let token = auth::login(&conn, "b@example.com", "secret2").unwrap();
    let b = auth::resolve(&conn, &token).unwrap();

    let t = transactions::add(&conn, &a, expense("2025-03-05", "Mercado", "10")).unwrap();
    assert_eq!(transactions::get(&conn, &b, t.id).unwrap().id, t.id);
    assert_eq!(
        auth::family_members(&conn, &b).unwrap(),
        vec!["a@example.com".to_string(), "b@example.com".to_string()]
    );

    auth::logout(&conn, &token).unwrap();
    assert!(matches!(
        auth::resolve(&conn, &token),
        Err(FinanceError::Unauthorized)
    ));
}

#[test]
fn transaction_validation_rejects_bad_input() {
    let conn = db::open_in_memory().unwrap();
    let s = session(&conn, "ana@example.com");
    let mut bad = expense("2025-03-05", "Mercado", "0");
    assert!(matches!(
        transactions::add(&conn, &s, bad.clone()),
        Err(FinanceError::Validation { field: "amount", .. })
    ));
    bad.amount = dec("10");
    bad.description = "   ".into();
    assert!(matches!(
        transactions::add(&conn, &s, bad),
        Err(FinanceError::Validation { field: "description", .. })
    ));
}

#[test]
fn editing_a_transaction_rewrites_it() {
    let conn = db::open_in_memory().unwrap();
    let s = session(&conn, "ana@example.com");
    let t = transactions::add(&conn, &s, expense("2025-03-05", "Mercado", "10")).unwrap();
    let edit = expense("2025-03-06", "Farmácia", "12.50");
    let updated = transactions::update(&conn, &s, t.id, edit).unwrap();
    assert_eq!(updated.category, "Farmácia");
    assert_eq!(updated.amount, dec("12.50"));
    assert_eq!(updated.date, date("2025-03-06"));
}

#[test]
fn debt_payments_cannot_exceed_total() {
    let mut conn = db::open_in_memory().unwrap();
    let s = session(&conn, "ana@example.com");
    let d = debts::add(&conn, &s, "Car", dec("1000"), dec("900"), dec("100")).unwrap();
    assert_eq!(d.remaining_amount(), dec("100"));

    let err = debts::pay(&mut conn, &s, d.id, dec("150")).unwrap_err();
    assert!(matches!(err, FinanceError::Validation { field: "paid_amount", .. }));
    let paid = debts::pay(&mut conn, &s, d.id, dec("100")).unwrap();
    assert_eq!(paid.remaining_amount(), Decimal::ZERO);

    assert!(debts::add(&conn, &s, "Loan", dec("100"), dec("101"), dec("10")).is_err());
}

#[test]
fn stale_goal_write_is_a_conflict() {
    let mut conn = db::open_in_memory().unwrap();
    let s = session(&conn, "ana@example.com");
    let g = goals::add(&conn, &s, "Trip", dec("5000"), Decimal::ZERO).unwrap();
    assert_eq!(g.version, 0);

    let first = goals::update_saved(&conn, &s, g.id, dec("1000"), Some(0)).unwrap();
    assert_eq!(first.version, 1);
    let stale = goals::update_saved(&conn, &s, g.id, dec("1500"), Some(0));
    assert!(matches!(stale, Err(FinanceError::Conflict(_))));
    assert_eq!(goals::get(&conn, &s, g.id).unwrap().saved_amount, dec("1000"));

    let after = goals::contribute(&mut conn, &s, g.id, dec("250.50")).unwrap();
    assert_eq!(after.saved_amount, dec("1250.50"));
    assert_eq!(after.version, 2);
    assert_eq!(after.progress_percentage(), dec("25.01"));
}

#[test]
fn goal_progress_caps_at_one_hundred() {
    let conn = db::open_in_memory().unwrap();
    let s = session(&conn, "ana@example.com");
    let g = goals::add(&conn, &s, "Car", dec("5000"), dec("7500")).unwrap();
    assert_eq!(g.progress_percentage(), dec("100"));
}
