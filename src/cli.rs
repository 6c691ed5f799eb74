// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, ArgGroup, Command};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

fn id_arg() -> Arg {
    req("id", "Record id")
}

fn auth_commands() -> Vec<Command> {
    vec![
        Command::new("register")
            .about("Create a login, in a new family or an existing one")
            .arg(req("email", "Login e-mail"))
            .arg(req("password", "Password (at least 6 characters)"))
            .arg(opt("family", "Join this family id instead of creating one"))
            .arg(json_flag()),
        Command::new("login")
            .about("Exchange credentials for a bearer token")
            .arg(req("email", "Login e-mail"))
            .arg(req("password", "Password")),
        Command::new("logout").about("Revoke the current token"),
        Command::new("family")
            .about("Family membership")
            .subcommand(Command::new("members").arg(json_flag())),
    ]
}

fn tx_command() -> Command {
    Command::new("tx")
        .about("Income and expense transactions")
        .subcommand(
            Command::new("add")
                .arg(req("date", "YYYY-MM-DD"))
                .arg(req("description", "What it was"))
                .arg(req("category", "Category name"))
                .arg(req("amount", "Positive amount"))
                .arg(req("type", "income | expense"))
                .arg(opt("payment-method", "How it was paid").default_value("cash")),
        )
        .subcommand(
            Command::new("list")
                .arg(opt("month", "YYYY-MM"))
                .arg(opt("category", "Only this category"))
                .arg(opt("limit", "Maximum rows"))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("edit")
                .arg(id_arg())
                .arg(opt("date", "YYYY-MM-DD"))
                .arg(opt("description", "What it was"))
                .arg(opt("category", "Category name"))
                .arg(opt("amount", "Positive amount"))
                .arg(opt("type", "income | expense"))
                .arg(opt("payment-method", "How it was paid")),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn card_command() -> Command {
    Command::new("card")
        .about("Credit cards, purchases and installments")
        .subcommand(
            Command::new("add")
                .arg(req("name", "Card name"))
                .arg(req("closing-day", "Statement closing day (1-31)"))
                .arg(req("due-day", "Payment due day (1-31)")),
        )
        .subcommand(Command::new("list").arg(json_flag()))
        .subcommand(Command::new("rm").arg(id_arg()))
        .subcommand(
            Command::new("purchase")
                .about("Record a purchase and split it into installments")
                .arg(req("card", "Card id"))
                .arg(req("description", "What was bought"))
                .arg(opt("category", "Category name"))
                .arg(req("amount", "Total amount"))
                .arg(opt("installments", "Number of installments (1-36)").default_value("1"))
                .arg(req("date", "Purchase date YYYY-MM-DD"))
                .arg(json_flag()),
        )
        .subcommand(Command::new("purchases").arg(json_flag()))
        .subcommand(
            Command::new("installments")
                .arg(opt("card", "Only this card id"))
                .arg(opt("from", "First due month YYYY-MM"))
                .arg(opt("to", "Last due month YYYY-MM"))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("pay")
                .about("Settle one installment with a linked expense")
                .arg(req("purchase", "Purchase id"))
                .arg(req("index", "Installment number"))
                .arg(opt("date", "Payment date YYYY-MM-DD (defaults to today)")),
        )
}

fn invest_command() -> Command {
    Command::new("invest")
        .about("Investment contributions")
        .subcommand(
            Command::new("add")
                .arg(req("date", "YYYY-MM-DD"))
                .arg(req("asset", "Asset name"))
                .arg(req("type", "Asset type"))
                .arg(req("broker", "Broker"))
                .arg(req("amount", "Contribution")),
        )
        .subcommand(Command::new("list").arg(json_flag()))
        .subcommand(Command::new("rm").arg(id_arg()))
        .subcommand(Command::new("summary").arg(json_flag()))
}

fn debt_command() -> Command {
    Command::new("debt")
        .about("Debts and repayments")
        .subcommand(
            Command::new("add")
                .arg(req("description", "What is owed"))
                .arg(req("total", "Total amount"))
                .arg(opt("paid", "Already paid").default_value("0"))
                .arg(req("monthly", "Monthly payment")),
        )
        .subcommand(Command::new("list").arg(json_flag()))
        .subcommand(Command::new("rm").arg(id_arg()))
        .subcommand(
            Command::new("pay")
                .arg(id_arg())
                .arg(req("amount", "Amount paid")),
        )
}

fn goal_command() -> Command {
    Command::new("goal")
        .about("Savings goals")
        .subcommand(
            Command::new("add")
                .arg(req("name", "Goal name"))
                .arg(req("target", "Target amount"))
                .arg(opt("saved", "Already saved").default_value("0")),
        )
        .subcommand(Command::new("list").arg(json_flag()))
        .subcommand(
            Command::new("update")
                .arg(id_arg())
                .arg(req("saved", "New saved amount"))
                .arg(opt("version", "Version last read; rejects stale writes")),
        )
        .subcommand(
            Command::new("contribute")
                .arg(id_arg())
                .arg(req("amount", "Amount to add")),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn budget_command() -> Command {
    Command::new("budget")
        .about("Monthly budgets")
        .subcommand(
            Command::new("set")
                .arg(req("month", "YYYY-MM"))
                .arg(req("income", "Planned income"))
                .arg(req("expenses", "Planned expenses")),
        )
        .subcommand(
            Command::new("show")
                .about("Plan against actuals")
                .arg(opt("month", "YYYY-MM (defaults to the current month)"))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("category")
                .subcommand(
                    Command::new("add")
                        .arg(opt("budget", "Budget id"))
                        .arg(opt("month", "Budget month YYYY-MM"))
                        .group(
                            ArgGroup::new("target")
                                .args(["budget", "month"])
                                .required(true),
                        )
                        .arg(req("name", "Category name"))
                        .arg(req("amount", "Planned amount"))
                        .arg(opt("color", "#RRGGBB"))
                        .arg(opt("description", "Notes").default_value(""))
                        .arg(opt("priority", "alta | media | baixa").default_value("media")),
                )
                .subcommand(
                    Command::new("update")
                        .arg(id_arg())
                        .arg(opt("name", "Category name"))
                        .arg(opt("amount", "Planned amount"))
                        .arg(opt("color", "#RRGGBB"))
                        .arg(opt("description", "Notes"))
                        .arg(opt("priority", "alta | media | baixa"))
                        .arg(opt("version", "Version last read; rejects stale writes")),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("analytics")
                .arg(opt("month", "YYYY-MM (defaults to the current month)"))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("suggest")
                .arg(opt("month", "Month to plan YYYY-MM (defaults to the current month)"))
                .arg(json_flag()),
        )
}

pub fn build_cli() -> Command {
    Command::new("famfin")
        .about("Family finance ledger")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("token")
                .long("token")
                .env("FAMFIN_TOKEN")
                .global(true)
                .help("Bearer token from `famfin login`"),
        )
        .arg(
            Arg::new("today")
                .long("today")
                .global(true)
                .hide(true)
                .help("Reference date YYYY-MM-DD"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommands(auth_commands())
        .subcommand(tx_command())
        .subcommand(card_command())
        .subcommand(invest_command())
        .subcommand(debt_command())
        .subcommand(goal_command())
        .subcommand(budget_command())
        .subcommand(
            Command::new("dashboard")
                .about("Income, expenses and evolution for a date range")
                .arg(opt("from", "Start date YYYY-MM-DD"))
                .arg(opt("to", "End date YYYY-MM-DD"))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(opt("format", "csv | json").default_value("csv"))
                    .arg(req("out", "Output path")),
            ),
        )
        .subcommand(
            Command::new("config")
                .subcommand(Command::new("get").arg(req("key", "Setting name")))
                .subcommand(
                    Command::new("set")
                        .arg(req("key", "Setting name"))
                        .arg(req("value", "New value")),
                ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check the ledger for integrity faults")
                .arg(json_flag()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn token_is_accepted_after_subcommand() {
        let m = build_cli().get_matches_from(["famfin", "tx", "list", "--token", "abc"]);
        assert_eq!(m.get_one::<String>("token").map(String::as_str), Some("abc"));
    }

    #[test]
    fn category_add_targets_one_budget() {
        let add = |target: &[&str]| {
            let mut args = vec!["famfin", "budget", "category", "add", "--name", "Casa"];
            args.extend_from_slice(&["--amount", "100"]);
            args.extend_from_slice(target);
            build_cli().try_get_matches_from(args)
        };
        assert!(add(&["--budget", "3"]).is_ok());
        assert!(add(&["--month", "2025-03"]).is_ok());
        assert!(add(&[]).is_err());
        assert!(add(&["--budget", "3", "--month", "2025-03"]).is_err());
    }
}
