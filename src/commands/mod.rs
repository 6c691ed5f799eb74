// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod transactions;
pub mod cards;
pub mod investments;
pub mod debts;
pub mod goals;
pub mod budgets;
pub mod reports;
pub mod exporter;
pub mod config;
pub mod doctor;

use anyhow::{Context, Result};
use clap::ArgMatches;

pub(crate) fn required<'a>(m: &'a ArgMatches, id: &str) -> Result<&'a str> {
    m.get_one::<String>(id)
        .map(String::as_str)
        .with_context(|| format!("missing --{}", id))
}

pub(crate) fn optional<'a>(m: &'a ArgMatches, id: &str) -> Option<&'a str> {
    m.get_one::<String>(id).map(String::as_str)
}

pub(crate) fn required_id(m: &ArgMatches, id: &str) -> Result<i64> {
    let raw = required(m, id)?;
    raw.trim()
        .parse()
        .with_context(|| format!("--{} expects a numeric id, got '{}'", id, raw))
}

pub(crate) fn optional_number<T: std::str::FromStr>(m: &ArgMatches, id: &str) -> Result<Option<T>> {
    match optional(m, id) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("--{} expects a number, got '{}'", id, raw)),
        None => Ok(None),
    }
}
