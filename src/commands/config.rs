// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::required;
use crate::utils::{DEFAULT_CURRENCY, get_setting, require_text, set_setting};
use anyhow::{Result, bail};
use rusqlite::Connection;

const KEYS: &[&str] = &["currency"];

fn check_key(key: &str) -> Result<()> {
    if !KEYS.contains(&key) {
        bail!("Unknown setting '{}' (known: {})", key, KEYS.join(", "));
    }
    Ok(())
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let key = required(sub, "key")?;
            check_key(key)?;
            let value = get_setting(conn, key)?;
            match (key, value) {
                (_, Some(v)) => println!("{}", v),
                ("currency", None) => println!("{}", DEFAULT_CURRENCY),
                _ => {}
            }
        }
        Some(("set", sub)) => {
            let key = required(sub, "key")?;
            check_key(key)?;
            let value = require_text("value", required(sub, "value")?)?;
            set_setting(conn, key, &value)?;
            println!("{} = {}", key, value);
        }
        _ => {}
    }
    Ok(())
}
