// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Logins, bearer tokens and family membership.
//!
//! The family a request acts on is always read from the stored user row behind
//! the token, never supplied by the caller.

use crate::error::{FinanceError, Result};
use crate::utils::require_text;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 6;

/// Authenticated request context handed to every ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: i64,
    pub email: String,
    pub family_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub user_id: i64,
    pub family_id: String,
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Creates a login. A fresh family is minted unless `join_family` names an existing one.
pub fn register(
    conn: &Connection,
    email: &str,
    password: &str,
    join_family: Option<&str>,
) -> Result<Registration> {
    let email = require_text("email", email)?.to_lowercase();
    if !email.contains('@') {
        return Err(FinanceError::validation("email", "must contain '@'"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FinanceError::validation(
            "password",
            format!("must have at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    let taken: Option<i64> = conn
        .query_row("SELECT id FROM users WHERE email=?1", params![&email], |r| {
            r.get(0)
        })
        .optional()?;
    if taken.is_some() {
        return Err(FinanceError::Conflict(format!(
            "email '{}' is already registered",
            email
        )));
    }

    let family_id = match join_family.map(str::trim).filter(|f| !f.is_empty()) {
        Some(fid) => {
            let known: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM users WHERE family_id=?1 LIMIT 1",
                    params![fid],
                    |r| r.get(0),
                )
                .optional()?;
            if known.is_none() {
                return Err(FinanceError::not_found("family", fid));
            }
            fid.to_string()
        }
        None => Uuid::new_v4().to_string(),
    };

    let salt = Uuid::new_v4().simple().to_string();
    conn.execute(
        "INSERT INTO users(email, password_hash, salt, family_id) VALUES (?1, ?2, ?3, ?4)",
        params![&email, hash_password(&salt, password), &salt, &family_id],
    )?;
    let user_id = conn.last_insert_rowid();
    tracing::info!(user_id, %family_id, "user registered");
    Ok(Registration { user_id, family_id })
}

/// Verifies credentials and issues a new bearer token.
pub fn login(conn: &Connection, email: &str, password: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let row: Option<(i64, String, String)> = conn
        .query_row(
            "SELECT id, password_hash, salt FROM users WHERE email=?1",
            params![&email],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;
    let Some((user_id, stored_hash, salt)) = row else {
        tracing::warn!(%email, "login for unknown email");
        return Err(FinanceError::Unauthorized);
    };
    if hash_password(&salt, password) != stored_hash {
        tracing::warn!(user_id, "login with wrong password");
        return Err(FinanceError::Unauthorized);
    }
    let token = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO sessions(token, user_id) VALUES (?1, ?2)",
        params![&token, user_id],
    )?;
    tracing::info!(user_id, "session opened");
    Ok(token)
}

pub fn resolve(conn: &Connection, token: &str) -> Result<Session> {
    let token = token.trim();
    if token.is_empty() {
        return Err(FinanceError::Unauthorized);
    }
    conn.query_row(
        "SELECT u.id, u.email, u.family_id FROM sessions s JOIN users u ON s.user_id=u.id
         WHERE s.token=?1",
        params![token],
        |r| {
            Ok(Session {
                user_id: r.get(0)?,
                email: r.get(1)?,
                family_id: r.get(2)?,
            })
        },
    )
    .optional()?
    .ok_or(FinanceError::Unauthorized)
}

pub fn logout(conn: &Connection, token: &str) -> Result<()> {
    let n = conn.execute("DELETE FROM sessions WHERE token=?1", params![token.trim()])?;
    if n == 0 {
        return Err(FinanceError::Unauthorized);
    }
    Ok(())
}

/// Emails of everyone sharing the session's family ledger.
pub fn family_members(conn: &Connection, session: &Session) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT email FROM users WHERE family_id=?1 ORDER BY email")?;
    let rows = stmt.query_map(params![&session.family_id], |r| r.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
