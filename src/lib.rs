// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod aggregate;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod db;
pub mod error;
pub mod evaluate;
pub mod installments;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod suggest;
pub mod utils;

pub use error::{FinanceError, Result};
