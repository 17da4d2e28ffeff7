// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod category;
pub mod cli;
pub mod commands;
pub mod context;
pub mod db;
pub mod gateway;
pub mod history;
pub mod models;
pub mod prompt;
pub mod reconcile;
pub mod utils;
