// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod budget;
pub mod chat;
pub mod config;
pub mod doctor;
pub mod exporter;
pub mod importer;
pub mod report;
pub mod transactions;
