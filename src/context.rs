// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::category::is_income;
use crate::models::{Category, Transaction};

const TOP_EXPENSE: usize = 5;
const TOP_INCOME: usize = 3;
const RECENT: usize = 10;

/// Snapshot of the financial state injected into every model request so the
/// assistant can quote real numbers. Built from the ledger on demand;
/// nothing here is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSummary {
    pub as_of: NaiveDate,
    pub monthly_budget: Decimal,
    pub month_expense: Decimal,
    pub month_income: Decimal,
    pub net: Decimal,
    pub remaining: Decimal,
    pub usage_pct: i64,
    pub today_expense: Decimal,
    pub today_income: Decimal,
    pub today_lines: Vec<String>,
    pub top_expense: Vec<(Category, Decimal)>,
    pub top_income: Vec<(Category, Decimal)>,
    pub recent_lines: Vec<String>,
}

/// Compute the grounding context. Pure and deterministic: same ledger, same
/// budget, same date in, same summary out.
///
/// `transactions` must be in insertion order, newest first (the order
/// `utils::load_ledger` returns). Aggregates cover only confirmed entries in
/// `as_of`'s month; the recent list covers the newest entries regardless of
/// confirmation state so pending imports stay visible.
pub fn build_context(
    transactions: &[Transaction],
    monthly_budget: Decimal,
    as_of: NaiveDate,
) -> ContextSummary {
    let in_month = |t: &Transaction| {
        t.date.year() == as_of.year() && t.date.month() == as_of.month()
    };

    let confirmed_month: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| !t.need_confirmation && in_month(t))
        .collect();

    let mut month_expense = Decimal::ZERO;
    let mut month_income = Decimal::ZERO;
    for t in &confirmed_month {
        if is_income(t.category) {
            month_income += t.amount;
        } else {
            month_expense += t.amount;
        }
    }

    let remaining = monthly_budget - month_expense;
    let usage_pct = if monthly_budget <= Decimal::ZERO {
        0
    } else {
        (month_expense / monthly_budget * Decimal::from(100))
            .round()
            .to_i64()
            .unwrap_or(0)
    };

    let mut today_expense = Decimal::ZERO;
    let mut today_income = Decimal::ZERO;
    let mut today_lines = Vec::new();
    for t in confirmed_month.iter().filter(|t| t.date == as_of) {
        if is_income(t.category) {
            today_income += t.amount;
        } else {
            today_expense += t.amount;
        }
        today_lines.push(format!("{}(¥{})", t.merchant, t.amount));
    }

    let top_expense = ranked(
        confirmed_month.iter().filter(|t| !is_income(t.category)),
        TOP_EXPENSE,
    );
    let top_income = ranked(
        confirmed_month.iter().filter(|t| is_income(t.category)),
        TOP_INCOME,
    );

    let recent_lines = transactions
        .iter()
        .take(RECENT)
        .map(|t| format!("- {} | {} | {} | ¥{}", t.date, t.merchant, t.category, t.amount))
        .collect();

    ContextSummary {
        as_of,
        monthly_budget,
        month_expense,
        month_income,
        net: month_income - month_expense,
        remaining,
        usage_pct,
        today_expense,
        today_income,
        today_lines,
        top_expense,
        top_income,
        recent_lines,
    }
}

/// Per-category totals, descending by amount, ties kept in the order the
/// category was first encountered. The input order is the tie-break order.
fn ranked<'a>(
    txns: impl Iterator<Item = &'a &'a Transaction>,
    limit: usize,
) -> Vec<(Category, Decimal)> {
    let mut totals: Vec<(Category, Decimal)> = Vec::new();
    for t in txns {
        match totals.iter_mut().find(|(c, _)| *c == t.category) {
            Some((_, sum)) => *sum += t.amount,
            None => totals.push((t.category, t.amount)),
        }
    }
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals.truncate(limit);
    totals
}

impl ContextSummary {
    /// Serialize as the grounding text block the prompt builder embeds in
    /// the system instruction.
    pub fn render(&self) -> String {
        let today_detail = if self.today_lines.is_empty() {
            "无".to_string()
        } else {
            self.today_lines.join(", ")
        };
        let recent = if self.recent_lines.is_empty() {
            "暂无".to_string()
        } else {
            self.recent_lines.join("\n")
        };
        let top_expense = if self.top_expense.is_empty() {
            "暂无".to_string()
        } else {
            self.top_expense
                .iter()
                .map(|(c, a)| format!("{}(¥{})", c, a))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let top_income = if self.top_income.is_empty() {
            "暂无".to_string()
        } else {
            self.top_income
                .iter()
                .map(|(c, a)| format!("{}(¥{})", c, a))
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!(
            "\n# 当前财务概况 (日期: {as_of})\n\
             \n\
             # 本月预算信息\n\
             - 月度预算: ¥{budget}\n\
             - 本月已消费: ¥{expense}\n\
             - 本月收入: ¥{income}\n\
             - 本月净额: ¥{net}\n\
             - 剩余可用: ¥{remaining}\n\
             - 预算使用进度: {usage}%\n\
             \n\
             - 今日已确认支出: ¥{today_expense}\n\
             - 今日已确认收入: ¥{today_income}\n\
             - 今日明细: {today_detail}\n\
             - 支出构成(前{te}): {top_expense}\n\
             - 收入构成(前{ti}): {top_income}\n\
             - 最近{rc}笔记录:\n{recent}\n",
            as_of = self.as_of,
            budget = self.monthly_budget,
            expense = self.month_expense,
            income = self.month_income,
            net = self.net,
            remaining = self.remaining,
            usage = self.usage_pct,
            today_expense = self.today_expense,
            today_income = self.today_income,
            today_detail = today_detail,
            te = TOP_EXPENSE,
            top_expense = top_expense,
            ti = TOP_INCOME,
            top_income = top_income,
            rc = RECENT,
            recent = recent,
        )
    }
}
