// Copyright (c) 2025 Smartbill.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Category;

/// Ordered keyword table. The first matching rule wins, so the order is the
/// priority: income indicators are checked before everything else, then
/// food, shopping, transport, entertainment, housing, health, education.
/// A label matching none of them is Other.
const RULES: &[(Category, &[&str])] = &[
    (
        Category::Income,
        &["收", "入", "工资", "钱", "income", "salary", "wage", "payout", "bonus"],
    ),
    (
        Category::Food,
        &["餐", "吃", "饭", "food", "lunch", "dinner", "breakfast", "meal", "coffee", "restaurant"],
    ),
    (
        Category::Shopping,
        &["购", "买", "淘宝", "shop", "buy", "mall", "store", "taobao"],
    ),
    (
        Category::Transport,
        &["交", "车", "打车", "transport", "taxi", "bus", "metro", "train", "fuel", "didi"],
    ),
    (
        Category::Entertainment,
        &["娱", "电影", "游戏", "entertain", "movie", "game", "cinema", "ktv"],
    ),
    (
        Category::Housing,
        &["住", "房", "租", "hous", "rent", "apartment", "mortgage"],
    ),
    (
        Category::Health,
        &["医", "药", "看病", "health", "medic", "hospital", "pharmacy", "doctor"],
    ),
    (
        Category::Education,
        &["教", "学费", "培训", "educat", "tuition", "course", "school"],
    ),
];

/// Map a free-form category label (model output, CSV column, human text)
/// onto the closed category set. Total: any input yields a category, and
/// anything unmatched is Other.
pub fn normalize(raw: &str) -> Category {
    let s = raw.to_lowercase();
    for (cat, keywords) in RULES {
        if keywords.iter().any(|k| s.contains(k)) {
            return *cat;
        }
    }
    Category::Other
}

/// Enforce consistency between a normalized category and the model's
/// explicit income flag. After this, the result is Income iff the flag was
/// true: a candidate flagged as income always lands in Income, and a
/// candidate not flagged as income never does.
pub fn reconcile_income_flag(category: Category, is_income: bool) -> Category {
    if is_income && category != Category::Income {
        Category::Income
    } else if !is_income && category == Category::Income {
        Category::Other
    } else {
        category
    }
}

/// The expense/income split used by every aggregate.
pub fn is_income(category: Category) -> bool {
    category == Category::Income
}
