// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod category;
pub mod sync;
pub mod transaction;

use std::collections::HashMap;

use crate::app::App;
use crate::error::Result;

/// Category names keyed by id, for display.
fn category_names(app: &App) -> Result<HashMap<i64, String>> {
    Ok(app
        .repo
        .get_categories()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect())
}
