//! The `tutorforge problems` command: prints the sanitized problem listing
//! as a table. Hidden cases are never rendered (I6).

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use crate::context::AppContext;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let ctx = AppContext::load(config_path.as_deref())?;
    let listing = ctx.catalog.listing();

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Difficulty", "Hidden Cases"]);

    let mut ids: Vec<&String> = listing.keys().collect();
    ids.sort();
    for id in ids {
        let summary = &listing[id];
        table.add_row(vec![
            Cell::new(id),
            Cell::new(&summary.title),
            Cell::new(&summary.difficulty),
            Cell::new(summary.case_count.to_string()),
        ]);
    }

    println!("{table}");
    Ok(())
}
