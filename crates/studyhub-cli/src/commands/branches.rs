//! The `studyhub branches` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, Table};

pub fn execute(catalog_path: Option<PathBuf>) -> Result<()> {
    let catalog = super::load_catalog(catalog_path.as_deref())?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Slug", "Name", "Level", "Questions", "Tasks"]);

    for branch in catalog.branches() {
        table.add_row(vec![
            Cell::new(&branch.slug),
            Cell::new(&branch.name),
            Cell::new(&branch.level),
            Cell::new(branch.quiz.len()),
            Cell::new(branch.schedule.len()),
        ]);
    }

    println!("{table}");
    println!("{} branches", catalog.len());
    Ok(())
}
