use std::path::PathBuf;

use crate::cli::Context;
use crate::demo::seed;
use crate::error::Result;
use crate::store::Store;

pub fn run(ctx: &Context) -> Result<()> {
    let dir = PathBuf::from(&ctx.settings.data_dir);
    std::fs::create_dir_all(&dir)?;
    let path = ctx.settings.db_path(true);
    let store = Store::open(&path)?;
    let counts = seed(&store)?;

    println!("Demo database ready at {}", path.display());
    println!(
        "  {} students, {} ledger records, {} payroll lines, {} marks",
        counts.students, counts.ledger, counts.payroll, counts.marks
    );
    println!("Add --demo to any command to use it, e.g. `campus --demo ledger summary`.");
    Ok(())
}
