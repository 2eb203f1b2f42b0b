use crate::aggregate::Summarize;
use crate::backend::Backend;
use crate::cli::{ledger, marks, payroll, Context, Entity};
use crate::error::Result;
use crate::models::{LedgerRecord, MarkRecord, PayrollRecord, Record};
use crate::screen::Screen;
use crate::store::Store;

/// Ask the store for matches and keep them on the screen.
fn fetch<R>(ctx: &Context, store: &Store, term: &str) -> Result<Screen<R>>
where
    R: Record + Summarize,
    Store: Backend<R>,
{
    let mut screen = ctx.screen();
    screen.search(store, term)?;
    Ok(screen)
}

pub fn run(ctx: &Context, entity: Entity, term: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let count = match entity {
        Entity::Ledger => {
            let screen = fetch::<LedgerRecord>(ctx, &store, term)?;
            let rows: Vec<&LedgerRecord> = screen.search_results().unwrap_or_default().iter().collect();
            ledger::print_table(&format!("Ledger matching \"{term}\""), &rows);
            rows.len()
        }
        Entity::Payroll => {
            let screen = fetch::<PayrollRecord>(ctx, &store, term)?;
            let rows: Vec<&PayrollRecord> = screen.search_results().unwrap_or_default().iter().collect();
            payroll::print_table(&rows);
            rows.len()
        }
        Entity::Marks => {
            let screen = fetch::<MarkRecord>(ctx, &store, term)?;
            let rows: Vec<&MarkRecord> = screen.search_results().unwrap_or_default().iter().collect();
            marks::print_table(&rows);
            rows.len()
        }
    };
    println!("{count} match(es)");
    Ok(())
}
