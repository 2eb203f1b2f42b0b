use comfy_table::{Cell, Table};

use crate::cli::Context;
use crate::error::Result;

pub fn add(ctx: &Context, name: &str, roll: &str, department: Option<&str>) -> Result<()> {
    let store = ctx.open_store()?;
    let student = store.add_student(name, roll, department)?;
    println!("Added student #{}: {}", student.id, student.name);
    Ok(())
}

pub fn list(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let students = store.list_students()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Roll No.", "Department"]);
    for s in &students {
        table.add_row(vec![
            Cell::new(s.id),
            Cell::new(&s.name),
            Cell::new(&s.roll_number),
            Cell::new(s.department.as_deref().unwrap_or("")),
        ]);
    }
    println!("Students\n{table}");
    Ok(())
}

pub fn remove(ctx: &Context, id: i64) -> Result<()> {
    let store = ctx.open_store()?;
    store.remove_student(id)?;
    println!("Deactivated student #{id}");
    Ok(())
}
