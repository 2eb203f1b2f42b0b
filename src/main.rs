use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use campus_ledger::cli::{
    self, Cli, Commands, Context, LedgerCommands, MarksCommands, PayrollCommands, StudentsCommands,
};

/// Quiet unless RUST_LOG asks for more. Logs go to stderr so tables on
/// stdout stay clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let ctx = Context::load(cli.demo);

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        #[cfg(feature = "demo")]
        Commands::Demo => cli::demo::run(&ctx),
        Commands::Students { command } => match command {
            StudentsCommands::Add {
                name,
                roll,
                department,
            } => cli::students::add(&ctx, &name, &roll, department.as_deref()),
            StudentsCommands::List => cli::students::list(&ctx),
            StudentsCommands::Remove { id } => cli::students::remove(&ctx, id),
        },
        Commands::Ledger { command } => match command {
            LedgerCommands::List { kind, status, list } => {
                cli::ledger::list(&ctx, kind.map(Into::into), status.map(Into::into), &list)
            }
            LedgerCommands::Add { kind, fields } => cli::ledger::add(&ctx, kind.into(), &fields),
            LedgerCommands::Update { id, fields } => cli::ledger::update(&ctx, id, &fields),
            LedgerCommands::Delete { id } => cli::ledger::delete(&ctx, id),
            LedgerCommands::Summary { kind } => cli::ledger::summary(&ctx, kind.map(Into::into)),
        },
        Commands::Payroll { command } => match command {
            PayrollCommands::List { status, list } => {
                cli::payroll::list(&ctx, status.map(Into::into), &list)
            }
            PayrollCommands::Add { fields } => cli::payroll::add(&ctx, &fields),
            PayrollCommands::Update { id, fields } => cli::payroll::update(&ctx, id, &fields),
            PayrollCommands::Delete { id } => cli::payroll::delete(&ctx, id),
            PayrollCommands::Summary => cli::payroll::summary(&ctx),
        },
        Commands::Marks { command } => match command {
            MarksCommands::List { student, list } => cli::marks::list(&ctx, student, &list),
            MarksCommands::Add {
                student,
                subject,
                exam,
                marks,
                max_marks,
            } => cli::marks::add(&ctx, &student, &subject, &exam, &marks, max_marks.as_deref()),
            MarksCommands::Delete { id } => cli::marks::delete(&ctx, id),
            MarksCommands::Summary { student } => cli::marks::summary(&ctx, student),
        },
        Commands::Search { entity, term } => cli::search::run(&ctx, entity, &term),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
