#[cfg(feature = "demo")]
pub mod demo;
pub mod init;
pub mod ledger;
pub mod marks;
pub mod payroll;
pub mod search;
pub mod students;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::aggregate::Summarize;
use crate::backend::{Backend, ListQuery, PageInfo};
use crate::error::{CmsError, Result};
use crate::models::{LedgerKind, PaymentStatus, Record};
use crate::screen::Screen;
use crate::settings::{load_settings, Settings};
use crate::store::Store;

#[derive(Parser)]
#[command(name = "campus", about = "Fees, payroll and marks for a college office.")]
pub struct Cli {
    /// Work on the demo database instead of the real one
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and create the database.
    Init {
        /// Path for campus data (default: ~/Documents/campus-ledger)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Fill the separate demo database with sample records.
    #[cfg(feature = "demo")]
    Demo,
    /// Manage students.
    Students {
        #[command(subcommand)]
        command: StudentsCommands,
    },
    /// Fees, expenses and maintenance costs.
    Ledger {
        #[command(subcommand)]
        command: LedgerCommands,
    },
    /// Staff salaries.
    Payroll {
        #[command(subcommand)]
        command: PayrollCommands,
    },
    /// Exam marks and grades.
    Marks {
        #[command(subcommand)]
        command: MarksCommands,
    },
    /// Server-side free-text search.
    Search {
        #[arg(value_enum)]
        entity: Entity,
        term: String,
    },
}

#[derive(Subcommand)]
pub enum StudentsCommands {
    /// Add a student.
    Add {
        name: String,
        #[arg(long)]
        roll: String,
        #[arg(long)]
        department: Option<String>,
    },
    /// List active students.
    List,
    /// Deactivate a student. Their fees and marks are kept.
    Remove { id: i64 },
}

#[derive(Args, Default)]
pub struct ListArgs {
    /// Only show rows containing this text (summary cards still cover every row)
    #[arg(long)]
    pub filter: Option<String>,
    #[arg(long, default_value = "1")]
    pub page: u32,
}

#[derive(Args, Default)]
pub struct LedgerFields {
    /// Student id (required for fees)
    #[arg(long)]
    pub student: Option<String>,
    /// Vendor or requester
    #[arg(long)]
    pub party: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long)]
    pub paid: Option<String>,
    /// YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<String>,
    /// Leave out to derive it from the amounts
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,
}

#[derive(Subcommand)]
pub enum LedgerCommands {
    List {
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[command(flatten)]
        list: ListArgs,
    },
    Add {
        #[arg(long, value_enum)]
        kind: KindArg,
        #[command(flatten)]
        fields: LedgerFields,
    },
    /// Change fields of an existing record; omitted fields keep their value.
    Update {
        id: i64,
        #[command(flatten)]
        fields: LedgerFields,
    },
    Delete { id: i64 },
    /// Totals across every record of the kind.
    Summary {
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },
}

#[derive(Args, Default)]
pub struct PayrollFields {
    #[arg(long)]
    pub staff: Option<String>,
    /// YYYY-MM
    #[arg(long)]
    pub month: Option<String>,
    #[arg(long)]
    pub base: Option<String>,
    #[arg(long)]
    pub allowances: Option<String>,
    #[arg(long)]
    pub deductions: Option<String>,
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,
}

#[derive(Subcommand)]
pub enum PayrollCommands {
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[command(flatten)]
        list: ListArgs,
    },
    Add {
        #[command(flatten)]
        fields: PayrollFields,
    },
    Update {
        id: i64,
        #[command(flatten)]
        fields: PayrollFields,
    },
    Delete { id: i64 },
    Summary,
}

#[derive(Subcommand)]
pub enum MarksCommands {
    List {
        #[arg(long)]
        student: Option<i64>,
        #[command(flatten)]
        list: ListArgs,
    },
    Add {
        #[arg(long)]
        student: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        exam: String,
        #[arg(long)]
        marks: String,
        #[arg(long = "max-marks")]
        max_marks: Option<String>,
    },
    Delete { id: i64 },
    Summary {
        #[arg(long)]
        student: Option<i64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Fee,
    Expense,
    Maintenance,
}

impl From<KindArg> for LedgerKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Fee => LedgerKind::Fee,
            KindArg::Expense => LedgerKind::Expense,
            KindArg::Maintenance => LedgerKind::Maintenance,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Pending,
    Partial,
    Paid,
}

impl From<StatusArg> for PaymentStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Pending => PaymentStatus::Pending,
            StatusArg::Partial => PaymentStatus::Partial,
            StatusArg::Paid => PaymentStatus::Paid,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Entity {
    Ledger,
    Payroll,
    Marks,
}

/// Settings plus which database the command targets.
pub struct Context {
    pub settings: Settings,
    pub demo: bool,
}

impl Context {
    pub fn load(demo: bool) -> Self {
        Self {
            settings: load_settings(),
            demo,
        }
    }

    pub fn open_store(&self) -> Result<Store> {
        let path = self.settings.db_path(self.demo);
        if !path.exists() {
            let hint = if self.demo { "campus demo" } else { "campus init" };
            return Err(CmsError::Settings(format!(
                "database not found at {}. Run `{hint}` first.",
                path.display()
            )));
        }
        Ok(Store::open(&path)?.with_rules(self.settings.derive_rules()))
    }

    pub fn screen<R: Record + Summarize>(&self) -> Screen<R> {
        Screen::new(self.settings.insert_position).with_debounce(self.settings.debounce())
    }

    pub fn page_query(&self, page: u32) -> ListQuery {
        ListQuery::page(page, self.settings.page_size)
    }

    /// A screen holding every row matching `query`'s filters.
    pub fn load_all<R>(&self, store: &Store, query: ListQuery) -> Result<Screen<R>>
    where
        R: Record + Summarize,
        Store: Backend<R>,
    {
        let mut screen = self.screen();
        screen.load(
            store,
            &ListQuery {
                page: 1,
                per_page: u32::MAX,
                ..query
            },
        )?;
        Ok(screen)
    }
}

pub(crate) fn page_footer(page: u32, info: PageInfo) -> String {
    format!(
        "Page {} of {} ({} records)",
        page.max(1),
        info.total_pages.max(1),
        info.total_items
    )
}
