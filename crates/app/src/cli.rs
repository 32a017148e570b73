use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

fn date_arg(raw: &str) -> Result<NaiveDate, String> {
    engine::parse_date(raw).map_err(|err| err.to_string())
}

#[derive(Parser, Debug)]
#[command(name = "fintrack")]
#[command(about = "Personal expense tracking: categories, expenses, budgets and dashboards")]
pub struct Cli {
    /// Settings file (TOML), without extension is fine.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Database connection string (also read from `DATABASE_URL`). Overrides
    /// the `database` setting.
    #[arg(long, global = true, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Email of the acting user.
    #[arg(long, global = true, env = "FINTRACK_EMAIL")]
    pub email: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Accounts.
    User(User),
    /// Expense categories.
    Category(Category),
    /// Recorded expenses.
    Expense(Expense),
    /// Monthly limits per category.
    Budget(Budget),
    /// Spending overview for one month.
    Dashboard {
        /// Any date inside the month to summarize; defaults to today.
        #[arg(long, value_parser = date_arg)]
        date: Option<NaiveDate>,
    },
    /// All-time figures for the assistant.
    Context,
    /// Suggest a category for a description.
    Suggest { description: String },
    /// Convert an amount between currencies at the current rate.
    Convert {
        from: String,
        to: String,
        amount: String,
    },
}

#[derive(Args, Debug)]
pub struct User {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    Register(RegisterArgs),
    /// Check the password of `--email`.
    Login,
    Show,
    ResetPassword,
    /// Delete the account and everything it owns.
    Delete,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    /// ISO 4217 code; USD when omitted.
    #[arg(long)]
    pub currency: Option<String>,
}

#[derive(Args, Debug)]
pub struct Category {
    #[command(subcommand)]
    pub command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    List,
    Add {
        name: String,
        /// `#RRGGBB`.
        #[arg(long)]
        color: Option<String>,
    },
    /// Create the default categories if none exist.
    Seed,
    Delete {
        id: Uuid,
    },
    /// Categories with their expense counts.
    Usage,
}

#[derive(Args, Debug)]
pub struct Expense {
    #[command(subcommand)]
    pub command: ExpenseCommand,
}

#[derive(Subcommand, Debug)]
pub enum ExpenseCommand {
    Add(ExpenseAddArgs),
    List,
    Search(ExpenseSearchArgs),
    Show { id: Uuid },
    Update(ExpenseUpdateArgs),
    Delete { id: Uuid },
}

#[derive(Args, Debug)]
pub struct ExpenseAddArgs {
    /// Amount in major units, e.g. `12.50`.
    #[arg(long)]
    pub amount: String,
    #[arg(long)]
    pub description: String,
    /// Category name or id.
    #[arg(long)]
    pub category: String,
    /// Defaults to today.
    #[arg(long, value_parser = date_arg)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub currency: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExpenseSearchArgs {
    /// Category name or id.
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, value_parser = date_arg)]
    pub from: Option<NaiveDate>,
    #[arg(long, value_parser = date_arg)]
    pub to: Option<NaiveDate>,
    /// Text contained in the description.
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub limit: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ExpenseUpdateArgs {
    pub id: Uuid,
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, value_parser = date_arg)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub currency: Option<String>,
}

#[derive(Args, Debug)]
pub struct Budget {
    #[command(subcommand)]
    pub command: BudgetCommand,
}

#[derive(Args, Debug)]
pub struct PeriodArgs {
    /// 1-12; defaults to the current month.
    #[arg(long)]
    pub month: Option<u32>,
    /// Defaults to the current year.
    #[arg(long)]
    pub year: Option<i32>,
}

#[derive(Subcommand, Debug)]
pub enum BudgetCommand {
    Set {
        /// Category name or id.
        #[arg(long)]
        category: String,
        /// Limit in major units of the user's currency.
        #[arg(long)]
        amount: String,
        #[command(flatten)]
        period: PeriodArgs,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        amount: String,
    },
    List {
        /// List every period instead of one month.
        #[arg(long)]
        all: bool,
        #[command(flatten)]
        period: PeriodArgs,
    },
    Delete {
        id: Uuid,
    },
    Progress {
        #[command(flatten)]
        period: PeriodArgs,
    },
}
