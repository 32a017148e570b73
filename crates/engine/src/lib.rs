pub use budgets::{Budget, BudgetProgress, NewBudget};
pub use categories::{Category, CategoryUsage, DEFAULT_CATEGORIES, DEFAULT_CATEGORY_COLOR, SeedOutcome};
pub use currency::Currency;
pub use error::{EngineError, ErrorKind};
pub use expenses::{CategoryRef, Expense, ExpenseListFilter, ExpenseUpdate, ExpenseView, NewExpense};
pub use money::{AGGREGATE_SCALE, Money, format_minor};
pub use ops::{CategoryTotal, DashboardSummary, Engine, EngineBuilder, FinancialContext};
pub use rates::{Conversion, RateError, RateProvider, convert};
pub use suggest::{CategorySuggester, SuggestError, resolve_suggestion};
pub use users::{NewUser, User};
pub use util::parse_date;

mod budgets;
mod categories;
mod currency;
mod error;
mod expenses;
mod money;
mod ops;
mod password;
pub mod rates;
pub mod suggest;
mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
