//! Executes one parsed command and returns its JSON output.
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate};
use engine::{
    Currency, Engine, EngineError, ExpenseListFilter, ExpenseUpdate, Money, NewBudget, NewExpense,
    NewUser, User,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    cli::{
        BudgetCommand, CategoryCommand, Cli, Command, ExpenseCommand, PeriodArgs, UserCommand,
    },
    error::{AppError, Result},
    prompt::{prompt_new_password, prompt_password},
    rates::ExchangeRateApi,
    settings::Settings,
    suggester::HttpSuggester,
};

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn period(args: &PeriodArgs) -> (i32, u32) {
    let today = today();
    (
        args.year.unwrap_or_else(|| today.year()),
        args.month.unwrap_or_else(|| today.month()),
    )
}

fn parse_currency(raw: Option<&str>, fallback: Currency) -> Result<Currency> {
    match raw {
        Some(code) => Ok(Currency::try_from(code)?),
        None => Ok(fallback),
    }
}

fn amount_minor(raw: &str, currency: Currency) -> Result<i64> {
    Ok(Money::parse(raw, currency)?.amount_minor)
}

async fn connect_db(database_url: &str) -> Result<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn required_email(email: Option<&str>) -> Result<&str> {
    email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::Usage("--email (or FINTRACK_EMAIL) is required".to_string()))
}

async fn acting_user(engine: &Engine, email: Option<&str>) -> Result<User> {
    Ok(engine.user_by_email(required_email(email)?).await?)
}

/// Resolves a category given by id or by name (ignoring case).
async fn resolve_category(engine: &Engine, user_id: Uuid, raw: &str) -> Result<Uuid> {
    let raw = raw.trim();
    let categories = engine.list_categories(user_id).await?;
    let by_id = Uuid::parse_str(raw)
        .ok()
        .and_then(|id| categories.iter().find(|c| c.id == id));
    by_id
        .or_else(|| categories.iter().find(|c| c.name.eq_ignore_ascii_case(raw)))
        .map(|c| c.id)
        .ok_or_else(|| EngineError::KeyNotFound(format!("category '{raw}'")).into())
}

async fn open_engine(cli_url: Option<&str>, settings: &Settings) -> Result<Engine> {
    let database_url = cli_url.map_or_else(|| settings.database.url(), str::to_string);
    let db = connect_db(&database_url).await?;
    Ok(Engine::builder().database(db).build().await?)
}

pub async fn dispatch(cli: Cli, settings: &Settings) -> Result<Value> {
    let database_url = cli.database_url.as_deref();
    let email = cli.email.as_deref();

    match cli.command {
        Command::Convert { from, to, amount } => {
            // Conversion only talks to the rate service.
            let api = ExchangeRateApi::new(
                &settings.rates.base_url,
                Duration::from_secs(settings.rates.timeout_secs),
            )?;
            to_json(&engine::convert(&api, &from, &to, &amount).await?)
        }
        Command::User(user) => {
            let engine = open_engine(database_url, settings).await?;
            user_command(&engine, email, user.command).await
        }
        Command::Category(category) => {
            let engine = open_engine(database_url, settings).await?;
            let user = acting_user(&engine, email).await?;
            category_command(&engine, &user, category.command).await
        }
        Command::Expense(expense) => {
            let engine = open_engine(database_url, settings).await?;
            let user = acting_user(&engine, email).await?;
            expense_command(&engine, &user, expense.command).await
        }
        Command::Budget(budget) => {
            let engine = open_engine(database_url, settings).await?;
            let user = acting_user(&engine, email).await?;
            budget_command(&engine, &user, budget.command).await
        }
        Command::Dashboard { date } => {
            let engine = open_engine(database_url, settings).await?;
            let user = acting_user(&engine, email).await?;
            let summary = engine
                .dashboard_summary(user.id, date.unwrap_or_else(today))
                .await?;
            to_json(&summary)
        }
        Command::Context => {
            let engine = open_engine(database_url, settings).await?;
            let user = acting_user(&engine, email).await?;
            to_json(&engine.financial_context(user.id).await?)
        }
        Command::Suggest { description } => {
            let engine = open_engine(database_url, settings).await?;
            let user = acting_user(&engine, email).await?;
            let suggestion = match &settings.suggest.url {
                Some(url) => {
                    let suggester = HttpSuggester::new(
                        url,
                        Duration::from_secs(settings.suggest.timeout_secs),
                    )?;
                    engine
                        .suggest_category(user.id, &description, Some(&suggester))
                        .await?
                }
                None => {
                    engine
                        .suggest_category::<HttpSuggester>(user.id, &description, None)
                        .await?
                }
            };
            Ok(json!({ "description": description, "suggestion": suggestion }))
        }
    }
}

async fn user_command(engine: &Engine, email: Option<&str>, command: UserCommand) -> Result<Value> {
    let email = required_email(email)?;
    match command {
        UserCommand::Register(args) => {
            let default_currency = args
                .currency
                .as_deref()
                .map(Currency::try_from)
                .transpose()?;
            let password = prompt_new_password()?;
            let user = engine
                .register_user(NewUser {
                    email: email.to_string(),
                    password,
                    first_name: args.first_name,
                    last_name: args.last_name,
                    default_currency,
                })
                .await?;
            to_json(&user)
        }
        UserCommand::Login => {
            let password = prompt_password("Password: ")?;
            to_json(&engine.authenticate(email, &password).await?)
        }
        UserCommand::Show => to_json(&engine.user_by_email(email).await?),
        UserCommand::ResetPassword => {
            let password = prompt_new_password()?;
            engine.reset_password(email, &password).await?;
            Ok(json!({ "email": email, "password_reset": true }))
        }
        UserCommand::Delete => {
            let password = prompt_password("Password: ")?;
            let user = engine.authenticate(email, &password).await?;
            engine.delete_user(user.id).await?;
            Ok(json!({ "deleted": user.id }))
        }
    }
}

async fn category_command(engine: &Engine, user: &User, command: CategoryCommand) -> Result<Value> {
    match command {
        CategoryCommand::List => to_json(&engine.list_categories(user.id).await?),
        CategoryCommand::Add { name, color } => {
            to_json(&engine.create_category(user.id, &name, color.as_deref()).await?)
        }
        CategoryCommand::Seed => to_json(&engine.seed_default_categories(user.id).await?),
        CategoryCommand::Delete { id } => {
            engine.delete_category(user.id, id).await?;
            Ok(json!({ "deleted": id }))
        }
        CategoryCommand::Usage => to_json(&engine.category_usage(user.id).await?),
    }
}

async fn expense_command(engine: &Engine, user: &User, command: ExpenseCommand) -> Result<Value> {
    match command {
        ExpenseCommand::Add(args) => {
            let currency = parse_currency(args.currency.as_deref(), user.default_currency)?;
            let category_id = resolve_category(engine, user.id, &args.category).await?;
            let view = engine
                .create_expense(
                    user.id,
                    NewExpense {
                        amount_minor: amount_minor(&args.amount, currency)?,
                        description: args.description,
                        date: args.date.unwrap_or_else(today),
                        category_id,
                        currency: Some(currency),
                    },
                )
                .await?;
            to_json(&view)
        }
        ExpenseCommand::List => to_json(&engine.list_expenses(user.id).await?),
        ExpenseCommand::Search(args) => {
            let category_id = match args.category.as_deref() {
                Some(raw) => Some(resolve_category(engine, user.id, raw).await?),
                None => None,
            };
            let filter = ExpenseListFilter {
                category_id,
                from: args.from,
                to: args.to,
                search: args.search,
                limit: args.limit,
            };
            to_json(&engine.search_expenses(user.id, &filter).await?)
        }
        ExpenseCommand::Show { id } => to_json(&engine.expense(user.id, id).await?),
        ExpenseCommand::Update(args) => {
            let current = engine.expense(user.id, args.id).await?;
            let currency = args
                .currency
                .as_deref()
                .map(Currency::try_from)
                .transpose()?;
            let amount_minor = match args.amount.as_deref() {
                Some(raw) => Some(amount_minor(
                    raw,
                    currency.unwrap_or(current.expense.currency),
                )?),
                None => None,
            };
            let category_id = match args.category.as_deref() {
                Some(raw) => Some(resolve_category(engine, user.id, raw).await?),
                None => None,
            };
            let update = ExpenseUpdate {
                amount_minor,
                description: args.description,
                date: args.date,
                category_id,
                currency,
            };
            to_json(&engine.update_expense(user.id, args.id, update).await?)
        }
        ExpenseCommand::Delete { id } => {
            engine.delete_expense(user.id, id).await?;
            Ok(json!({ "deleted": id }))
        }
    }
}

async fn budget_command(engine: &Engine, user: &User, command: BudgetCommand) -> Result<Value> {
    match command {
        BudgetCommand::Set {
            category,
            amount,
            period: period_args,
        } => {
            let (year, month) = period(&period_args);
            let category_id = resolve_category(engine, user.id, &category).await?;
            let budget = engine
                .create_budget(
                    user.id,
                    NewBudget {
                        category_id,
                        amount_minor: amount_minor(&amount, user.default_currency)?,
                        month,
                        year,
                    },
                )
                .await?;
            to_json(&budget)
        }
        BudgetCommand::Update { id, amount } => {
            let amount_minor = amount_minor(&amount, user.default_currency)?;
            to_json(&engine.update_budget_amount(user.id, id, amount_minor).await?)
        }
        BudgetCommand::List {
            all,
            period: period_args,
        } => {
            let filter = (!all).then(|| period(&period_args));
            to_json(&engine.list_budgets(user.id, filter).await?)
        }
        BudgetCommand::Delete { id } => {
            engine.delete_budget(user.id, id).await?;
            Ok(json!({ "deleted": id }))
        }
        BudgetCommand::Progress {
            period: period_args,
        } => {
            let (year, month) = period(&period_args);
            to_json(&engine.budget_progress(user.id, year, month).await?)
        }
    }
}
