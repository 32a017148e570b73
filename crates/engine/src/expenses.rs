//! The module contains the `Expense` ledger record and its views.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::{Currency, EngineError, Money, ResultEngine, categories};

/// A single spending event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    /// Amount in minor units of `currency`, always > 0.
    pub amount_minor: i64,
    pub currency: Currency,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    #[must_use]
    pub fn money(&self) -> Money {
        Money::new(self.amount_minor, self.currency)
    }
}

/// Name and color of the category an expense is filed under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub name: String,
    pub color: String,
}

/// Expense joined with its category, if the category still exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExpenseView {
    #[serde(flatten)]
    pub expense: Expense,
    pub category: Option<CategoryRef>,
}

impl ExpenseView {
    /// One line summary, e.g. `2024-03-05: Lunch - 50.00 USD (Food)`.
    #[must_use]
    pub fn display_line(&self) -> String {
        let category = self
            .category
            .as_ref()
            .map_or("Uncategorized", |c| c.name.as_str());
        format!(
            "{}: {} - {} ({category})",
            self.expense.date,
            self.expense.description,
            self.expense.money()
        )
    }
}

/// Input for [`Engine::create_expense`](crate::Engine::create_expense).
#[derive(Clone, Debug)]
pub struct NewExpense {
    pub amount_minor: i64,
    pub description: String,
    pub date: NaiveDate,
    pub category_id: Uuid,
    /// Falls back to the owner's default currency.
    pub currency: Option<Currency>,
}

/// Partial update: `None` fields keep their stored value.
#[derive(Clone, Debug, Default)]
pub struct ExpenseUpdate {
    pub amount_minor: Option<i64>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
    pub currency: Option<Currency>,
}

impl ExpenseUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amount_minor.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.category_id.is_none()
            && self.currency.is_none()
    }
}

/// Filters for [`Engine::search_expenses`](crate::Engine::search_expenses).
///
/// `from` and `to` are both inclusive.
#[derive(Clone, Debug, Default)]
pub struct ExpenseListFilter {
    pub category_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Substring of the description, matched literally and ignoring case
    /// (full Unicode lowercasing, `%` and `_` are plain characters).
    pub search: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub date: Date,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            category_id: model.category_id,
            amount_minor: model.amount_minor,
            currency: Currency::try_from(model.currency.as_str())?,
            description: model.description,
            date: model.date,
            created_at: model.created_at,
        })
    }
}

impl TryFrom<(Model, Option<categories::Model>)> for ExpenseView {
    type Error = EngineError;

    fn try_from((model, category): (Model, Option<categories::Model>)) -> ResultEngine<Self> {
        Ok(Self {
            expense: Expense::try_from(model)?,
            category: category.map(|c| CategoryRef {
                name: c.name,
                color: c.color,
            }),
        })
    }
}
