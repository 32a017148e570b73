//! Monthly spending limits per category.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount_minor: i64,
    /// 1-12.
    pub month: u32,
    pub year: i32,
    pub created_at: DateTime<Utc>,
}

/// Input for [`Engine::create_budget`](crate::Engine::create_budget).
#[derive(Clone, Debug)]
pub struct NewBudget {
    pub category_id: Uuid,
    pub amount_minor: i64,
    pub month: u32,
    pub year: i32,
}

/// Spending of one budgeted category against its limit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BudgetProgress {
    pub budget: Budget,
    pub category_name: String,
    /// Minor units of the owner's default currency.
    pub spent_minor: i64,
    /// `limit - spent`; negative once the budget is exceeded.
    pub remaining_minor: i64,
    pub over_budget: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub amount_minor: i64,
    pub month: i32,
    pub year: i32,
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

impl From<Model> for Budget {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            category_id: model.category_id,
            amount_minor: model.amount_minor,
            month: u32::try_from(model.month).unwrap_or_default(),
            year: model.year,
            created_at: model.created_at,
        }
    }
}
