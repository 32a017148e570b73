//! Category registry per user.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

/// Color used when a category is created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

/// Categories every new user starts with, as `(name, color)`.
pub const DEFAULT_CATEGORIES: [(&str, &str); 7] = [
    ("Food & Dining", "#EF4444"),
    ("Transportation", "#F59E0B"),
    ("Entertainment", "#8B5CF6"),
    ("Shopping", "#EC4899"),
    ("Bills & Utilities", "#6B7280"),
    ("Healthcare", "#10B981"),
    ("Other", "#3B82F6"),
];

/// A named spending bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Number of expenses filed under a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryUsage {
    pub category: Category,
    pub expense_count: u64,
}

/// Result of [`Engine::seed_default_categories`](crate::Engine::seed_default_categories).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeedOutcome {
    /// `false` when the user already had categories and nothing was written.
    pub created: bool,
    pub categories: Vec<Category>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub name_norm: String,
    pub color: String,
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
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
    #[sea_orm(has_many = "super::budgets::Entity")]
    Budgets,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            color: model.color,
            created_at: model.created_at,
        }
    }
}
