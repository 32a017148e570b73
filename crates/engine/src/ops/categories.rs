use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Category, CategoryUsage, EngineError, ResultEngine, SeedOutcome, budgets, categories,
    categories::{DEFAULT_CATEGORIES, DEFAULT_CATEGORY_COLOR},
    expenses,
    util::{category_key, normalize_category_name, normalize_color},
};

use super::{Engine, with_tx};

impl Engine {
    /// Lists the categories owned by `user_id`, oldest first.
    pub async fn list_categories(&self, user_id: Uuid) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            let models = self.category_models(&db_tx, user_id).await?;
            Ok(models.into_iter().map(Category::from).collect())
        })
    }

    /// Creates a category. `color` defaults to `#3B82F6`.
    ///
    /// The name is stored trimmed but otherwise as given. Names are compared
    /// ignoring case only: creating "food" when "Food" exists fails with
    /// `ExistingKey`, while "Food Dining" and "Food & Dining" can coexist.
    pub async fn create_category(
        &self,
        user_id: Uuid,
        name: &str,
        color: Option<&str>,
    ) -> ResultEngine<Category> {
        let (name, name_norm) = normalize_category_name(name)?;
        let color = normalize_color(color.unwrap_or(DEFAULT_CATEGORY_COLOR))?;

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            if self
                .find_category_by_key(&db_tx, user_id, &name_norm)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(name));
            }

            let model = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(user_id),
                name: ActiveValue::Set(name),
                name_norm: ActiveValue::Set(name_norm),
                color: ActiveValue::Set(color),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(Category::from(model))
        })
    }

    /// Creates the default categories unless the user already has some.
    ///
    /// Calling it again is harmless: when at least one category exists the
    /// current set is returned with `created == false` and nothing is written.
    pub async fn seed_default_categories(&self, user_id: Uuid) -> ResultEngine<SeedOutcome> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let existing = self.category_models(&db_tx, user_id).await?;
            if !existing.is_empty() {
                return Ok(SeedOutcome {
                    created: false,
                    categories: existing.into_iter().map(Category::from).collect(),
                });
            }

            let seeded = self.insert_default_categories(&db_tx, user_id).await?;
            Ok(SeedOutcome {
                created: true,
                categories: seeded,
            })
        })
    }

    /// Deletes a category together with its expenses and budgets.
    pub async fn delete_category(&self, user_id: Uuid, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, user_id, category_id).await?;

            let removed_expenses = expenses::Entity::delete_many()
                .filter(expenses::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;
            budgets::Entity::delete_many()
                .filter(budgets::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;

            tracing::info!(
                %user_id,
                %category_id,
                expenses = removed_expenses.rows_affected,
                "deleted category"
            );
            Ok(())
        })
    }

    /// Categories with the number of expenses filed under each.
    pub async fn category_usage(&self, user_id: Uuid) -> ResultEngine<Vec<CategoryUsage>> {
        with_tx!(self, |db_tx| {
            let models = self.category_models(&db_tx, user_id).await?;
            let mut usage = Vec::with_capacity(models.len());
            for model in models {
                let expense_count = expenses::Entity::find()
                    .filter(expenses::Column::UserId.eq(user_id))
                    .filter(expenses::Column::CategoryId.eq(model.id))
                    .count(&db_tx)
                    .await?;
                usage.push(CategoryUsage {
                    category: Category::from(model),
                    expense_count,
                });
            }
            Ok(usage)
        })
    }

    pub(super) async fn category_models(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<Vec<categories::Model>> {
        categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .order_by_asc(categories::Column::CreatedAt)
            .order_by_asc(categories::Column::Name)
            .all(db)
            .await
            .map_err(Into::into)
    }

    /// Inserts the seven defaults with a single statement.
    pub(super) async fn insert_default_categories(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<Vec<Category>> {
        let created_at = Utc::now();
        let seeded: Vec<Category> = DEFAULT_CATEGORIES
            .iter()
            .map(|(name, color)| Category {
                id: Uuid::new_v4(),
                user_id,
                name: (*name).to_string(),
                color: (*color).to_string(),
                created_at,
            })
            .collect();

        let models = seeded.iter().map(|category| categories::ActiveModel {
            id: ActiveValue::Set(category.id),
            user_id: ActiveValue::Set(user_id),
            name: ActiveValue::Set(category.name.clone()),
            name_norm: ActiveValue::Set(category_key(&category.name)),
            color: ActiveValue::Set(category.color.clone()),
            created_at: ActiveValue::Set(created_at),
        });
        categories::Entity::insert_many(models).exec(db).await?;

        tracing::info!(%user_id, count = seeded.len(), "seeded default categories");
        Ok(seeded)
    }
}
