use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Budget, BudgetProgress, Currency, EngineError, Money, NewBudget, ResultEngine, budgets,
    categories, expenses,
    money::aggregate_to_minor,
    util::{month_bounds, validate_positive_amount},
};

use super::{Engine, with_tx};

const YEAR_MIN: i32 = 1970;
const YEAR_MAX: i32 = 9999;

fn validate_period(year: i32, month: u32) -> ResultEngine<()> {
    if !(1..=12).contains(&month) {
        return Err(EngineError::InvalidPeriod(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }
    if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
        return Err(EngineError::InvalidPeriod(format!(
            "year must be between {YEAR_MIN} and {YEAR_MAX}, got {year}"
        )));
    }
    Ok(())
}

impl Engine {
    /// Sets a spending limit for one category in one month.
    ///
    /// At most one budget exists per `(category, month, year)`; a second one
    /// fails with `ExistingKey`. Use [`Engine::update_budget_amount`] to change
    /// the limit instead.
    pub async fn create_budget(&self, user_id: Uuid, new_budget: NewBudget) -> ResultEngine<Budget> {
        validate_positive_amount(new_budget.amount_minor)?;
        validate_period(new_budget.year, new_budget.month)?;
        let month = i32::try_from(new_budget.month)
            .map_err(|_| EngineError::InvalidPeriod(new_budget.month.to_string()))?;

        with_tx!(self, |db_tx| {
            let category = self
                .require_category(&db_tx, user_id, new_budget.category_id)
                .await?;

            let duplicate = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id))
                .filter(budgets::Column::CategoryId.eq(category.id))
                .filter(budgets::Column::Month.eq(month))
                .filter(budgets::Column::Year.eq(new_budget.year))
                .one(&db_tx)
                .await?;
            if duplicate.is_some() {
                return Err(EngineError::ExistingKey(format!(
                    "budget for '{}' in {}-{:02}",
                    category.name, new_budget.year, new_budget.month
                )));
            }

            let model = budgets::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(user_id),
                category_id: ActiveValue::Set(category.id),
                amount_minor: ActiveValue::Set(new_budget.amount_minor),
                month: ActiveValue::Set(month),
                year: ActiveValue::Set(new_budget.year),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(Budget::from(model))
        })
    }

    pub async fn update_budget_amount(
        &self,
        user_id: Uuid,
        budget_id: Uuid,
        amount_minor: i64,
    ) -> ResultEngine<Budget> {
        validate_positive_amount(amount_minor)?;
        with_tx!(self, |db_tx| {
            let current = self.require_budget(&db_tx, user_id, budget_id).await?;
            let active = budgets::ActiveModel {
                id: ActiveValue::Unchanged(current.id),
                amount_minor: ActiveValue::Set(amount_minor),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            Ok(Budget::from(model))
        })
    }

    /// Budgets of `user_id`, optionally restricted to one `(year, month)`.
    ///
    /// Newest period first.
    pub async fn list_budgets(
        &self,
        user_id: Uuid,
        period: Option<(i32, u32)>,
    ) -> ResultEngine<Vec<Budget>> {
        let period = match period {
            Some((year, month)) => {
                validate_period(year, month)?;
                let month = i32::try_from(month)
                    .map_err(|_| EngineError::InvalidPeriod(month.to_string()))?;
                Some((year, month))
            }
            None => None,
        };

        with_tx!(self, |db_tx| {
            let mut query = budgets::Entity::find().filter(budgets::Column::UserId.eq(user_id));
            if let Some((year, month)) = period {
                query = query
                    .filter(budgets::Column::Year.eq(year))
                    .filter(budgets::Column::Month.eq(month));
            }
            let models = query
                .order_by_desc(budgets::Column::Year)
                .order_by_desc(budgets::Column::Month)
                .order_by_asc(budgets::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Budget::from).collect())
        })
    }

    pub async fn delete_budget(&self, user_id: Uuid, budget_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, user_id, budget_id).await?;
            budgets::Entity::delete_by_id(budget_id).exec(&db_tx).await?;
            tracing::debug!(%user_id, %budget_id, "deleted budget");
            Ok(())
        })
    }

    /// Spending against every budget set for `(year, month)`.
    ///
    /// Spent amounts are the sum of the category's expenses dated inside the
    /// month. Expenses are added by nominal value whatever their currency and
    /// the sum is given in minor units of the user's default currency, the
    /// unit budget limits are set in.
    pub async fn budget_progress(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> ResultEngine<Vec<BudgetProgress>> {
        validate_period(year, month)?;
        let (start, end) = month_bounds(year, month)?;
        let planned = self.list_budgets(user_id, Some((year, month))).await?;

        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let budget_currency = Currency::try_from(user.default_currency.as_str())?;
            let mut progress = Vec::with_capacity(planned.len());
            for budget in planned {
                let category = categories::Entity::find_by_id(budget.category_id)
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;

                let mut spent: i128 = 0;
                for expense in expenses::Entity::find()
                    .filter(expenses::Column::UserId.eq(user_id))
                    .filter(expenses::Column::CategoryId.eq(budget.category_id))
                    .filter(expenses::Column::Date.gte(start))
                    .filter(expenses::Column::Date.lt(end))
                    .all(&db_tx)
                    .await?
                {
                    let currency = Currency::try_from(expense.currency.as_str())?;
                    spent += Money::new(expense.amount_minor, currency).aggregate_units();
                }
                let spent_minor = aggregate_to_minor(spent, budget_currency)?;

                let remaining_minor = budget
                    .amount_minor
                    .checked_sub(spent_minor)
                    .ok_or_else(|| EngineError::InvalidAmount("total out of range".to_string()))?;
                progress.push(BudgetProgress {
                    category_name: category.name,
                    spent_minor,
                    remaining_minor,
                    over_budget: remaining_minor < 0,
                    budget,
                });
            }
            Ok(progress)
        })
    }
}
