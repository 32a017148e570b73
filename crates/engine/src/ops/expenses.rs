use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Currency, EngineError, ExpenseListFilter, ExpenseUpdate, ExpenseView, Money, NewExpense,
    ResultEngine, categories, expenses,
    util::{normalize_description, validate_positive_amount},
};

use super::{Engine, with_tx};

fn validate_list_filter(filter: &ExpenseListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from > to
    {
        return Err(EngineError::InvalidDate(
            "invalid range: from must be <= to".to_string(),
        ));
    }
    if filter.limit == Some(0) {
        return Err(EngineError::InvalidAmount(
            "limit must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Records a new expense.
    ///
    /// The category must belong to `user_id`. When `currency` is omitted the
    /// owner's default currency is used.
    pub async fn create_expense(
        &self,
        user_id: Uuid,
        new_expense: NewExpense,
    ) -> ResultEngine<ExpenseView> {
        validate_positive_amount(new_expense.amount_minor)?;
        let description = normalize_description(&new_expense.description)?;

        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let category = self
                .require_category(&db_tx, user_id, new_expense.category_id)
                .await?;
            let currency = match new_expense.currency {
                Some(currency) => currency,
                None => Currency::try_from(user.default_currency.as_str())?,
            };

            let model = expenses::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(user_id),
                category_id: ActiveValue::Set(category.id),
                amount_minor: ActiveValue::Set(new_expense.amount_minor),
                currency: ActiveValue::Set(currency.code().to_string()),
                description: ActiveValue::Set(description),
                date: ActiveValue::Set(new_expense.date),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            ExpenseView::try_from((model, Some(category)))
        })
    }

    /// All expenses of `user_id`, most recent date first.
    pub async fn list_expenses(&self, user_id: Uuid) -> ResultEngine<Vec<ExpenseView>> {
        self.search_expenses(user_id, &ExpenseListFilter::default())
            .await
    }

    /// Expenses of `user_id` matching `filter`, most recent date first.
    pub async fn search_expenses(
        &self,
        user_id: Uuid,
        filter: &ExpenseListFilter,
    ) -> ResultEngine<Vec<ExpenseView>> {
        validate_list_filter(filter)?;
        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        with_tx!(self, |db_tx| {
            let mut query = expenses::Entity::find().filter(expenses::Column::UserId.eq(user_id));
            if let Some(category_id) = filter.category_id {
                query = query.filter(expenses::Column::CategoryId.eq(category_id));
            }
            if let Some(from) = filter.from {
                query = query.filter(expenses::Column::Date.gte(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(expenses::Column::Date.lte(to));
            }
            // Text matching happens below, so the limit can only go to the
            // database when there is no search term.
            if let (Some(limit), None) = (filter.limit, &needle) {
                query = query.limit(limit);
            }

            let views = query
                .order_by_desc(expenses::Column::Date)
                .order_by_desc(expenses::Column::CreatedAt)
                .find_also_related(categories::Entity)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(ExpenseView::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            Ok(match &needle {
                Some(needle) => {
                    let limit = filter
                        .limit
                        .and_then(|limit| usize::try_from(limit).ok())
                        .unwrap_or(usize::MAX);
                    views
                        .into_iter()
                        .filter(|view| view.expense.description.to_lowercase().contains(needle))
                        .take(limit)
                        .collect()
                }
                None => views,
            })
        })
    }

    /// A single expense of `user_id`.
    pub async fn expense(&self, user_id: Uuid, expense_id: Uuid) -> ResultEngine<ExpenseView> {
        with_tx!(self, |db_tx| {
            let model = self.require_expense(&db_tx, user_id, expense_id).await?;
            self.expense_view(&db_tx, model).await
        })
    }

    /// Overwrites the supplied fields of an expense; the others keep their value.
    ///
    /// Each supplied field is validated like on creation. Changing only the
    /// currency keeps the nominal amount (`50.00 USD` becomes `50 JPY`) and
    /// fails with `InvalidAmount` when the new currency cannot hold it exactly.
    pub async fn update_expense(
        &self,
        user_id: Uuid,
        expense_id: Uuid,
        update: ExpenseUpdate,
    ) -> ResultEngine<ExpenseView> {
        if let Some(amount_minor) = update.amount_minor {
            validate_positive_amount(amount_minor)?;
        }
        let description = update
            .description
            .as_deref()
            .map(normalize_description)
            .transpose()?;

        with_tx!(self, |db_tx| {
            let current = self.require_expense(&db_tx, user_id, expense_id).await?;
            if update.is_empty() {
                return self.expense_view(&db_tx, current).await;
            }
            if let Some(category_id) = update.category_id {
                self.require_category(&db_tx, user_id, category_id).await?;
            }
            let amount_minor = match (update.amount_minor, update.currency) {
                (None, Some(currency)) => {
                    let stored = Currency::try_from(current.currency.as_str())?;
                    let rescaled = Money::new(current.amount_minor, stored).rescale(currency)?;
                    validate_positive_amount(rescaled.amount_minor)?;
                    Some(rescaled.amount_minor)
                }
                (amount_minor, _) => amount_minor,
            };

            let mut active = expenses::ActiveModel {
                id: ActiveValue::Unchanged(current.id),
                ..Default::default()
            };
            if let Some(amount_minor) = amount_minor {
                active.amount_minor = ActiveValue::Set(amount_minor);
            }
            if let Some(description) = description {
                active.description = ActiveValue::Set(description);
            }
            if let Some(date) = update.date {
                active.date = ActiveValue::Set(date);
            }
            if let Some(category_id) = update.category_id {
                active.category_id = ActiveValue::Set(category_id);
            }
            if let Some(currency) = update.currency {
                active.currency = ActiveValue::Set(currency.code().to_string());
            }
            let model = active.update(&db_tx).await?;

            self.expense_view(&db_tx, model).await
        })
    }

    /// Permanently removes an expense of `user_id`.
    pub async fn delete_expense(&self, user_id: Uuid, expense_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_expense(&db_tx, user_id, expense_id).await?;
            expenses::Entity::delete_by_id(expense_id)
                .exec(&db_tx)
                .await?;
            tracing::debug!(%user_id, %expense_id, "deleted expense");
            Ok(())
        })
    }

    async fn expense_view(
        &self,
        db: &DatabaseTransaction,
        model: expenses::Model,
    ) -> ResultEngine<ExpenseView> {
        let category = model.find_related(categories::Entity).one(db).await?;
        ExpenseView::try_from((model, category))
    }
}
