//! Read-only aggregations for the dashboard and the assistant context.
//!
//! Totals add up expenses of any currency by nominal value: each amount is
//! first brought to [`AGGREGATE_SCALE`](crate::AGGREGATE_SCALE) decimals of
//! its major unit, so `1.00 USD` plus `100 JPY` totals `101.0000`, reported
//! as `1_010_000`.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use sea_orm::{QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    ExpenseView, ResultEngine, categories, expenses, money::aggregate_total, util::month_bounds,
};

use super::{Engine, with_tx};

const RECENT_LIMIT: u64 = 5;
const TOP_CATEGORIES: usize = 5;

/// Spending overview for the month containing a reference date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    /// The five most recently dated expenses, any month.
    pub recent_expenses: Vec<ExpenseView>,
    /// Every expense dated in the reference month.
    pub monthly_expenses: Vec<ExpenseView>,
    /// Sum of `monthly_expenses` at `AGGREGATE_SCALE`.
    pub total_this_month: i64,
    /// Category name to monthly sum, at `AGGREGATE_SCALE`. Expenses without
    /// a category are left out here but still counted in `total_this_month`.
    pub category_breakdown: BTreeMap<String, i64>,
    pub expense_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    /// At `AGGREGATE_SCALE`.
    pub total: i64,
}

/// All-time figures handed to the natural-language assistant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FinancialContext {
    /// At `AGGREGATE_SCALE`.
    pub total_spent: i64,
    pub expense_count: usize,
    /// At most five, largest first.
    pub top_categories: Vec<CategoryTotal>,
    /// At most five lines, most recent date first.
    pub recent_expenses: Vec<String>,
}

fn aggregate(view: &ExpenseView) -> i128 {
    view.expense.money().aggregate_units()
}

fn sum_total(expenses: &[ExpenseView]) -> ResultEngine<i64> {
    aggregate_total(expenses.iter().map(aggregate).sum())
}

fn category_breakdown(expenses: &[ExpenseView]) -> ResultEngine<BTreeMap<String, i64>> {
    let mut totals: BTreeMap<String, i128> = BTreeMap::new();
    for view in expenses {
        if let Some(category) = &view.category {
            *totals.entry(category.name.clone()).or_insert(0) += aggregate(view);
        }
    }
    totals
        .into_iter()
        .map(|(name, total)| Ok((name, aggregate_total(total)?)))
        .collect()
}

/// Totals per category, largest first.
///
/// Ties keep the order in which each category first appears in `expenses`.
fn top_categories(expenses: &[ExpenseView], limit: usize) -> ResultEngine<Vec<CategoryTotal>> {
    let mut totals: Vec<(String, i128)> = Vec::new();
    for view in expenses {
        let Some(category) = &view.category else {
            continue;
        };
        match totals.iter_mut().find(|(name, _)| *name == category.name) {
            Some((_, total)) => *total += aggregate(view),
            None => totals.push((category.name.clone(), aggregate(view))),
        }
    }
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
        .into_iter()
        .take(limit)
        .map(|(name, total)| {
            Ok(CategoryTotal {
                name,
                total: aggregate_total(total)?,
            })
        })
        .collect()
}

impl Engine {
    /// Builds the dashboard for the calendar month of `reference_date`.
    pub async fn dashboard_summary(
        &self,
        user_id: Uuid,
        reference_date: NaiveDate,
    ) -> ResultEngine<DashboardSummary> {
        let (start, end) = month_bounds(reference_date.year(), reference_date.month())?;

        with_tx!(self, |db_tx| {
            let recent = expenses::Entity::find()
                .filter(expenses::Column::UserId.eq(user_id))
                .order_by_desc(expenses::Column::Date)
                .order_by_desc(expenses::Column::CreatedAt)
                .limit(RECENT_LIMIT)
                .find_also_related(categories::Entity)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(ExpenseView::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let monthly = expenses::Entity::find()
                .filter(expenses::Column::UserId.eq(user_id))
                .filter(expenses::Column::Date.gte(start))
                .filter(expenses::Column::Date.lt(end))
                .order_by_desc(expenses::Column::Date)
                .order_by_desc(expenses::Column::CreatedAt)
                .find_also_related(categories::Entity)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(ExpenseView::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            tracing::debug!(
                %user_id,
                %reference_date,
                recent = recent.len(),
                monthly = monthly.len(),
                "dashboard summary"
            );

            Ok(DashboardSummary {
                total_this_month: sum_total(&monthly)?,
                category_breakdown: category_breakdown(&monthly)?,
                expense_count: monthly.len(),
                recent_expenses: recent,
                monthly_expenses: monthly,
            })
        })
    }

    /// All-time aggregation over every expense of `user_id`.
    pub async fn financial_context(&self, user_id: Uuid) -> ResultEngine<FinancialContext> {
        with_tx!(self, |db_tx| {
            let mut all = expenses::Entity::find()
                .filter(expenses::Column::UserId.eq(user_id))
                .order_by_asc(expenses::Column::CreatedAt)
                .order_by_asc(expenses::Column::Id)
                .find_also_related(categories::Entity)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(ExpenseView::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            let top = top_categories(&all, TOP_CATEGORIES)?;
            let total_spent = sum_total(&all)?;
            let expense_count = all.len();

            all.sort_by(|a, b| {
                b.expense
                    .date
                    .cmp(&a.expense.date)
                    .then(b.expense.created_at.cmp(&a.expense.created_at))
            });
            let recent_expenses = all
                .iter()
                .take(RECENT_LIMIT as usize)
                .map(ExpenseView::display_line)
                .collect();

            Ok(FinancialContext {
                total_spent,
                expense_count,
                top_categories: top,
                recent_expenses,
            })
        })
    }
}
