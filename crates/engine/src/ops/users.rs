use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, NewUser, ResultEngine, User, budgets, categories, expenses,
    password::{hash_password, verify_password},
    users,
    util::{PERSON_NAME_MAX, normalize_email, normalize_text, validate_password},
};

use super::{Engine, with_tx};

impl Engine {
    /// Registers a user and seeds the default categories.
    ///
    /// The user row and the seven default categories are written in the same
    /// transaction: either all of them exist afterwards or none do.
    pub async fn register_user(&self, new_user: NewUser) -> ResultEngine<User> {
        let email = normalize_email(&new_user.email)?;
        validate_password(&new_user.password)?;
        let first_name = normalize_text(&new_user.first_name, "first name", PERSON_NAME_MAX)?;
        let last_name = normalize_text(&new_user.last_name, "last name", PERSON_NAME_MAX)?;
        let currency = new_user.default_currency.unwrap_or_default();
        let password_hash = hash_password(&new_user.password)?;

        let user = with_tx!(self, |db_tx| {
            if self.find_user_by_email(&db_tx, &email).await?.is_some() {
                return Err(EngineError::ExistingKey(email));
            }

            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                email: ActiveValue::Set(email.clone()),
                password_hash: ActiveValue::Set(password_hash),
                first_name: ActiveValue::Set(first_name),
                last_name: ActiveValue::Set(last_name),
                default_currency: ActiveValue::Set(currency.code().to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            self.insert_default_categories(&db_tx, model.id).await?;
            User::try_from(model)
        })?;

        tracing::info!(user_id = %user.id, "registered user");
        Ok(user)
    }

    /// Checks an email/password pair.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<User> {
        let email = email.trim().to_lowercase();
        with_tx!(self, |db_tx| {
            let model = self
                .find_user_by_email(&db_tx, &email)
                .await?
                .ok_or(EngineError::InvalidCredentials)?;
            if !verify_password(password, &model.password_hash)? {
                return Err(EngineError::InvalidCredentials);
            }
            User::try_from(model)
        })
    }

    /// Profile of `user_id`.
    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            User::try_from(model)
        })
    }

    pub async fn user_by_email(&self, email: &str) -> ResultEngine<User> {
        let email = email.trim().to_lowercase();
        with_tx!(self, |db_tx| {
            let model = self
                .find_user_by_email(&db_tx, &email)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(email.clone()))?;
            User::try_from(model)
        })
    }

    /// Replaces the stored password hash of the user registered with `email`.
    pub async fn reset_password(&self, email: &str, new_password: &str) -> ResultEngine<()> {
        let email = email.trim().to_lowercase();
        validate_password(new_password)?;
        let password_hash = hash_password(new_password)?;

        with_tx!(self, |db_tx| {
            let model = self
                .find_user_by_email(&db_tx, &email)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(email.clone()))?;
            let active = users::ActiveModel {
                id: ActiveValue::Set(model.id),
                password_hash: ActiveValue::Set(password_hash),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            tracing::info!(user_id = %model.id, "password reset");
            Ok(())
        })
    }

    /// Deletes a user together with every budget, expense and category they own.
    pub async fn delete_user(&self, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let budgets = budgets::Entity::delete_many()
                .filter(budgets::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            let expenses = expenses::Entity::delete_many()
                .filter(expenses::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            let categories = categories::Entity::delete_many()
                .filter(categories::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(user_id).exec(&db_tx).await?;

            tracing::info!(
                %user_id,
                budgets = budgets.rows_affected,
                expenses = expenses.rows_affected,
                categories = categories.rows_affected,
                "deleted user"
            );
            Ok(())
        })
    }
}
