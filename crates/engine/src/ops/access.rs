use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, budgets, categories, expenses, users};

use super::Engine;

/// Generates a `require_*` lookup that only matches rows owned by `user_id`.
///
/// A row owned by somebody else is reported exactly like a missing one.
macro_rules! impl_owned_lookup {
    ($require_fn:ident, $entity:path, $model:path, $user_col:expr, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            user_id: Uuid,
            target_id: Uuid,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(target_id)
                .filter($user_col.eq(user_id))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_owned_lookup!(
        require_category,
        categories::Entity,
        categories::Model,
        categories::Column::UserId,
        "category not exists"
    );

    impl_owned_lookup!(
        require_expense,
        expenses::Entity,
        expenses::Model,
        expenses::Column::UserId,
        "expense not exists"
    );

    impl_owned_lookup!(
        require_budget,
        budgets::Entity,
        budgets::Model,
        budgets::Column::UserId,
        "budget not exists"
    );

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub(super) async fn find_user_by_email(
        &self,
        db: &DatabaseTransaction,
        email: &str,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await
            .map_err(Into::into)
    }

    /// Category of `user_id` whose lowercased name equals `name_norm`.
    pub(super) async fn find_category_by_key(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        name_norm: &str,
    ) -> ResultEngine<Option<categories::Model>> {
        categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .filter(categories::Column::NameNorm.eq(name_norm))
            .one(db)
            .await
            .map_err(Into::into)
    }
}
