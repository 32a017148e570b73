use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{CategorySuggester, EngineError, ResultEngine, resolve_suggestion};

use super::{Engine, with_tx};

impl Engine {
    /// Suggests one of the caller's categories for `description`.
    ///
    /// `suggester` is optional: without it, or when it fails, the answer
    /// comes from local matching alone. A failing collaborator is logged and
    /// never surfaces as an error. Returns `None` only when the user has no
    /// categories.
    pub async fn suggest_category<S: CategorySuggester>(
        &self,
        user_id: Uuid,
        description: &str,
        suggester: Option<&S>,
    ) -> ResultEngine<Option<String>> {
        let names: Vec<String> = with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let models = self.category_models(&db_tx, user_id).await?;
            Ok::<_, EngineError>(models.into_iter().map(|m| m.name).collect::<Vec<_>>())
        })?;

        let answer = match suggester {
            Some(suggester) => match suggester.suggest(description, &names).await {
                Ok(answer) => answer,
                Err(err) => {
                    tracing::warn!(%user_id, "category suggester unavailable: {err}");
                    None
                }
            },
            None => None,
        };

        let suggestion = resolve_suggestion(answer.as_deref(), description, &names);
        tracing::debug!(%user_id, ?answer, ?suggestion, "category suggestion");
        Ok(suggestion)
    }
}
