use sea_orm::{Database, DatabaseConnection};

use engine::{CategorySuggester, Engine, NewUser, SuggestError, User};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn register(engine: &Engine, email: &str) -> User {
    engine
        .register_user(NewUser {
            email: email.to_string(),
            password: "correct horse".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            default_currency: None,
        })
        .await
        .unwrap()
}

struct Answer(&'static str);

impl CategorySuggester for Answer {
    async fn suggest(
        &self,
        _description: &str,
        _categories: &[String],
    ) -> Result<Option<String>, SuggestError> {
        Ok(Some(self.0.to_string()))
    }
}

struct Offline;

impl CategorySuggester for Offline {
    async fn suggest(
        &self,
        _description: &str,
        _categories: &[String],
    ) -> Result<Option<String>, SuggestError> {
        Err(SuggestError("connection refused".to_string()))
    }
}

#[tokio::test]
async fn known_answer_is_returned() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "alice@example.com").await;

    let suggestion = engine
        .suggest_category(user.id, "Uber to the airport", Some(&Answer("transportation")))
        .await
        .unwrap();
    assert_eq!(suggestion.as_deref(), Some("Transportation"));
}

#[tokio::test]
async fn unknown_answer_falls_back_to_other() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "alice@example.com").await;

    let suggestion = engine
        .suggest_category(user.id, "weekly shop", Some(&Answer("Groceries")))
        .await
        .unwrap();
    assert_eq!(suggestion.as_deref(), Some("Other"));
}

#[tokio::test]
async fn description_words_back_up_an_unknown_answer() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "alice@example.com").await;

    let suggestion = engine
        .suggest_category(user.id, "Shopping for groceries", Some(&Answer("Groceries")))
        .await
        .unwrap();
    assert_eq!(suggestion.as_deref(), Some("Shopping"));

    let suggestion = engine
        .suggest_category(user.id, "Shopping spree", Some(&Answer("entertainment")))
        .await
        .unwrap();
    assert_eq!(suggestion.as_deref(), Some("Entertainment"));
}

#[tokio::test]
async fn failing_or_missing_suggester_uses_local_matching() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "alice@example.com").await;

    let suggestion = engine
        .suggest_category(user.id, "Healthcare checkup", Some(&Offline))
        .await
        .unwrap();
    assert_eq!(suggestion.as_deref(), Some("Healthcare"));

    let suggestion = engine
        .suggest_category::<Offline>(user.id, "something else", None)
        .await
        .unwrap();
    assert_eq!(suggestion.as_deref(), Some("Other"));
}

#[tokio::test]
async fn no_categories_means_no_suggestion() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "alice@example.com").await;
    for category in engine.list_categories(user.id).await.unwrap() {
        engine.delete_category(user.id, category.id).await.unwrap();
    }

    let suggestion = engine
        .suggest_category(user.id, "anything", Some(&Answer("Other")))
        .await
        .unwrap();
    assert_eq!(suggestion, None);
}
