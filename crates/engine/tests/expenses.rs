use sea_orm::{Database, DatabaseConnection};

use engine::{
    Category, Currency, Engine, EngineError, ErrorKind, ExpenseListFilter, ExpenseUpdate,
    NewExpense, NewUser, User, parse_date,
};
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

async fn category(engine: &Engine, user: &User, name: &str) -> Category {
    engine
        .list_categories(user.id)
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.name == name)
        .unwrap()
}

fn expense(category: &Category, amount_minor: i64, description: &str, date: &str) -> NewExpense {
    NewExpense {
        amount_minor,
        description: description.to_string(),
        date: parse_date(date).unwrap(),
        category_id: category.id,
        currency: None,
    }
}

#[tokio::test]
async fn create_uses_owner_currency_and_joins_category() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "alice@example.com").await;
    let food = category(&engine, &user, "Food & Dining").await;

    let view = engine
        .create_expense(user.id, expense(&food, 1250, "  Lunch  ", "2024-03-05"))
        .await
        .unwrap();
    assert_eq!(view.expense.currency, Currency::USD);
    assert_eq!(view.expense.description, "Lunch");
    assert_eq!(view.expense.user_id, user.id);
    let joined = view.category.as_ref().unwrap();
    assert_eq!(joined.name, "Food & Dining");
    assert_eq!(joined.color, "#EF4444");
    assert_eq!(
        view.display_line(),
        "2024-03-05: Lunch - 12.50 USD (Food & Dining)"
    );

    let mut eur = expense(&food, 900, "Croissant", "2024-03-06");
    eur.currency = Some(Currency::EUR);
    let view = engine.create_expense(user.id, eur).await.unwrap();
    assert_eq!(view.expense.currency, Currency::EUR);
}

#[tokio::test]
async fn create_rejects_invalid_input() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "alice@example.com").await;
    let food = category(&engine, &user, "Food & Dining").await;

    let err = engine
        .create_expense(user.id, expense(&food, 0, "Lunch", "2024-03-05"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let long = "x".repeat(201);
    let err = engine
        .create_expense(user.id, expense(&food, 100, &long, "2024-03-05"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert!(engine.list_expenses(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_with_foreign_category_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice@example.com").await;
    let bob = register(&engine, "bob@example.com").await;
    let bobs_food = category(&engine, &bob, "Food & Dining").await;

    let err = engine
        .create_expense(alice.id, expense(&bobs_food, 100, "Lunch", "2024-03-05"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(engine.list_expenses(alice.id).await.unwrap().is_empty());
    assert!(engine.list_expenses(bob.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_is_most_recent_first_and_scoped_to_owner() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice@example.com").await;
    let bob = register(&engine, "bob@example.com").await;
    let food = category(&engine, &alice, "Food & Dining").await;
    let bobs_food = category(&engine, &bob, "Food & Dining").await;

    for (description, date) in [("b", "2024-03-02"), ("c", "2024-03-03"), ("a", "2024-03-01")] {
        engine
            .create_expense(alice.id, expense(&food, 100, description, date))
            .await
            .unwrap();
    }
    engine
        .create_expense(bob.id, expense(&bobs_food, 100, "bob", "2024-03-04"))
        .await
        .unwrap();

    let descriptions: Vec<String> = engine
        .list_expenses(alice.id)
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.expense.description)
        .collect();
    assert_eq!(descriptions, vec!["c", "b", "a"]);
}

#[tokio::test]
async fn search_applies_every_filter() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "alice@example.com").await;
    let food = category(&engine, &user, "Food & Dining").await;
    let transport = category(&engine, &user, "Transportation").await;

    engine
        .create_expense(user.id, expense(&food, 1000, "Pizza night", "2024-02-28"))
        .await
        .unwrap();
    engine
        .create_expense(user.id, expense(&food, 2000, "Sushi", "2024-03-01"))
        .await
        .unwrap();
    engine
        .create_expense(user.id, expense(&transport, 300, "Bus ticket", "2024-03-15"))
        .await
        .unwrap();
    engine
        .create_expense(user.id, expense(&food, 800, "pizza slice", "2024-03-31"))
        .await
        .unwrap();

    let by_category = engine
        .search_expenses(
            user.id,
            &ExpenseListFilter {
                category_id: Some(transport.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].expense.description, "Bus ticket");

    let march = engine
        .search_expenses(
            user.id,
            &ExpenseListFilter {
                from: Some(parse_date("2024-03-01").unwrap()),
                to: Some(parse_date("2024-03-31").unwrap()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(march.len(), 3);

    let pizza = engine
        .search_expenses(
            user.id,
            &ExpenseListFilter {
                search: Some("PIZZA".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let descriptions: Vec<&str> = pizza.iter().map(|v| v.expense.description.as_str()).collect();
    assert_eq!(descriptions, vec!["pizza slice", "Pizza night"]);

    let latest = engine
        .search_expenses(
            user.id,
            &ExpenseListFilter {
                limit: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].expense.description, "pizza slice");

    let first_pizza = engine
        .search_expenses(
            user.id,
            &ExpenseListFilter {
                search: Some("pizza".to_string()),
                limit: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(first_pizza.len(), 1);
    assert_eq!(first_pizza[0].expense.description, "pizza slice");

    let err = engine
        .search_expenses(
            user.id,
            &ExpenseListFilter {
                from: Some(parse_date("2024-04-01").unwrap()),
                to: Some(parse_date("2024-03-01").unwrap()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidDate(_)));
}

#[tokio::test]
async fn search_text_is_literal_and_unicode_case_insensitive() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "alice@example.com").await;
    let food = category(&engine, &user, "Food & Dining").await;

    for description in ["Café ÉCLAIR", "100% juice", "tip_jar", "Tipsy bar"] {
        engine
            .create_expense(user.id, expense(&food, 500, description, "2024-03-05"))
            .await
            .unwrap();
    }

    let search = |text: &str| ExpenseListFilter {
        search: Some(text.to_string()),
        ..Default::default()
    };
    let found = |views: Vec<engine::ExpenseView>| -> Vec<String> {
        views.into_iter().map(|v| v.expense.description).collect()
    };

    let eclair = engine.search_expenses(user.id, &search("éclair")).await.unwrap();
    assert_eq!(found(eclair), vec!["Café ÉCLAIR"]);

    let percent = engine.search_expenses(user.id, &search("%")).await.unwrap();
    assert_eq!(found(percent), vec!["100% juice"]);

    let underscore = engine.search_expenses(user.id, &search("p_")).await.unwrap();
    assert_eq!(found(underscore), vec!["tip_jar"]);
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "alice@example.com").await;
    let food = category(&engine, &user, "Food & Dining").await;
    let shopping = category(&engine, &user, "Shopping").await;

    let created = engine
        .create_expense(user.id, expense(&food, 1250, "Lunch", "2024-03-05"))
        .await
        .unwrap();
    let id = created.expense.id;

    let updated = engine
        .update_expense(
            user.id,
            id,
            ExpenseUpdate {
                amount_minor: Some(1500),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.expense.amount_minor, 1500);
    assert_eq!(updated.expense.description, "Lunch");
    assert_eq!(updated.expense.date, created.expense.date);
    assert_eq!(updated.expense.category_id, food.id);
    assert_eq!(updated.expense.created_at, created.expense.created_at);

    let moved = engine
        .update_expense(
            user.id,
            id,
            ExpenseUpdate {
                category_id: Some(shopping.id),
                description: Some("Gift".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.expense.category_id, shopping.id);
    assert_eq!(moved.category.unwrap().name, "Shopping");
    assert_eq!(moved.expense.amount_minor, 1500);

    let unchanged = engine
        .update_expense(user.id, id, ExpenseUpdate::default())
        .await
        .unwrap();
    assert_eq!(unchanged.expense, engine.expense(user.id, id).await.unwrap().expense);
}

#[tokio::test]
async fn currency_only_update_keeps_the_amount_value() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "alice@example.com").await;
    let food = category(&engine, &user, "Food & Dining").await;
    let jpy = Currency::try_from("JPY").unwrap();

    let dinner = engine
        .create_expense(user.id, expense(&food, 5000, "Dinner", "2024-03-05"))
        .await
        .unwrap();
    let moved = engine
        .update_expense(
            user.id,
            dinner.expense.id,
            ExpenseUpdate {
                currency: Some(jpy),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.expense.currency, jpy);
    assert_eq!(moved.expense.amount_minor, 50);
    assert_eq!(moved.expense.money().to_string(), "50 JPY");

    let repriced = engine
        .update_expense(
            user.id,
            dinner.expense.id,
            ExpenseUpdate {
                amount_minor: Some(1234),
                currency: Some(Currency::USD),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(repriced.expense.money().to_string(), "12.34 USD");

    let err = engine
        .update_expense(
            user.id,
            dinner.expense.id,
            ExpenseUpdate {
                currency: Some(jpy),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
    let stored = engine.expense(user.id, dinner.expense.id).await.unwrap();
    assert_eq!(stored.expense, repriced.expense);
}

#[tokio::test]
async fn invalid_update_leaves_record_untouched() {
    let (engine, _db) = engine_with_db().await;
    let user = register(&engine, "alice@example.com").await;
    let food = category(&engine, &user, "Food & Dining").await;
    let created = engine
        .create_expense(user.id, expense(&food, 1250, "Lunch", "2024-03-05"))
        .await
        .unwrap();

    let err = engine
        .update_expense(
            user.id,
            created.expense.id,
            ExpenseUpdate {
                amount_minor: Some(-5),
                description: Some("Dinner".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let stored = engine.expense(user.id, created.expense.id).await.unwrap();
    assert_eq!(stored.expense, created.expense);
}

#[tokio::test]
async fn foreign_expense_cannot_be_read_changed_or_deleted() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice@example.com").await;
    let bob = register(&engine, "bob@example.com").await;
    let food = category(&engine, &alice, "Food & Dining").await;
    let created = engine
        .create_expense(alice.id, expense(&food, 1250, "Lunch", "2024-03-05"))
        .await
        .unwrap();
    let id = created.expense.id;

    let missing = EngineError::KeyNotFound("expense not exists".to_string());
    assert_eq!(engine.expense(bob.id, id).await.unwrap_err(), missing);
    assert_eq!(engine.delete_expense(bob.id, id).await.unwrap_err(), missing);
    let err = engine
        .update_expense(
            bob.id,
            id,
            ExpenseUpdate {
                amount_minor: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, missing);

    assert_eq!(engine.expense(alice.id, id).await.unwrap(), created);

    engine.delete_expense(alice.id, id).await.unwrap();
    assert_eq!(engine.expense(alice.id, id).await.unwrap_err(), missing);
}
