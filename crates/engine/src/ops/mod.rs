use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod access;
mod budgets;
mod categories;
mod dashboard;
mod expenses;
mod suggestions;
mod users;

pub use dashboard::{CategoryTotal, DashboardSummary, FinancialContext};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of every operation.
///
/// The engine holds no state besides the database handle: each call reads
/// the current snapshot and commits at most one transaction. Every method
/// takes the caller's `user_id` as supplied by the authentication layer and
/// only ever touches rows owned by that user.
#[derive(Debug, Clone)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
