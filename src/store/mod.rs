//! Persistence backends for users and tasks.
//!
//! Both backends implement [`UserStore`](crate::auth::repo::UserStore) and
//! [`TaskStore`](crate::tasks::repo::TaskStore); handlers only ever see the traits.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return Self::DuplicateEmail;
            }
        }
        Self::Internal(e.into())
    }
}

/// Escapes `%`, `_` and `\` so user input matches literally inside LIKE patterns.
pub(crate) fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
