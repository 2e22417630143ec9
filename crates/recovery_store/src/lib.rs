//! Durable storage for the recovery coach.

pub mod persistence;
pub mod sqlite;

pub use persistence::StatePersistence;
pub use sqlite::SqliteStore;

#[cfg(test)]
mod tests;
