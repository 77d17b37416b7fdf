//! Database access for multiplayer game records.

mod error;
mod models;
mod repository;
pub mod sample;

pub use error::DbError;
pub use models::{DateRange, DimensionSource, GameRow, StatsDimension, ValueCount};
pub use repository::{AnyConnection, GameRepository};
