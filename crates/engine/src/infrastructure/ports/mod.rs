//! Port traits for infrastructure boundaries.
//!
//! The reference repository is the only abstraction the engine needs:
//! browsing use cases talk to it, the SQL adapter implements it.

mod error;
mod repos;
pub mod types;

pub use repos::*;

pub use types::{
    ColumnFilter, Relation, Row, DEFAULT_LIST_LIMIT, DEFAULT_RELATED_LIMIT, DEFAULT_SEARCH_LIMIT,
};

pub use error::RepoError;
