//! SQL database access: connection ownership, schema inspection, row decoding.

mod connection;
mod rows;
mod schema;

pub use connection::{ConnectionManager, ScopedConnection};
pub use rows::row_to_json;
pub use schema::SchemaInspector;
