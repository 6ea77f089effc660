// Database service module
// SQLite connection and schema creation

mod connection;
mod schema;

pub use connection::Database;
