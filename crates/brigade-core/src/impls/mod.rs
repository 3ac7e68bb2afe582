//! Implementations of the ports (in-memory, for development and tests).

pub mod inmem_connection;

pub use inmem_connection::InMemoryConnection;
