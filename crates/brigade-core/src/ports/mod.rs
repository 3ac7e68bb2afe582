//! Ports - interfaces to external collaborators.
//!
//! The only external collaborator of the core is the transport, seen
//! through the `Connection` trait. Everything behind it (acceptance,
//! framing, event-loop integration) is out of scope.

pub mod connection;

pub use self::connection::{Connection, Payload, WorkerHandle};
