//! brigade-core
//!
//! Capability-based order dispatch: workers register and deregister
//! dynamically, and each incoming order is routed to the first qualified
//! worker, falling back to an arbitrary active one.
//!
//! # Module layout
//! - **domain**: identifiers, event scope, classification
//! - **registry**: CapabilityRegistry (on-duty workers + capability index)
//! - **handler**: DispatchHandler (event classification + order relay)
//! - **ports**: Connection trait (the transport seam)
//! - **impls**: in-memory transport for development and tests
//! - **app**: ShiftBuilder / Shift (per-period wiring)

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod handler;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod registry;

pub use app::{Shift, ShiftBuilder};
pub use config::DispatchConfig;
pub use domain::{Capability, Event, EventKind, Scope, WorkerId};
pub use error::DispatchError;
pub use handler::DispatchHandler;
pub use ports::{Connection, Payload, WorkerHandle};
pub use registry::CapabilityRegistry;
