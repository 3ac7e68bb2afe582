//! Domain model (identifiers, event scope, classification).

pub mod event;
pub mod ids;

pub use event::{Event, EventKind, Scope, Speciality, TYPE_OFF_DUTY, TYPE_ON_DUTY, TYPE_ORDER};
pub use ids::{Capability, WorkerId};
