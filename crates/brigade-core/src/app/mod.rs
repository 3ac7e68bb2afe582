//! App - construction and lifecycle of one operating period.

pub mod builder;

pub use self::builder::{Shift, ShiftBuilder};
