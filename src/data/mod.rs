//! Typed observations and the column schema applied at the loader boundary.

pub(crate) mod observation;
pub(crate) mod schema;
