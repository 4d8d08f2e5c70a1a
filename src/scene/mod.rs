//! Keyed visual elements and their enter/update/exit lifecycle.

pub(crate) mod attrs;
pub(crate) mod element;
pub(crate) mod pool;
pub(crate) mod reconcile;
