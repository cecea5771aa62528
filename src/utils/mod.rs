//! Path helpers.

pub(crate) mod path;
