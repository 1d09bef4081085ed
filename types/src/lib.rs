//! Common types used throughout winfinity.

pub mod arcade;
