//! Query functions, one module per table group.

pub mod items;
pub mod specs;
