//! Frame rendering: scene + timestamp -> [`plan::FramePlan`] -> pixels.

pub(crate) mod backdrop;
pub(crate) mod backend;
pub(crate) mod cpu;
pub(crate) mod frame;
pub(crate) mod plan;
pub(crate) mod trees;
