//! Timeline event model shared by the authoring surface and the compiler stages.

/// Event variants and still frames.
pub mod event;
