//! Editor core: the document state, its reducer, and pointer/keyboard interaction.
//!
//! All mutation goes through [`action::Action`]; the controller only translates input into
//! actions.

pub mod action;
pub mod controller;
pub mod gesture;
pub mod hit;
pub mod state;
