//! Declarative frame description: document + time in, resolved scene out.

pub mod evaluator;
pub mod model;
pub mod svg;
