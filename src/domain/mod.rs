// Domain layer - Core clip types and rules

pub mod model;
pub mod rules;
