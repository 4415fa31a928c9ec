pub mod commands;
pub mod eligibility;
pub mod model;
pub mod rules;
pub mod settlement;
