pub mod aggregation;
pub mod dashboard;
pub mod handlers;
