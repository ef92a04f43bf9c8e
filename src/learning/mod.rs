pub mod adapter;
pub mod analytics;
pub mod reconciler;
