pub mod association;
pub mod dataset;
