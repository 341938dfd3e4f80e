pub mod classifier;
pub mod dto;
pub mod task_store;
