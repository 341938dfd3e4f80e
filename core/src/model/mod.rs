pub mod snapshot;
pub mod task;
pub mod view;
