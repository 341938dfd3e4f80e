pub mod file;
pub mod memory;
pub mod record;
pub mod traits;

// Re-export
pub use file::FileStateRepository;
pub use memory::MemoryStateRepository;
pub use traits::StateRepository;
