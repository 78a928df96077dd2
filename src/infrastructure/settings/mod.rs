//! Settings store adapters

pub mod file;
pub mod memory;

pub use file::TomlFileSettingsStore;
pub use memory::MemorySettingsStore;
