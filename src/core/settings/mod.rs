pub mod memory;
pub mod model;
pub mod store;

pub use memory::MemoryAdvice;
pub use model::{Settings, WindowGeometry};
pub use store::{load, save, try_save};
