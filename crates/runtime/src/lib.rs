pub mod periodic;
pub mod task_slot;

pub use periodic::*;
pub use task_slot::*;
