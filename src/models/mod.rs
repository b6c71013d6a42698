pub mod inventory;
pub mod pharmacy;
pub mod search;

pub use inventory::*;
pub use pharmacy::*;
pub use search::*;
