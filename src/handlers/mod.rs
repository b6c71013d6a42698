pub mod health;
pub mod pharmacy;
pub mod search;
