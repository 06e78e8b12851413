pub mod analysis;
pub mod health;
pub mod ingredient;
pub mod quota;
pub mod scan;
pub mod server;
