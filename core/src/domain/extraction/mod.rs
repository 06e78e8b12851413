pub mod entities;
pub mod helpers;
pub mod ports;
pub mod preprocessing;
pub mod services;

pub use entities::*;
pub use ports::*;
pub use services::*;
