pub mod entities;
pub mod helpers;
pub mod offline;
pub mod parsing;
pub mod ports;
pub mod prompts;
pub mod schema;
pub mod services;

pub use entities::*;
pub use offline::OfflineRiskScorer;
pub use ports::*;
pub use services::*;
