pub mod analysis;
pub mod common;
pub mod extraction;
pub mod ingredient;
pub mod quota;
pub mod scan;
