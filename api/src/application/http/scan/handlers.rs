pub mod create_scan;
