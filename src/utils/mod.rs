//! Utility functions and types

pub mod data_loader;

pub use data_loader::{column_to_array, columns_to_array, read_table, write_table};
