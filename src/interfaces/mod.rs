//! Batch interfaces used by the command line tool.

pub mod csv;
