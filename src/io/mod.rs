//! File output for statements.

pub mod export;
