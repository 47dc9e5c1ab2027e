//! Library surface of the `sgrid` command line tool.

pub mod dataset;
pub mod logging;
pub mod render;
