//! Library side of the `flo` binary: argument types, commands and output
//! file naming, kept here so they can be tested without spawning a process.

pub mod cli;
pub mod commands;
pub mod project;
