//! Specs for the `dubwatch` command line.

mod help;
mod saved_job;
mod service;
