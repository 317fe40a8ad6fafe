//! Behavioral specs for the `dubwatch` binary.
//!
//! Each spec runs the real binary against a throwaway state directory and,
//! where the service is needed, a local canned HTTP responder.

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/cli/mod.rs"]
mod cli;
