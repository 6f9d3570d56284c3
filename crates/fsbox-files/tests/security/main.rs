//! Security tests for sandbox confinement.
//!
//! Every test asserts two things: the request is rejected with a
//! `path_violation`, and nothing outside (or inside) the sandbox changed.

mod path_traversal;
mod symlink_escape;
