//! Declared-object model for the idsync convergence engine.
//!
//! A declared object is the user-authored desired-state record for one
//! remote IAM resource. This crate defines the object envelope (status,
//! deletion protocol, finalizer) and one spec type per resource kind.
//! It carries no I/O; the client, sync, and controller crates build on it.

pub mod kinds;
pub mod object;

pub use object::{DeclaredObject, ObjectKey, ObjectStatus, ResourceSpec, STATUS_OK};
