//! Reconcile loop and its collaborators.
//!
//! A [`Reconciler`] loads one declared object from a [`store::SpecStore`],
//! resolves the object's connection to a remote client, and either runs
//! the kind's convergence [`chain::Chain`] or, when deletion was
//! requested, its [`terminator::Terminator`]. Every pass ends by writing
//! the object's status back and returning a [`ReconcileOutcome`] telling
//! the driving scheduler when to run the next pass.

pub mod chain;
pub mod connection;
pub mod error;
pub mod handlers;
pub mod reconciler;
pub mod store;
pub mod terminator;

pub use chain::{Chain, Handler};
pub use connection::{ConnectionConfig, ConnectionRegistry};
pub use error::{ReconcileError, ReconcileResult};
pub use reconciler::{ReconcileOutcome, Reconciler, ReconcilerConfig};
pub use store::{InMemoryStore, SpecStore};
pub use terminator::Terminator;
