//! `stackassign-auth` — actor model and session boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. How a session
//! token is minted (cookies, password login) is an external collaborator's
//! concern; this crate only models the resolved identity an operation runs as.

pub mod actor;
pub mod roles;
pub mod session;

pub use actor::Actor;
pub use roles::Role;
pub use session::{InMemorySessionStore, SessionError, SessionToken, SessionValidator};
