//! Domain services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! The registry owns the document and every live session; route handlers
//! only translate between sockets and registry commands. Credential checks
//! sit in front of the upgrade.

pub mod auth;
pub mod registry;
