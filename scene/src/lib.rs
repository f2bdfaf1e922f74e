//! Shared scene model, reducer, and JSON wire codec for playhouse.
//!
//! This crate owns everything both ends of the websocket must agree on: the
//! shape of the shared [`model::Document`], the [`action::Action`] protocol
//! that mutates it, and the [`codec`] that moves both over the wire. It does
//! no I/O. The server folds actions into its authoritative copy and every
//! client folds the same broadcast actions into its replica; replicas stay
//! identical because [`action::reduce`] is deterministic.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`model`] | `Point`, `Actor`, `Document` and scene constants |
//! | [`action`] | `Action` variants, the reducer, and `ReduceError` |
//! | [`codec`] | `InitMsg` / `ServerMsg` envelopes and encode/decode |
//! | [`credential`] | Secret digests used for login |

pub mod action;
pub mod codec;
pub mod credential;
pub mod model;

pub use action::{Action, ReduceError, reduce};
pub use codec::{CodecError, InitMsg, ServerMsg};
pub use model::{Actor, ActorId, Document, Point};

/// Grepable error code attached to errors that cross the wire.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}
