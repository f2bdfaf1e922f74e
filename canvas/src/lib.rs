//! Client-side interaction engine for playhouse.
//!
//! This crate owns everything a client does between the pointer and the
//! socket: interpreting pointer events against the active tool, keeping the
//! local-only drag preview, emitting protocol [`scene::Action`]s, and folding
//! the server's broadcasts into the local replica. Pixel drawing is the host's
//! job; it reads the replica and [`engine::EngineCore::drag_preview`] and
//! forwards [`engine::Effect::Send`] payloads to the transport.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Testable [`engine::EngineCore`]: replica + tool state + pointer handlers |
//! | [`input`] | Tools and the move-tool state machine |
//! | [`hit`] | Hit-testing pointer positions against actors |
//! | [`sync`] | Applies inbound server messages to the engine in arrival order |
//! | [`consts`] | Shared numeric constants |

pub mod consts;
pub mod engine;
pub mod hit;
pub mod input;
pub mod sync;
