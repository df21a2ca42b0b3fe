//! Display session, command dispatcher, widget store and touch router for
//! the GlassLink remote display protocol.
//!
//! This crate interprets the wire messages decoded by `glasslink-proto`
//! and owns all per-connection state. It performs no I/O of its own: the
//! session consumes [`glasslink_proto::Message`]s, pointer input and timer
//! fires, draws through the injected [`Renderer`], schedules through the
//! injected [`Timer`] and returns [`SessionAction`]s for everything else.
//!
//! # Processing model
//!
//! Exactly one context drives a [`DisplaySession`]: the runtime's render
//! loop pulls messages via [`DisplaySession::pump`], feeds pointer input
//! via [`DisplaySession::handle_pointer`] and delivers timer fires via
//! [`DisplaySession::handle_timer`]. There are no locks because nothing
//! else ever touches the state; timers fire in the runtime and are routed
//! back into this single context.

mod action;
mod dispatch;
mod draw;
pub mod error;
mod render;
mod router;
mod session;
pub mod text;
mod timer;
pub mod widgets;

pub use action::{InputKind, OrientationLock, SessionAction};
pub use error::DispatchError;
pub use render::Renderer;
pub use router::PointerInput;
pub use session::{DisplaySession, SessionConfig, MAX_POINTERS};
pub use timer::{Timer, TimerId, WallClock, WallTime};
pub use widgets::{AutorepeatTiming, Button, ButtonFlags, Slider, SliderFlags, WidgetStore};
