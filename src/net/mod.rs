//! TCP channel plumbing and text command framing.

mod channel;
pub mod command;

pub use channel::{EFFECTIVELY_UNBOUNDED, WireChannel};
