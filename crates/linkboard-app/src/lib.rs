//! Linkboard Application
//!
//! Headless host for the Linkboard engine: replays scripted pointer sessions
//! against an in-memory document.

mod session;

pub use session::{Session, SessionError, SessionScript, SessionStep, replay};
