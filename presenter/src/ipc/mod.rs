//! Line-oriented s-expression front end for driving a session.

pub mod dispatch;

pub use dispatch::{handle_message, Session};
