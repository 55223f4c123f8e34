//! Race session state for the kart relay.
//!
//! [`SessionState`] is the single authoritative record of what the vendor
//! last told us. [`SessionFeed`] is its only writer: it receives connection
//! events and frames from `kart-ws` and reconciles them into the record.
//! Everyone else reads through [`SessionState::snapshot`].

pub mod error;
pub mod feed;
pub mod parser;
pub mod session;

pub use error::{FeedError, FeedResult};
pub use feed::SessionFeed;
pub use parser::{classify_frame, ClockSource, Frame, RaceUpdate};
pub use session::{SessionSnapshot, SessionState, UNKNOWN_STATUS};
