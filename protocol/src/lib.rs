//! Shared types for the mention-aware editor: content segments, lookup
//! candidates, and the wire format used to store and transmit editor content.

mod lookup;
mod segment;
pub mod wire;

pub use lookup::UserLookup;
pub use lookup::UserSearchError;
pub use segment::Candidate;
pub use segment::Segment;
pub use segment::UserId;
