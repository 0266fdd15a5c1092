//! Reflow profiles and the profile timeline
//!
//! A profile is an ordered list of ramp/hold/step segments. The timeline
//! turns elapsed run time into the target temperature for that instant.

pub mod segment;
pub mod timeline;

pub use segment::{
    ReflowProfile, Segment, SegmentKind, AMBIENT_C, MAX_NAME_LEN, MAX_NOTE_LEN,
    MAX_PROFILE_SEGMENTS,
};
pub use timeline::{locate, target_at, Position};
