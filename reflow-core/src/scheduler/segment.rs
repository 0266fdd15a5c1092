//! Reflow profiles and their segments

use heapless::{String, Vec};

/// Maximum number of segments in a profile
pub const MAX_PROFILE_SEGMENTS: usize = 20;

/// Maximum profile name length (bytes)
pub const MAX_NAME_LEN: usize = 32;

/// Maximum segment note length (bytes)
pub const MAX_NOTE_LEN: usize = 16;

/// Start temperature assumed before the first segment (°C)
pub const AMBIENT_C: f32 = 25.0;

/// Segment shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SegmentKind {
    /// Linear interpolation from the previous target
    Ramp,
    /// Constant target
    Hold,
    /// Constant target, reached as fast as the heaters allow
    #[default]
    Step,
}

/// One leg of a reflow profile
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    /// Segment shape
    pub kind: SegmentKind,
    /// Temperature at the end of the segment (°C)
    pub target_c: f32,
    /// Duration in seconds; zero-duration segments are skipped
    pub duration_s: u32,
    /// Nominal slope (°C/s), display only
    pub slope: Option<f32>,
    /// Operator-facing label
    pub note: String<MAX_NOTE_LEN>,
}

impl Segment {
    /// Create a segment without slope or note
    pub fn new(kind: SegmentKind, target_c: f32, duration_s: u32) -> Self {
        Self {
            kind,
            target_c,
            duration_s,
            slope: None,
            note: String::new(),
        }
    }

    /// Attach a label
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = truncated(note);
        self
    }

    /// Attach a nominal slope
    pub fn with_slope(mut self, slope: f32) -> Self {
        self.slope = Some(slope);
        self
    }
}

/// A named, ordered list of segments
///
/// Replaced wholesale on load and read-only while a run is in progress.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReflowProfile {
    /// Display name
    pub name: String<MAX_NAME_LEN>,
    /// Segments in execution order
    pub segments: Vec<Segment, MAX_PROFILE_SEGMENTS>,
}

impl Default for ReflowProfile {
    fn default() -> Self {
        Self::sac305_default()
    }
}

impl ReflowProfile {
    /// Create an empty profile
    pub fn new(name: &str) -> Self {
        Self {
            name: truncated(name),
            segments: Vec::new(),
        }
    }

    /// Append a segment, returning it back when the profile is full
    pub fn push(&mut self, segment: Segment) -> Result<(), Segment> {
        self.segments.push(segment)
    }

    /// Check if the profile has no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Sum of all segment durations (s)
    pub fn total_duration_s(&self) -> u32 {
        self.segments
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(s.duration_s))
    }

    /// Built-in lead-free (SAC305) profile
    ///
    /// Used whenever no valid profile could be loaded.
    pub fn sac305_default() -> Self {
        let mut profile = Self::new("SAC305 Default");
        let segments = [
            Segment::new(SegmentKind::Ramp, 150.0, 90)
                .with_slope(1.5)
                .with_note("Preheat"),
            Segment::new(SegmentKind::Hold, 150.0, 60).with_note("Soak"),
            Segment::new(SegmentKind::Ramp, 245.0, 60).with_note("Ramp Up"),
            Segment::new(SegmentKind::Hold, 245.0, 20).with_note("Reflow"),
            Segment::new(SegmentKind::Ramp, 50.0, 60).with_note("Cooling"),
        ];
        for segment in segments {
            // Five segments always fit
            let _ = profile.push(segment);
        }
        profile
    }
}

/// Copy a string into a fixed-capacity buffer, cutting at a char boundary
pub(crate) fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
