//! Profile timeline
//!
//! Pure mapping from (profile, elapsed seconds) to target temperature.
//! No state is kept between calls, so the controller and any display
//! consumer may evaluate it independently.

use super::segment::{ReflowProfile, SegmentKind, AMBIENT_C};

/// Where an elapsed time falls within a profile
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Position {
    /// Inside segment `index`
    Active { index: u8, target_c: f32 },
    /// At or past the end of the profile
    Exhausted { target_c: f32 },
}

impl Position {
    /// Target temperature at this position
    pub fn target_c(&self) -> f32 {
        match *self {
            Position::Active { target_c, .. } | Position::Exhausted { target_c } => target_c,
        }
    }

    /// Check if the profile has run out
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Position::Exhausted { .. })
    }
}

/// Locate `elapsed_s` within the profile
///
/// The active segment is the first whose cumulative end exceeds the
/// elapsed time, which skips zero-duration segments. Negative or NaN
/// elapsed times are treated as zero. An empty profile is exhausted at
/// ambient.
pub fn locate(profile: &ReflowProfile, elapsed_s: f32) -> Position {
    // `max` returns the non-NaN operand
    let elapsed = elapsed_s.max(0.0);

    let mut cumulative = 0.0f32;
    let mut start_c = AMBIENT_C;

    for (index, segment) in profile.segments.iter().enumerate() {
        let duration = segment.duration_s as f32;
        let end = cumulative + duration;

        if end > elapsed {
            let local_t = elapsed - cumulative;
            let target_c = match segment.kind {
                SegmentKind::Hold | SegmentKind::Step => segment.target_c,
                SegmentKind::Ramp => interpolate(start_c, segment.target_c, local_t, duration),
            };
            return Position::Active {
                index: index as u8,
                target_c,
            };
        }

        cumulative = end;
        start_c = segment.target_c;
    }

    let target_c = profile
        .segments
        .last()
        .map(|s| s.target_c)
        .unwrap_or(AMBIENT_C);
    Position::Exhausted { target_c }
}

/// Target temperature at `elapsed_s` seconds into the profile
pub fn target_at(profile: &ReflowProfile, elapsed_s: f32) -> f32 {
    locate(profile, elapsed_s).target_c()
}

fn interpolate(start_c: f32, end_c: f32, local_t: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return end_c;
    }
    let fraction = (local_t / duration).clamp(0.0, 1.0);
    start_c + (end_c - start_c) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::segment::Segment;
    use proptest::prelude::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_reference_scenario() {
        let profile = ReflowProfile::sac305_default();

        assert!(approx(target_at(&profile, 0.0), 25.0));
        assert!(approx(target_at(&profile, 45.0), 87.5));
        assert!(approx(target_at(&profile, 100.0), 150.0));
        assert!(approx(target_at(&profile, 180.0), 197.5));
        assert!(approx(target_at(&profile, 400.0), 50.0));

        assert_eq!(
            locate(&profile, 100.0),
            Position::Active {
                index: 1,
                target_c: 150.0
            }
        );
        assert!(locate(&profile, 290.0).is_exhausted());
        assert!(!locate(&profile, 289.9).is_exhausted());
    }

    #[test]
    fn test_ramp_endpoints() {
        let mut profile = ReflowProfile::new("ramp");
        profile.push(Segment::new(SegmentKind::Ramp, 125.0, 100)).unwrap();

        assert!(approx(target_at(&profile, 0.0), AMBIENT_C));
        assert!(approx(target_at(&profile, 50.0), 75.0));
        assert!(approx(target_at(&profile, 100.0), 125.0));
    }

    #[test]
    fn test_zero_duration_segments_skipped() {
        let mut profile = ReflowProfile::new("steps");
        profile.push(Segment::new(SegmentKind::Hold, 90.0, 0)).unwrap();
        profile.push(Segment::new(SegmentKind::Ramp, 190.0, 10)).unwrap();

        // The zero-length hold never becomes active but sets the ramp start
        assert_eq!(
            locate(&profile, 0.0),
            Position::Active {
                index: 1,
                target_c: 90.0
            }
        );
        assert!(approx(target_at(&profile, 5.0), 140.0));
    }

    #[test]
    fn test_zero_duration_ramp_is_a_step() {
        assert!(approx(interpolate(25.0, 200.0, 0.0, 0.0), 200.0));

        let mut profile = ReflowProfile::new("ramp0");
        profile.push(Segment::new(SegmentKind::Ramp, 200.0, 0)).unwrap();
        assert_eq!(locate(&profile, 0.0), Position::Exhausted { target_c: 200.0 });
    }

    #[test]
    fn test_empty_profile() {
        let profile = ReflowProfile::new("empty");
        assert_eq!(locate(&profile, 10.0), Position::Exhausted { target_c: AMBIENT_C });
    }

    #[test]
    fn test_negative_and_nan_elapsed() {
        let profile = ReflowProfile::sac305_default();
        assert!(approx(target_at(&profile, -5.0), 25.0));
        assert!(approx(target_at(&profile, f32::NAN), 25.0));
    }

    #[test]
    fn test_descending_ramp() {
        let profile = ReflowProfile::sac305_default();
        // Cooling ramp: 245 -> 50 over 60 s starting at 230 s
        assert!(approx(target_at(&profile, 230.0), 245.0));
        assert!(approx(target_at(&profile, 250.0), 180.0));
        assert!(approx(target_at(&profile, 289.0), 53.25));
    }

    proptest! {
        #[test]
        fn prop_target_at_is_idempotent(t in -10.0f32..500.0) {
            let profile = ReflowProfile::sac305_default();
            prop_assert_eq!(target_at(&profile, t).to_bits(), target_at(&profile, t).to_bits());
        }

        #[test]
        fn prop_hold_is_constant(t in 90.0f32..150.0) {
            let profile = ReflowProfile::sac305_default();
            prop_assert_eq!(target_at(&profile, t), 150.0);
        }

        #[test]
        fn prop_ramp_is_monotonic(a in 0.0f32..90.0, b in 0.0f32..90.0) {
            let profile = ReflowProfile::sac305_default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(target_at(&profile, lo) <= target_at(&profile, hi));
        }

        #[test]
        fn prop_falling_ramp_is_monotonic(a in 210.0f32..290.0, b in 210.0f32..290.0) {
            let profile = ReflowProfile::sac305_default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(target_at(&profile, lo) >= target_at(&profile, hi));
        }

        #[test]
        fn prop_target_within_profile_range(t in -10.0f32..1000.0) {
            let profile = ReflowProfile::sac305_default();
            let target = target_at(&profile, t);
            prop_assert!((25.0..=245.0).contains(&target));
        }
    }
}
