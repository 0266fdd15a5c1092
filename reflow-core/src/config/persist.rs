//! Persisted configuration and profile documents
//!
//! Both documents are JSON. Every field is optional and unknown fields are
//! ignored; missing values keep the built-in defaults. A profile document
//! that cannot be used falls back to the built-in SAC305 profile so the
//! controller never runs with an empty profile.

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use super::types::{PidGains, SystemConfig};
use crate::scheduler::segment::truncated;
use crate::scheduler::{ReflowProfile, Segment, SegmentKind, AMBIENT_C, MAX_PROFILE_SEGMENTS};

/// Name given to profiles without `meta.name`
pub const UNNAMED_PROFILE: &str = "Unknown";

/// Persisted data errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Not valid JSON, or the wrong shape (position of the error)
    Malformed { line: u32, column: u32 },
    /// Profile document without segments
    NoSegments,
    /// Document could not be written
    Render,
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Malformed {
            line: e.line() as u32,
            column: e.column() as u32,
        }
    }
}

// ----------------------------------------------------------------------------
// System configuration
// ----------------------------------------------------------------------------

/// Presence flag written as 0/1 but also accepted as a boolean
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
            Flag::Float(f) => f != 0.0,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct SystemDoc {
    hardware: HardwareDoc,
    pid_params: PidDoc,
    calibration: CalibrationDoc,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct HardwareDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    ssr2_is_present: Option<Flag>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct PidDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    ssr1: Option<GainsDoc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ssr2: Option<GainsDoc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct GainsDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    kp: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ki: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kd: Option<f32>,
}

impl GainsDoc {
    fn apply(&self, base: PidGains) -> PidGains {
        PidGains {
            kp: self.kp.unwrap_or(base.kp),
            ki: self.ki.unwrap_or(base.ki),
            kd: self.kd.unwrap_or(base.kd),
        }
    }
}

impl From<PidGains> for GainsDoc {
    fn from(g: PidGains) -> Self {
        Self {
            kp: Some(g.kp),
            ki: Some(g.ki),
            kd: Some(g.kd),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct CalibrationDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    t1_offset: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    t2_offset: Option<f32>,
}

/// Parse a system configuration document
///
/// Gains are stored as written; substitution of unusable gains happens
/// when the control loop reads them.
pub fn parse_system_config(json: &str) -> Result<SystemConfig, ConfigError> {
    let doc: SystemDoc = serde_json::from_str(json)?;
    let base = SystemConfig::new();

    let ssr1 = doc
        .pid_params
        .ssr1
        .as_ref()
        .map_or(base.ssr1, |g| g.apply(base.ssr1));
    let ssr2 = doc
        .pid_params
        .ssr2
        .as_ref()
        .map_or(base.ssr2, |g| g.apply(base.ssr2));

    Ok(SystemConfig {
        ssr1,
        ssr2,
        ssr2_present: doc
            .hardware
            .ssr2_is_present
            .map_or(base.ssr2_present, Flag::is_set),
        t1_offset: doc.calibration.t1_offset.unwrap_or(base.t1_offset),
        t2_offset: doc.calibration.t2_offset.unwrap_or(base.t2_offset),
    })
}

/// Write a system configuration document
pub fn render_system_config(config: &SystemConfig) -> Result<String, ConfigError> {
    let doc = SystemDoc {
        hardware: HardwareDoc {
            ssr2_is_present: Some(Flag::Int(i64::from(config.ssr2_present))),
        },
        pid_params: PidDoc {
            ssr1: Some(config.ssr1.into()),
            ssr2: Some(config.ssr2.into()),
        },
        calibration: CalibrationDoc {
            t1_offset: Some(config.t1_offset),
            t2_offset: Some(config.t2_offset),
        },
    };
    serde_json::to_string_pretty(&doc).map_err(|_| ConfigError::Render)
}

/// Parse a system configuration, falling back to built-in defaults
pub fn load_system_config_or_default(json: Option<&str>) -> SystemConfig {
    let Some(json) = json else {
        info!("No system config, using built-in defaults");
        return SystemConfig::new();
    };

    match parse_system_config(json) {
        Ok(config) => {
            debug!(
                "System config loaded (ssr2 present: {})",
                config.ssr2_present
            );
            config
        }
        Err(e) => {
            info!("System config unusable ({}), using built-in defaults", e);
            SystemConfig::new()
        }
    }
}

// ----------------------------------------------------------------------------
// Profiles
// ----------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfileDoc {
    meta: MetaDoc,
    segments: Vec<SegmentDoc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetaDoc {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SegmentDoc {
    #[serde(rename = "type")]
    kind: Option<String>,
    end_temp: Option<f32>,
    temp: Option<f32>,
    duration: Option<f64>,
    duration_s: Option<f64>,
    slope: Option<f32>,
    note: Option<String>,
}

impl SegmentDoc {
    fn kind(&self) -> SegmentKind {
        match self.kind.as_deref() {
            Some("ramp") => SegmentKind::Ramp,
            Some("hold") => SegmentKind::Hold,
            _ => SegmentKind::Step,
        }
    }

    /// Build the segment given the previous segment's target
    fn to_segment(&self, previous_c: f32) -> Segment {
        let target_c = self.end_temp.or(self.temp).unwrap_or(previous_c);

        let duration_s = match self.duration.or(self.duration_s) {
            Some(d) => whole_seconds(d),
            None => self
                .slope
                .map_or(0, |slope| slope_duration(previous_c, target_c, slope)),
        };

        Segment {
            kind: self.kind(),
            target_c,
            duration_s,
            slope: self.slope,
            note: self.note.as_deref().map(truncated).unwrap_or_default(),
        }
    }
}

/// Whole seconds, negative and NaN durations become zero
fn whole_seconds(seconds: f64) -> u32 {
    // Float to int casts truncate toward zero and saturate
    seconds as u32
}

fn slope_duration(from_c: f32, to_c: f32, slope: f32) -> u32 {
    let slope = slope.abs();
    if !(slope > 0.0) {
        return 0;
    }
    whole_seconds(f64::from((to_c - from_c).abs() / slope))
}

/// Parse a profile document
pub fn parse_profile(json: &str) -> Result<ReflowProfile, ConfigError> {
    let doc: ProfileDoc = serde_json::from_str(json)?;
    if doc.segments.is_empty() {
        return Err(ConfigError::NoSegments);
    }

    let name = doc.meta.name.as_deref().unwrap_or(UNNAMED_PROFILE);
    let mut profile = ReflowProfile::new(name);
    let mut previous_c = AMBIENT_C;

    if doc.segments.len() > MAX_PROFILE_SEGMENTS {
        warn!(
            "Profile has {} segments, keeping the first {}",
            doc.segments.len(),
            MAX_PROFILE_SEGMENTS
        );
    }

    for raw in doc.segments.iter().take(MAX_PROFILE_SEGMENTS) {
        let segment = raw.to_segment(previous_c);
        previous_c = segment.target_c;
        if profile.push(segment).is_err() {
            break;
        }
    }

    Ok(profile)
}

/// Parse a profile, falling back to the built-in default profile
pub fn load_profile_or_default(json: Option<&str>) -> ReflowProfile {
    let Some(json) = json else {
        info!("No profile, using built-in default");
        return ReflowProfile::sac305_default();
    };

    match parse_profile(json) {
        Ok(profile) => {
            info!(
                "Profile loaded: {} segments, {}s",
                profile.len(),
                profile.total_duration_s()
            );
            profile
        }
        Err(e) => {
            info!("Profile unusable ({}), using built-in default", e);
            ReflowProfile::sac305_default()
        }
    }
}
