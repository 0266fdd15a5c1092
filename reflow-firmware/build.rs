//! Build script for reflow-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates the embedded JSON configuration at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;

/// Segment capacity of the firmware profile
const MAX_SEGMENTS: usize = 20;

/// Segment kinds the firmware understands
const SEGMENT_TYPES: [&str; 3] = ["ramp", "hold", "step"];

fn main() {
    setup_linker();

    let system = load_json("config/system.json");
    validate_system(&system);

    let profile = load_json("config/default_profile.json");
    validate_profile(&profile);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and parse one embedded JSON document
fn load_json(path: &str) -> Value {
    println!("cargo:rerun-if-changed={}", path);

    let config_path = Path::new(path);
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: {:<56} ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds this file as its boot-time default.         ║\n\
            ║  Please create it in the reflow-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format!("{} not found!", path)
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read {:<41} ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                path, e
            );
        }
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format!("{} must contain a JSON object", path)
            );
        }
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid JSON syntax in {:<33} ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║  Line {:<4} column {:<43} ║\n\
                ║  {:<63} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                path,
                e.line(),
                e.column(),
                e.to_string()
            );
        }
    }
}

/// Validate the system configuration document
fn validate_system(config: &Value) {
    let mut errors = Vec::new();

    if let Some(hardware) = config.get("hardware") {
        match hardware.get("ssr2_is_present") {
            None | Some(Value::Bool(_)) => {}
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => {}
            Some(_) => errors.push("hardware.ssr2_is_present must be 0/1 or a boolean".to_string()),
        }
    }

    if let Some(pid) = config.get("pid_params") {
        for channel in ["ssr1", "ssr2"] {
            let Some(gains) = pid.get(channel) else {
                continue;
            };
            for gain in ["kp", "ki", "kd"] {
                match gains.get(gain) {
                    None => {}
                    Some(Value::Number(n)) => {
                        // Non-positive gains fall back to defaults at runtime
                        if n.as_f64().is_some_and(|v| v <= 0.0) {
                            println!(
                                "cargo:warning=pid_params.{}.{} is not positive, the default will be used",
                                channel, gain
                            );
                        }
                    }
                    Some(_) => errors.push(format!("pid_params.{}.{} must be a number", channel, gain)),
                }
            }
        }
    }

    if let Some(calibration) = config.get("calibration") {
        for offset in ["t1_offset", "t2_offset"] {
            if let Some(value) = calibration.get(offset) {
                if !value.is_number() {
                    errors.push(format!("calibration.{} must be a number", offset));
                }
            }
        }
    }

    report("Invalid system configuration", &errors);
}

/// Validate the default profile document
fn validate_profile(profile: &Value) {
    let mut errors = Vec::new();

    let segments = match profile.get("segments") {
        Some(Value::Array(segments)) => segments.as_slice(),
        Some(_) => {
            errors.push("segments must be an array".to_string());
            &[]
        }
        None => {
            errors.push("missing 'segments'".to_string());
            &[]
        }
    };

    if segments.is_empty() && errors.is_empty() {
        errors.push("segments cannot be empty".to_string());
    }
    if segments.len() > MAX_SEGMENTS {
        println!(
            "cargo:warning=default profile has {} segments, only the first {} are used",
            segments.len(),
            MAX_SEGMENTS
        );
    }

    for (i, segment) in segments.iter().enumerate() {
        let Some(segment) = segment.as_object() else {
            errors.push(format!("segment {} must be an object", i));
            continue;
        };

        match segment.get("type").and_then(Value::as_str) {
            Some(kind) if SEGMENT_TYPES.contains(&kind) => {}
            Some(kind) => errors.push(format!("segment {} has unknown type '{}'", i, kind)),
            None => errors.push(format!("segment {} missing 'type'", i)),
        }

        let has_duration = ["duration", "duration_s", "slope"]
            .iter()
            .any(|key| segment.get(*key).is_some_and(Value::is_number));
        if !has_duration {
            errors.push(format!("segment {} needs 'duration' or 'slope'", i));
        }

        if let Some(Value::Number(temp)) = segment.get("end_temp").or_else(|| segment.get("temp")) {
            if temp.as_f64().is_some_and(|t| !(0.0..=260.0).contains(&t)) {
                errors.push(format!("segment {} target must be 0-260", i));
            }
        }
    }

    report("Invalid default profile", &errors);
}

/// Fail the build with a boxed list of problems
fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}
