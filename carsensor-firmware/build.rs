//! Build script for carsensor-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time
//! - Generates the board constants included by `src/config.rs`

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Samples in the rank/spread window; `rank_delta` may not exceed it
const RANK_WINDOW: i64 = 9;

fn main() {
    setup_linker();
    let config = validate_config();
    generate_constants(&config);
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

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate board.toml configuration at compile time
fn validate_config() -> toml::Value {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a board.toml configuration file.          ║\n\
            ║  Please create one in the carsensor-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in board.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_bus(&config, &mut errors);
    validate_detector(&config, &mut errors);
    validate_timing(&config, &mut errors);
    report_errors(&errors);

    println!("cargo:warning=board.toml validated successfully");
    config
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn report_errors(errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: Invalid board configuration                              ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn section<'a>(config: &'a toml::Value, name: &str, errors: &mut Vec<String>) -> Option<&'a toml::Table> {
    match config.get(name) {
        Some(toml::Value::Table(t)) => Some(t),
        Some(_) => {
            errors.push(format!("[{}] must be a table", name));
            None
        }
        None => {
            errors.push(format!("Missing [{}] section", name));
            None
        }
    }
}

fn integer(table: &toml::Table, section: &str, key: &str, errors: &mut Vec<String>) -> Option<i64> {
    match table.get(key) {
        Some(toml::Value::Integer(v)) => Some(*v),
        Some(_) => {
            errors.push(format!("[{}] '{}' must be an integer", section, key));
            None
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            None
        }
    }
}

fn float(table: &toml::Table, section: &str, key: &str, errors: &mut Vec<String>) -> Option<f64> {
    match table.get(key) {
        Some(toml::Value::Float(v)) => Some(*v),
        Some(toml::Value::Integer(v)) => Some(*v as f64),
        Some(_) => {
            errors.push(format!("[{}] '{}' must be a number", section, key));
            None
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            None
        }
    }
}

/// Validate the host bus addresses
fn validate_bus(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(bus) = section(config, "bus", errors) else {
        return;
    };

    let mut addresses = Vec::new();
    for key in ["primary_address", "alternate_address"] {
        if let Some(addr) = integer(bus, "bus", key, errors) {
            // 0x00-0x07 and 0x78-0x7F are reserved 7-bit addresses
            if !(0x08..=0x77).contains(&addr) {
                errors.push(format!("[bus] {} must be 0x08-0x77", key));
            }
            addresses.push(addr);
        }
    }
    if let [primary, alternate] = addresses[..] {
        if primary == alternate {
            errors.push("[bus] primary and alternate address must differ".to_string());
        }
    }
}

/// Validate the detector strategy and its parameters
fn validate_detector(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(detector) = section(config, "detector", errors) else {
        return;
    };

    match detector.get("strategy") {
        Some(toml::Value::String(s)) if s == "zscore" || s == "rank_spread" => {}
        Some(_) => errors.push("[detector] strategy must be 'zscore' or 'rank_spread'".to_string()),
        None => errors.push("[detector] missing 'strategy'".to_string()),
    }

    if let Some(spread) = integer(detector, "detector", "spread_threshold", errors) {
        if !(0..=i64::from(u16::MAX)).contains(&spread) {
            errors.push("[detector] spread_threshold must be 0-65535".to_string());
        }
    }
    if let Some(delta) = integer(detector, "detector", "rank_delta", errors) {
        if !(0..=RANK_WINDOW).contains(&delta) {
            errors.push(format!("[detector] rank_delta must be 0-{}", RANK_WINDOW));
        }
    }
    if let Some(threshold) = float(detector, "detector", "threshold", errors) {
        if threshold <= 0.0 {
            errors.push("[detector] threshold must be positive".to_string());
        }
    }
    if let Some(influence) = float(detector, "detector", "influence", errors) {
        if !(0.0..=1.0).contains(&influence) {
            errors.push("[detector] influence must be 0.0-1.0".to_string());
        }
    }
}

/// Validate the loop timing budgets
fn validate_timing(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(timing) = section(config, "timing", errors) else {
        return;
    };

    for key in [
        "cycle_interval_ms",
        "conversion_timeout_ms",
        "settle_delay_ms",
        "boot_delay_ms",
    ] {
        if let Some(ms) = integer(timing, "timing", key, errors) {
            if !(1..=60_000).contains(&ms) {
                errors.push(format!("[timing] {} must be 1-60000", key));
            }
        }
    }
}

/// Write `board_config.rs` into OUT_DIR
///
/// Only called after validation, so every key is present and in range.
fn generate_constants(config: &toml::Value) {
    let int = |section: &str, key: &str| config[section][key].as_integer().unwrap();
    let num = |section: &str, key: &str| match &config[section][key] {
        toml::Value::Float(v) => *v,
        v => v.as_integer().unwrap() as f64,
    };

    let detector = match config["detector"]["strategy"].as_str() {
        Some("rank_spread") => format!(
            "DetectorKind::RankSpread(carsensor_core::config::RankSpreadParams {{ spread_threshold: {}, delta: {} }})",
            int("detector", "spread_threshold"),
            int("detector", "rank_delta"),
        ),
        _ => format!(
            "DetectorKind::ZScore(carsensor_core::config::ZScoreParams {{ threshold: {:?}, influence: {:?} }})",
            num("detector", "threshold") as f32,
            num("detector", "influence") as f32,
        ),
    };

    let generated = format!(
        "// Generated from board.toml\n\
        pub const PRIMARY_ADDRESS: u8 = {:#04x};\n\
        pub const ALTERNATE_ADDRESS: u8 = {:#04x};\n\
        pub const DETECTOR: DetectorKind = {};\n\
        pub const CYCLE_INTERVAL_MS: u64 = {};\n\
        pub const CONVERSION_TIMEOUT_MS: u64 = {};\n\
        pub const SETTLE_DELAY_MS: u64 = {};\n\
        pub const BOOT_DELAY_MS: u64 = {};\n",
        int("bus", "primary_address"),
        int("bus", "alternate_address"),
        detector,
        int("timing", "cycle_interval_ms"),
        int("timing", "conversion_timeout_ms"),
        int("timing", "settle_delay_ms"),
        int("timing", "boot_delay_ms"),
    );

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("board_config.rs"), generated).unwrap();
}
