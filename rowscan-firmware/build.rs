//! Build script for rowscan-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time and generates the `BOARD` constant
//!   and the logical frame size

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use rowscan_core::config::{BoardConfig, CHANNELS_PER_CHIP, MAX_TRANSACTION_WORDS};
use rowscan_core::contrast::MAX_CONTRAST;

fn main() {
    setup_linker();
    let board = validate_board();
    generate_board(&board);
}

/// Values read from board.toml
struct Board {
    config: BoardConfig,
    /// Logical frame (rows, columns) folded onto the scan
    frame: (u16, u16),
    contrast: u8,
    status_led_inverted: bool,
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

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    #[cfg(feature = "defmt")]
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}

/// Validate board.toml and return its contents
fn validate_board() -> Board {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a board.toml wiring description.          ║\n\
            ║  Please create one in the rowscan-firmware directory.            ║\n\
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
    let defaults = BoardConfig::CANONICAL;

    let rows = read_int(&config, "matrix", "rows", 1, 255, &mut errors);
    let columns = read_int(&config, "matrix", "columns", 1, 4096, &mut errors);
    let chips = read_int(&config, "matrix", "chips_per_row", 1, 255, &mut errors);
    let margin = read_int(&config, "scan", "safety_margin_ticks", 0, 65535, &mut errors);
    let start_delay = read_int(&config, "scan", "start_delay_ticks", 1, 65535, &mut errors);
    let contrast = read_int(
        &config,
        "display",
        "contrast",
        0,
        i64::from(MAX_CONTRAST),
        &mut errors,
    );
    let rounds = read_rounds(&config, &mut errors);
    let frame_rows = read_int(&config, "frame", "rows", 1, 255, &mut errors);
    let frame_cols = read_int(&config, "frame", "columns", 1, 4096, &mut errors);

    let status_led_inverted = match config.get("display").and_then(|d| d.get("status_led_inverted")) {
        Some(toml::Value::Boolean(b)) => *b,
        Some(_) => {
            errors.push("[display] status_led_inverted must be a boolean".to_string());
            false
        }
        None => false,
    };

    report(&errors, "Invalid board configuration");

    let board = BoardConfig {
        row_count: rows.map_or(defaults.row_count, |v| v as u8),
        col_count: columns.map_or(defaults.col_count, |v| v as u16),
        chips_per_row: chips.map_or(defaults.chips_per_row, |v| v as u8),
        channels_per_chip: CHANNELS_PER_CHIP,
        rounds_per_group: rounds.unwrap_or(defaults.rounds_per_group),
        safety_margin_ticks: margin.map_or(defaults.safety_margin_ticks, |v| v as u16),
        start_delay_ticks: start_delay.map_or(defaults.start_delay_ticks, |v| v as u16),
    };

    if let Err(e) = board.validate() {
        let detail = format!("{:?}: {}", e, describe(&board, e));
        report(&[detail], "board.toml fails wiring validation");
    }
    if usize::from(board.longest_transaction()) > MAX_TRANSACTION_WORDS {
        report(
            &[format!(
                "longest transaction {} words exceeds the {}-word DMA buffer",
                board.longest_transaction(),
                MAX_TRANSACTION_WORDS
            )],
            "board.toml fails wiring validation",
        );
    }

    // Without a [frame] section the renderer draws the physical layout
    let frame_cols = frame_cols.map_or(board.col_count, |v| v as u16);
    let frame_rows = frame_rows.map_or(u16::from(board.row_count), |v| v as u16);
    if let Err(detail) = check_fold(&board, frame_rows, frame_cols) {
        report(&[detail], "board.toml [frame] does not fold onto the matrix");
    }

    println!("cargo:warning=board.toml validated successfully");

    Board {
        config: board,
        frame: (frame_rows, frame_cols),
        contrast: contrast.map_or(rowscan_core::contrast::DEFAULT_CONTRAST, |v| v as u8),
        status_led_inverted,
    }
}

/// Human-readable reason for a validation failure
fn describe(board: &BoardConfig, error: rowscan_core::config::ConfigError) -> String {
    use rowscan_core::config::ConfigError;
    match error {
        ConfigError::RowCount => format!("rows must be 1-32, got {}", board.row_count),
        ConfigError::ChipCount => format!("chips_per_row must be 1-16, got {}", board.chips_per_row),
        ConfigError::ChannelCount => "channels per chip must be 16".to_string(),
        ConfigError::ColumnMismatch => format!(
            "columns must be chips_per_row * 16 = {}, got {}",
            u16::from(board.chips_per_row) * 16,
            board.col_count
        ),
        ConfigError::GroupSplit => {
            "rounds_per_group entries must be non-zero and sum to 16".to_string()
        }
        ConfigError::SafetyMargin => format!(
            "safety_margin_ticks {} must be below the shortest phase",
            board.safety_margin_ticks
        ),
    }
}

/// Check that the logical frame folds into whole column bands
fn check_fold(board: &BoardConfig, rows: u16, cols: u16) -> Result<(), String> {
    if board.col_count % cols != 0 {
        return Err(format!(
            "columns {} must divide the matrix columns {}",
            cols, board.col_count
        ));
    }
    let bands = board.col_count / cols;
    let expected = u16::from(board.row_count) * bands;
    if rows != expected {
        return Err(format!(
            "rows must be {} ({} bands of {} rows), got {}",
            expected, bands, board.row_count, rows
        ));
    }
    Ok(())
}

/// Read an optional integer key, checking its range
fn read_int(
    config: &toml::Value,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) -> Option<i64> {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => Some(*v),
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
            None
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            None
        }
        None => None,
    }
}

/// Read `[scan] rounds_per_group`
fn read_rounds(config: &toml::Value, errors: &mut Vec<String>) -> Option<[u8; 4]> {
    let value = config.get("scan").and_then(|s| s.get("rounds_per_group"))?;
    let Some(items) = value.as_array() else {
        errors.push("[scan] rounds_per_group must be an array".to_string());
        return None;
    };
    if items.len() != 4 {
        errors.push(format!(
            "[scan] rounds_per_group needs 4 entries, got {}",
            items.len()
        ));
        return None;
    }

    let mut rounds = [0u8; 4];
    for (slot, item) in rounds.iter_mut().zip(items) {
        match item.as_integer() {
            Some(v) if (0..=16).contains(&v) => *slot = v as u8,
            _ => {
                errors.push("[scan] rounds_per_group entries must be 0-16".to_string());
                return None;
            }
        }
    }
    Some(rounds)
}

/// Fail the build with a boxed list of errors
fn report<S: AsRef<str>>(errors: &[S], title: &str) {
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
            .map(|e| format!("║  • {:<62} ║", e.as_ref()))
            .collect::<Vec<_>>()
            .join("\n")
    );
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

/// Write the validated board description to `$OUT_DIR/board.rs`
fn generate_board(board: &Board) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let c = &board.config;
    let source = format!(
        "/// Logical frame rows drawn by the renderer\n\
         pub const FRAME_ROWS: usize = {frame_rows};\n\
         /// Logical frame columns drawn by the renderer\n\
         pub const FRAME_COLS: usize = {frame_cols};\n\
         /// Driver current gain at boot\n\
         pub const CONTRAST: u8 = {contrast};\n\
         /// Status LED is active-low\n\
         pub const STATUS_LED_INVERTED: bool = {inverted};\n\
         /// Board wiring from board.toml\n\
         pub const BOARD: rowscan_core::config::BoardConfig = rowscan_core::config::BoardConfig {{\n\
         \x20   row_count: {rows},\n\
         \x20   col_count: {cols},\n\
         \x20   chips_per_row: {chips},\n\
         \x20   channels_per_chip: {channels},\n\
         \x20   rounds_per_group: {rounds:?},\n\
         \x20   safety_margin_ticks: {margin},\n\
         \x20   start_delay_ticks: {delay},\n\
         }};\n",
        rows = c.row_count,
        cols = c.col_count,
        frame_rows = board.frame.0,
        frame_cols = board.frame.1,
        contrast = board.contrast,
        inverted = board.status_led_inverted,
        chips = c.chips_per_row,
        channels = c.channels_per_chip,
        rounds = c.rounds_per_group,
        margin = c.safety_margin_ticks,
        delay = c.start_delay_ticks,
    );
    fs::write(out_dir.join("board.rs"), source).unwrap();
}
