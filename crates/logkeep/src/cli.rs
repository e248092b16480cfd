//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use logkeep_core::Category;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "logkeep")]
#[command(version, about = "Rotating local log store with background upload")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: logkeep.{toml,yaml,yml,json} in the current directory)
    #[arg(short, long, global = true, env = "LOGKEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output in JSON format instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Append a structured entry
    Log(LogArgs),

    /// Store a raw dump as its own file
    Raw(RawArgs),

    /// List stored files
    List {
        /// Only this category (structured, raw)
        #[arg(long)]
        category: Option<Category>,
    },

    /// Delete expired files when over the size budget
    Cleanup {
        /// Only this category (structured, raw)
        #[arg(long)]
        category: Option<Category>,
    },

    /// Seal the active file for upload
    Prepare,

    /// Prepare and upload all pending files
    Upload,

    /// Concatenate structured logs into one file
    Export,

    /// Upload periodically until interrupted
    Watch {
        /// Interval like "30s", "15m", "12h" (default: from config)
        #[arg(long, value_parser = parse_duration)]
        interval: Option<Duration>,
    },
}

#[derive(Args)]
pub struct LogArgs {
    /// Field as KEY=VALUE (repeatable)
    #[arg(short, long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,

    /// Whole entry as a JSON object
    #[arg(long, conflicts_with = "fields")]
    pub data: Option<String>,
}

#[derive(Args)]
pub struct RawArgs {
    /// First line of the dump
    #[arg(short, long, default_value = "raw")]
    pub label: String,

    /// File to dump, or "-" for stdin
    #[arg(default_value = "-")]
    pub input: String,
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, _)) if key.is_empty() => Err("Field name must not be empty".to_string()),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err("Expected KEY=VALUE format".to_string()),
    }
}

/// Parse "1h", "30m", "1h30m" or plain seconds
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim().to_lowercase();
    if s.is_empty() {
        return Err("Empty duration string".to_string());
    }

    let mut total: u64 = 0;
    let mut digits = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = match c {
            's' => 1,
            'm' => 60,
            'h' => 3600,
            'd' => 86400,
            _ => return Err(format!("Unknown duration unit: {}", c)),
        };
        let n: u64 = digits
            .parse()
            .map_err(|_| format!("Invalid duration: {}", s))?;
        total += n * unit;
        digits.clear();
    }
    if !digits.is_empty() {
        total += digits
            .parse::<u64>()
            .map_err(|_| format!("Invalid duration: {}", s))?;
    }

    if total == 0 {
        return Err("Duration must be greater than 0".to_string());
    }
    Ok(Duration::from_secs(total))
}
