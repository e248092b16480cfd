//! Table and JSON output formatting

use chrono::{DateTime, Local};
use colored::Colorize;
use logkeep_core::Category;
use logkeep_store::naming::is_active_name;
use logkeep_store::LogFile;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

/// Global flag for JSON output mode
static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn set_json_mode(enabled: bool) {
    JSON_MODE.store(enabled, Ordering::SeqCst);
}

pub fn is_json_mode() -> bool {
    JSON_MODE.load(Ordering::SeqCst)
}

#[derive(Tabled)]
pub struct FileRow {
    #[tabled(rename = "category")]
    pub category: String,
    #[tabled(rename = "name")]
    pub name: String,
    #[tabled(rename = "state")]
    pub state: String,
    #[tabled(rename = "size")]
    pub size: String,
    #[tabled(rename = "modified")]
    pub modified: String,
}

/// JSON-friendly file listing entry
#[derive(Serialize)]
pub struct FileJson {
    pub category: Category,
    pub name: String,
    pub path: String,
    pub active: bool,
    pub size_bytes: u64,
    pub modified: DateTime<Local>,
}

impl FileJson {
    fn new(category: Category, file: &LogFile) -> Self {
        let name = file.name();
        FileJson {
            category,
            active: category.rotates() && is_active_name(&name),
            name,
            path: file.path.display().to_string(),
            size_bytes: file.size,
            modified: file.modified_local(),
        }
    }
}

impl From<&FileJson> for FileRow {
    fn from(file: &FileJson) -> Self {
        FileRow {
            category: file.category.to_string(),
            name: file.name.clone(),
            state: if file.active {
                "active".green().to_string()
            } else {
                "archived".cyan().to_string()
            },
            size: format_bytes(file.size_bytes),
            modified: file.modified.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

pub fn print_files(files: &[(Category, LogFile)]) {
    let files: Vec<FileJson> = files
        .iter()
        .map(|(category, file)| FileJson::new(*category, file))
        .collect();

    if is_json_mode() {
        print_json(&files);
        return;
    }

    if files.is_empty() {
        println!("No log files");
        return;
    }

    let rows: Vec<FileRow> = files.iter().map(FileRow::from).collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(3)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1}G", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1}M", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.0}K", bytes as f64 / 1024.0)
    } else {
        format!("{}B", bytes)
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing to JSON: {}", e),
    }
}

/// JSON wrapper for generic responses
#[derive(Serialize)]
pub struct ResponseJson<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Success message, with data attached in JSON mode
pub fn print_success_json<T: Serialize>(message: &str, data: Option<T>) {
    if is_json_mode() {
        print_json(&ResponseJson {
            success: true,
            message: Some(message.to_string()),
            data,
        });
    } else {
        print_success(message);
    }
}

pub fn print_error_json(message: &str) {
    if is_json_mode() {
        let response: ResponseJson<()> = ResponseJson {
            success: false,
            message: Some(message.to_string()),
            data: None,
        };
        if let Ok(json) = serde_json::to_string_pretty(&response) {
            eprintln!("{}", json);
        }
    } else {
        print_error(message);
    }
}
