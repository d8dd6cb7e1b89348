use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::Utc;
use serde::Serialize;

const LOG_FILE: &str = "diagnostics.log";
const MAX_LOG_BYTES: u64 = 1_500_000;
const REDACTED: &str = "[redacted]";

#[derive(Debug, Serialize)]
pub struct LogEvent {
    pub ts: String,
    pub kind: String,
    pub message: String,
}

fn is_sensitive_token(token: &str) -> bool {
    let digits = token.chars().filter(|c| c.is_ascii_digit()).count();
    if digits >= 10 {
        return true;
    }
    // e-mail addresses
    if let Some((local, domain)) = token.split_once('@') {
        return !local.is_empty() && domain.contains('.');
    }
    false
}

/// Strips device paths, e-mail addresses and phone-number-like digit runs.
pub fn sanitize(input: &str) -> String {
    let mut out = input.to_string();
    for prefix in ["file://", "content://", "/Users/", "/home/", "/data/", "/var/", "/private/"] {
        if let Some(idx) = out.find(prefix) {
            out.replace_range(idx.., REDACTED);
            break;
        }
    }
    out.split_whitespace()
        .map(|token| if is_sensitive_token(token) { REDACTED } else { token })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn log_event(log_dir: &Path, kind: &str, message: &str) -> io::Result<()> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(LOG_FILE);
    trim_log(&path)?;
    let event = LogEvent {
        ts: Utc::now().to_rfc3339(),
        kind: kind.to_string(),
        message: sanitize(message),
    };
    let line = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}

fn trim_log(path: &Path) -> io::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    if fs::metadata(path)?.len() <= MAX_LOG_BYTES {
        return Ok(());
    }
    let data = fs::read(path)?;
    let mut keep_from = data.len().saturating_sub((MAX_LOG_BYTES / 2) as usize);
    // resume on a line boundary so every kept line is still valid JSON
    if let Some(offset) = data[keep_from..].iter().position(|b| *b == b'\n') {
        keep_from += offset + 1;
    }
    fs::write(path, &data[keep_from..])?;
    Ok(())
}
