use serde_json::Value;
use std::io::{self, Read};

/// Attempt to read JSON from stdin if data is being piped.
/// Returns None if stdin is a TTY (interactive).
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(trimmed)?;
    Ok(Some(value))
}

/// JSON from `--input <file>`, else piped stdin.
pub fn read_input(path: Option<&str>) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        super::file::read_json_value(path)
    } else if let Some(data) = read_stdin()? {
        Ok(data)
    } else {
        Err("--input <file.json> or stdin required".into())
    }
}
