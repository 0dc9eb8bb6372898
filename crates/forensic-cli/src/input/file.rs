use forensic_core::statements::AliasTable;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON file as a generic serde_json::Value.
pub fn read_json_value(path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value: Value = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Load a label alias override from YAML (`.yaml`/`.yml`) or JSON.
/// Fields the file omits keep their defaults.
pub fn read_aliases(path: &str) -> Result<AliasTable, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let is_yaml = matches!(
        canonical.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let aliases = parse_aliases(&contents, is_yaml)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(aliases)
}

fn parse_aliases(contents: &str, is_yaml: bool) -> Result<AliasTable, String> {
    if is_yaml {
        serde_yaml::from_str(contents).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(contents).map_err(|e| e.to_string())
    }
}

/// Resolve against the working directory and require an existing file.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}
