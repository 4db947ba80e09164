// ABOUTME: Env file resolution into KEY=VALUE entries.
// ABOUTME: EnvFileReader is the seam; FsEnvFileReader reads dotenv-style files.

use std::io;
use std::path::Path;

/// Resolves an env file into `KEY=VALUE` entries, in file order.
pub trait EnvFileReader {
    fn read_env_file(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// Reads env files from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsEnvFileReader;

impl EnvFileReader for FsEnvFileReader {
    fn read_env_file(&self, path: &Path) -> io::Result<Vec<String>> {
        let content = std::fs::read_to_string(path)?;
        parse_env_file(&content)
    }
}

/// Parse env file content.
///
/// - blank lines and lines starting with `#` are skipped
/// - an `export ` prefix is ignored
/// - `KEY=VALUE` is kept verbatim (no quote stripping)
/// - a bare `KEY` takes the value from the process environment, and is
///   skipped when unset
pub fn parse_env_file(content: &str) -> io::Result<Vec<String>> {
    let mut entries = Vec::new();

    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim_start();
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let (key, value) = match line.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (line.trim_end(), None),
        };

        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("line {}: invalid variable name '{}'", index + 1, key),
            ));
        }

        match value {
            Some(value) => entries.push(format!("{}={}", key, value)),
            None => {
                if let Ok(value) = std::env::var(key) {
                    entries.push(format!("{}={}", key, value));
                }
            }
        }
    }

    Ok(entries)
}
