use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use cross_xdg::BaseDirs;
use log::debug;

use crate::io::IoFormat;
use crate::tape::DEFAULT_CAPACITY;

/// Resolved run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub capacity: usize,
    pub format: IoFormat,
    pub max_steps: Option<usize>,
    pub timeout_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            format: IoFormat::Numeric,
            max_steps: None,
            timeout_ms: None,
        }
    }
}

/// Values given on the command line; `None` falls through to env/file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub capacity: Option<usize>,
    pub format: Option<IoFormat>,
    pub max_steps: Option<usize>,
    pub timeout_ms: Option<u64>,
}

impl Settings {
    /// Resolve settings: flags -> env -> config file -> defaults.
    pub fn load(overrides: Overrides) -> Self {
        let file = load_from_toml().unwrap_or_default();
        Self::resolve(overrides, |key| env::var(key).ok(), file)
    }

    fn resolve(overrides: Overrides, env_lookup: impl Fn(&str) -> Option<String>, file: Settings) -> Self {
        Self {
            capacity: overrides
                .capacity
                .or_else(|| env_lookup("TAPEVM_CAPACITY").and_then(|s| s.trim().parse().ok()))
                .unwrap_or(file.capacity),
            format: overrides
                .format
                .or_else(|| env_lookup("TAPEVM_FORMAT").and_then(|s| s.parse().ok()))
                .unwrap_or(file.format),
            max_steps: overrides
                .max_steps
                .or_else(|| env_lookup("TAPEVM_MAX_STEPS").and_then(|s| s.trim().parse().ok()))
                .or(file.max_steps),
            timeout_ms: overrides
                .timeout_ms
                .or_else(|| env_lookup("TAPEVM_TIMEOUT_MS").and_then(|s| s.trim().parse().ok()))
                .or(file.timeout_ms),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("TAPEVM_CONFIG") {
        return Some(PathBuf::from(path));
    }

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("tapevm.toml");
    Some(path)
}

fn load_from_toml() -> Option<Settings> {
    let path = config_path()?;
    let content = fs::read_to_string(&path).ok()?;
    debug!("loaded settings from {}", path.display());
    Some(parse_settings(&content))
}

/// Very small hand-rolled parser: look for a [machine] section and
/// key = value pairs. Unknown keys and bad values are ignored.
pub fn parse_settings(content: &str) -> Settings {
    let mut in_machine = false;
    let mut map: HashMap<String, String> = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        if line.starts_with('[') && line.ends_with(']') {
            in_machine = &line[1..line.len()-1] == "machine";
            continue;
        }
        if !in_machine { continue; }
        if let Some(eq) = line.find('=') {
            let key = line[..eq].trim().to_string();
            let val_raw = line[eq+1..].trim();
            // Accept quoted or unquoted
            let val = if val_raw.starts_with('"') && val_raw.ends_with('"') && val_raw.len() >= 2 {
                val_raw[1..val_raw.len()-1].to_string()
            } else { val_raw.to_string() };
            map.insert(key, val);
        }
    }

    let mut cfg = Settings::default();

    macro_rules! set {
        ($field:ident, $key:literal) => {
            if let Some(v) = map.get($key).and_then(|s| s.parse().ok()) { cfg.$field = v; }
        };
        ($field:ident, $key:literal, optional) => {
            if let Some(v) = map.get($key).and_then(|s| s.parse().ok()) { cfg.$field = Some(v); }
        };
    }

    set!(capacity, "capacity");
    set!(format, "format");
    set!(max_steps, "max_steps", optional);
    set!(timeout_ms, "timeout_ms", optional);

    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_machine_section() {
        let cfg = parse_settings(
            r#"
# tape settings
[machine]
capacity = 64
format = "char"
max_steps = 1000
timeout_ms = 250
"#,
        );
        assert_eq!(
            cfg,
            Settings {
                capacity: 64,
                format: IoFormat::Char,
                max_steps: Some(1000),
                timeout_ms: Some(250),
            }
        );
    }

    #[test]
    fn ignores_other_sections_and_bad_values() {
        let cfg = parse_settings(
            r#"
[other]
capacity = 5

[machine]
capacity = lots
format = hex
"#,
        );
        assert_eq!(cfg, Settings::default());
    }

    #[test]
    fn flags_beat_env_beat_file() {
        let file = Settings { capacity: 10, max_steps: Some(1), ..Settings::default() };
        let env = |key: &str| match key {
            "TAPEVM_CAPACITY" => Some("20".to_string()),
            "TAPEVM_FORMAT" => Some("char".to_string()),
            _ => None,
        };

        let cfg = Settings::resolve(Overrides::default(), env, file.clone());
        assert_eq!(cfg.capacity, 20);
        assert_eq!(cfg.format, IoFormat::Char);
        assert_eq!(cfg.max_steps, Some(1));
        assert_eq!(cfg.timeout_ms, None);

        let flags = Overrides { capacity: Some(30), format: Some(IoFormat::Numeric), ..Overrides::default() };
        let cfg = Settings::resolve(flags, env, file);
        assert_eq!(cfg.capacity, 30);
        assert_eq!(cfg.format, IoFormat::Numeric);
    }

    #[test]
    fn unparsable_env_falls_through() {
        let env = |key: &str| (key == "TAPEVM_MAX_STEPS").then(|| "many".to_string());
        let cfg = Settings::resolve(Overrides::default(), env, Settings::default());
        assert_eq!(cfg.max_steps, None);
    }
}
