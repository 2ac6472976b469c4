//! Leaf filenames and path builders for console configuration.
//!
//! Functions accept `&Path` so callers decide where the config dir lives.

use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "console.json";

/// Default config dir name when none is given on the command line.
pub const CONFIG_DIR: &str = ".live-console";

pub fn settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join(SETTINGS_FILE)
}

/// Sibling temp file used for atomic writes: `console.json.tmp`.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_live_in_config_dir() {
        let dir = Path::new("/tmp/cfg");
        assert_eq!(settings_path(dir), PathBuf::from("/tmp/cfg/console.json"));
        assert_eq!(
            temp_path(&settings_path(dir)),
            PathBuf::from("/tmp/cfg/console.json.tmp")
        );
    }
}
