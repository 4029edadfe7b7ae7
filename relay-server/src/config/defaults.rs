//! Default configuration values
//!
//! These are embedded in the binary and used when no config file exists.

/// Default configuration as TOML (for reference/documentation)
pub const DEFAULT_CONFIG_TOML: &str = r##"
# relay configuration

[server]
host = "localhost"
port = 5555
# Number of broadcast lines replayed by `history`
history_size = 20
# Lines queued per session before a broadcast waits on it
outbound_buffer = 256
max_line_length = 65536
# Drop a session whose socket write stalls this long (unset = never)
# write_timeout_ms = 5000

[logging]
# Overridden by RELAY_LOG
filter = "info"
# stderr | file | both
output = "stderr"
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, ConfigLoader};
    use std::path::Path;

    #[test]
    fn test_default_toml_matches_defaults() {
        let parsed = ConfigLoader::parse(DEFAULT_CONFIG_TOML, Path::new("defaults.toml")).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }
}
