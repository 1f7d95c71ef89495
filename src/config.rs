//! Check configuration
//!
//! Resolves the port, baud rate, read window and expected vector from
//! built-in defaults, an optional TOML file, and command-line overrides
//! (in increasing precedence).

use crate::error::{Result, VerifyError};
use crate::keystream::{parse_vector, EXPECTED_KEYSTREAM, KEYSTREAM_LEN};
use crate::serial::PortConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// On-disk configuration. Every field is optional.
///
/// ```toml
/// port = "/dev/ttyUSB1"
/// baud_rate = 115200
/// timeout_ms = 2000
/// expected = "10f1e7e4..."
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub port: Option<String>,
    pub baud_rate: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub expected: Option<String>,
}

impl FileConfig {
    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| VerifyError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| VerifyError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<String>,
    pub baud_rate: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub expected: Option<String>,
}

/// Fully resolved settings for one keystream check
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub port: PortConfig,
    pub expected: [u8; KEYSTREAM_LEN],
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            port: PortConfig::default(),
            expected: EXPECTED_KEYSTREAM,
        }
    }
}

impl CheckConfig {
    /// Layer the file config and then the overrides on top of the defaults
    pub fn resolve(file: Option<FileConfig>, overrides: Overrides) -> Result<Self> {
        let file = file.unwrap_or_default();
        let mut config = Self::default();

        if let Some(port) = overrides.port.or(file.port) {
            config.port.port_path = port;
        }
        if let Some(baud) = overrides.baud_rate.or(file.baud_rate) {
            if baud == 0 {
                return Err(VerifyError::InvalidConfig("baud rate must be non-zero".into()));
            }
            config.port = config.port.with_baud_rate(baud);
        }
        if let Some(ms) = overrides.timeout_ms.or(file.timeout_ms) {
            if ms == 0 {
                return Err(VerifyError::InvalidConfig("timeout must be non-zero".into()));
            }
            config.port = config.port.with_timeout(Duration::from_millis(ms));
        }
        if let Some(hex) = overrides.expected.or(file.expected) {
            config.expected = parse_vector(&hex)?;
        }

        Ok(config)
    }

    /// Whether the reference vector is the built-in RFC 8439 block
    pub fn uses_rfc_vector(&self) -> bool {
        self.expected == EXPECTED_KEYSTREAM
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::port::{default_port_path, DEFAULT_BAUD, DEFAULT_TIMEOUT};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = CheckConfig::resolve(None, Overrides::default()).unwrap();
        assert_eq!(config.port.port_path, default_port_path());
        assert_eq!(config.port.baud_rate, DEFAULT_BAUD);
        assert_eq!(config.port.timeout, DEFAULT_TIMEOUT);
        assert!(config.uses_rfc_vector());
    }

    #[test]
    fn test_file_values_apply() {
        let file = write_config(
            r#"
port = "/dev/ttyUSB3"
baud_rate = 921600
timeout_ms = 500
"#,
        );
        let loaded = FileConfig::load(file.path()).unwrap();
        let config = CheckConfig::resolve(Some(loaded), Overrides::default()).unwrap();

        assert_eq!(config.port.port_path, "/dev/ttyUSB3");
        assert_eq!(config.port.baud_rate, 921600);
        assert_eq!(config.port.timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_overrides_beat_file() {
        let file = FileConfig {
            port: Some("/dev/ttyUSB3".into()),
            baud_rate: Some(9600),
            timeout_ms: None,
            expected: None,
        };
        let overrides = Overrides {
            port: Some("/dev/ttyACM0".into()),
            ..Default::default()
        };
        let config = CheckConfig::resolve(Some(file), overrides).unwrap();

        assert_eq!(config.port.port_path, "/dev/ttyACM0");
        assert_eq!(config.port.baud_rate, 9600);
        assert_eq!(config.port.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_expected_override() {
        let overrides = Overrides {
            expected: Some("00".repeat(KEYSTREAM_LEN)),
            ..Default::default()
        };
        let config = CheckConfig::resolve(None, overrides).unwrap();
        assert_eq!(config.expected, [0u8; KEYSTREAM_LEN]);
        assert!(!config.uses_rfc_vector());
    }

    #[test]
    fn test_rejects_zero_baud_and_timeout() {
        let overrides = Overrides {
            baud_rate: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            CheckConfig::resolve(None, overrides),
            Err(VerifyError::InvalidConfig(_))
        ));

        let overrides = Overrides {
            timeout_ms: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            CheckConfig::resolve(None, overrides),
            Err(VerifyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_short_expected_vector() {
        let file = write_config("expected = \"10f1e7e4\"\n");
        let loaded = FileConfig::load(file.path()).unwrap();
        assert!(matches!(
            CheckConfig::resolve(Some(loaded), Overrides::default()),
            Err(VerifyError::VectorLength { actual: 4, .. })
        ));
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let file = write_config("baud = 115200\n");
        assert!(matches!(
            FileConfig::load(file.path()),
            Err(VerifyError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = FileConfig::load(Path::new("/nonexistent/chacha20.toml")).unwrap_err();
        assert!(matches!(err, VerifyError::ConfigRead { .. }));
    }
}
