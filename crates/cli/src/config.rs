//! Defaults and environment lookups for the `checkin` binary.

/// Port used when neither `--port` nor `PORT` is given.
pub(crate) const DEFAULT_PORT: u16 = 8787;

/// Environment variable consulted for the listen port.
pub(crate) const PORT_ENV: &str = "PORT";

/// Entry document, relative to the working directory.
pub(crate) const DEFAULT_DATA_FILE: &str = "data/entries.json";

/// Upload directory, relative to the working directory.
pub(crate) const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Pick the listen port: explicit flag, then the environment value, then the default.
///
/// An environment value that is not a valid port is ignored.
pub(crate) fn resolve_port(flag: Option<u16>, env_value: Option<&str>) -> u16 {
    if let Some(port) = flag {
        return port;
    }
    match env_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => match raw.parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                tracing::warn!(
                    value = raw,
                    default = DEFAULT_PORT,
                    "ignoring invalid {PORT_ENV}"
                );
                DEFAULT_PORT
            }
        },
        None => DEFAULT_PORT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_environment() {
        assert_eq!(resolve_port(Some(9000), Some("9100")), 9000);
    }

    #[test]
    fn environment_used_when_no_flag() {
        assert_eq!(resolve_port(None, Some("9100")), 9100);
        assert_eq!(resolve_port(None, Some(" 9100 ")), 9100);
    }

    #[test]
    fn default_when_unset_or_invalid() {
        assert_eq!(resolve_port(None, None), DEFAULT_PORT);
        assert_eq!(resolve_port(None, Some("")), DEFAULT_PORT);
        assert_eq!(resolve_port(None, Some("http")), DEFAULT_PORT);
        assert_eq!(resolve_port(None, Some("70000")), DEFAULT_PORT);
    }
}
