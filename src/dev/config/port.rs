use log::debug;

/// Environment variable that overrides the listening port.
pub const PORT_ENV: &str = "PORT";

/// Port used when the override is absent or unparsable.
pub const DEFAULT_PORT: u16 = 3000;

/// Resolve the listening port from an optional override.
///
/// A value that parses as a base-10 integer wins; anything else silently
/// falls back to [`DEFAULT_PORT`]. Ports are `u16`, so this also restricts the
/// range: integers outside `0..=65535` (e.g. `70000`, `-1`) fall back too.
pub fn resolve_port(value: Option<&str>) -> u16 {
    match value {
        Some(raw) => match raw.trim().parse::<u16>() {
            Ok(port) => port,
            Err(e) => {
                debug!(
                    "Ignoring {} override {:?} ({}), using {}",
                    PORT_ENV, raw, e, DEFAULT_PORT
                );
                DEFAULT_PORT
            }
        },
        None => DEFAULT_PORT,
    }
}

/// Read [`PORT_ENV`] once and resolve it.
pub fn port_from_env() -> u16 {
    resolve_port(std::env::var(PORT_ENV).ok().as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_override_is_used() {
        assert_eq!(resolve_port(Some("4000")), 4000);
        assert_eq!(resolve_port(Some("8080")), 8080);
    }

    #[test]
    fn missing_override_uses_default() {
        assert_eq!(resolve_port(None), DEFAULT_PORT);
        assert_eq!(DEFAULT_PORT, 3000);
    }

    #[test]
    fn garbage_falls_back_silently() {
        assert_eq!(resolve_port(Some("abc")), 3000);
        assert_eq!(resolve_port(Some("")), 3000);
        assert_eq!(resolve_port(Some("40.5")), 3000);
    }

    #[test]
    fn integers_outside_port_range_fall_back() {
        assert_eq!(resolve_port(Some("70000")), 3000);
        assert_eq!(resolve_port(Some("-1")), 3000);
        assert_eq!(resolve_port(Some("65535")), 65535);
        assert_eq!(resolve_port(Some("0")), 0);
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        assert_eq!(resolve_port(Some(" 4000\n")), 4000);
    }
}
