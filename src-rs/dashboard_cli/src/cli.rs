use std::env;
use std::time::Duration;

use task_dashboard_rs::DashboardConfig;

const DEFAULT_URL: &str = "http://localhost:8000";
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Clone, Debug)]
pub struct CLIConfig {
    pub dashboard: DashboardConfig,
    pub log_level: String,
}

/// Environment first, then command line flags on top.
pub fn parse_config() -> CLIConfig {
    let mut dashboard = DashboardConfig {
        base_url: env_value("TASK_API_URL").unwrap_or_else(|| DEFAULT_URL.to_string()),
        auto_refresh: env_value("TASK_DASHBOARD_AUTO_REFRESH")
            .and_then(|value| parse_flag(&value))
            .unwrap_or(false),
        request_timeout: env_value("TASK_DASHBOARD_TIMEOUT_SECS").and_then(|value| parse_secs(&value)),
        ..DashboardConfig::default()
    };
    if let Some(poll) = env_value("TASK_DASHBOARD_POLL_SECS").and_then(|value| parse_secs(&value)) {
        dashboard.poll_interval = poll;
    }
    let mut cfg = CLIConfig {
        dashboard,
        log_level: env_value("TASK_DASHBOARD_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
    };
    apply_args(&mut cfg, env::args().skip(1));
    cfg
}

/// Applies `--base URL`, `--poll SECS`, `--timeout SECS`, `--log LEVEL` and the
/// bare `--auto` / `--no-auto` switches. Unknown arguments are ignored.
fn apply_args<I>(cfg: &mut CLIConfig, args: I)
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--auto" => cfg.dashboard.auto_refresh = true,
            "--no-auto" => cfg.dashboard.auto_refresh = false,
            "--base" => {
                if let Some(url) = args.next() {
                    cfg.dashboard.base_url = url;
                }
            }
            "--poll" => {
                if let Some(poll) = args.next().as_deref().and_then(parse_secs) {
                    cfg.dashboard.poll_interval = poll;
                }
            }
            "--timeout" => {
                if let Some(value) = args.next() {
                    cfg.dashboard.request_timeout = parse_secs(&value);
                }
            }
            "--log" => {
                if let Some(level) = args.next() {
                    cfg.log_level = level;
                }
            }
            _ => {}
        }
    }
}

/// Unset and blank variables both read as missing.
fn env_value(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

fn parse_secs(value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(args: &[&str]) -> CLIConfig {
        let mut cfg = CLIConfig {
            dashboard: DashboardConfig::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        };
        apply_args(&mut cfg, args.iter().map(|arg| arg.to_string()));
        cfg
    }

    #[test]
    fn auto_is_a_bare_switch() {
        let cfg = config_from(&["--auto", "--base", "http://tasks:9000"]);
        assert!(cfg.dashboard.auto_refresh);
        assert_eq!(cfg.dashboard.base_url, "http://tasks:9000");

        let cfg = config_from(&["--auto", "false"]);
        assert!(cfg.dashboard.auto_refresh);

        let cfg = config_from(&["--auto", "--no-auto"]);
        assert!(!cfg.dashboard.auto_refresh);
    }

    #[test]
    fn durations_and_log_level() {
        let cfg = config_from(&["--poll", "2", "--timeout", "30", "--log", "debug"]);
        assert_eq!(cfg.dashboard.poll_interval, Duration::from_secs(2));
        assert_eq!(cfg.dashboard.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(cfg.log_level, "debug");

        let cfg = config_from(&["--poll", "0", "--timeout", "soon"]);
        assert_eq!(cfg.dashboard.poll_interval, Duration::from_secs(5));
        assert_eq!(cfg.dashboard.request_timeout, None);
    }

    #[test]
    fn flag_words() {
        assert_eq!(parse_flag("ON"), Some(true));
        assert_eq!(parse_flag("no"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
