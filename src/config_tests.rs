#[cfg(test)]
mod tests {
    use crate::config::*;
    use crate::error::Result;
    use std::time::Duration;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.gateway_program, "openclaw");
        assert_eq!(config.status_args, vec!["gateway", "status"]);
        assert_eq!(config.start_args, vec!["gateway", "start"]);
        assert_eq!(config.probe_port, 16666);
        assert_eq!(config.status_tokens, vec!["ok", "running", "active"]);
        assert_eq!(config.control_host, "127.0.0.1");
        assert_eq!(config.control_port, 9097);
        assert!(config.control_secret.is_none());
        assert_eq!(config.check_interval_secs, 30);
        assert_eq!(config.max_failures, 5);
        assert_eq!(config.config_settle(), Duration::from_secs(3));
        assert_eq!(config.restart_settle(), Duration::from_secs(6));
        assert!(!config.settle_backoff);
        assert!(config.notify_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "check_interval_secs: 10\ncontrol_secret: hunter2\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.check_interval(), Duration::from_secs(10));
        assert_eq!(config.control_secret.as_deref(), Some("hunter2"));
        assert_eq!(config.max_failures, 5);
        assert_eq!(config.probe_port, 16666);
    }

    #[test]
    fn test_config_default_path() {
        let path = Config::default_path();
        assert!(path.is_ok());

        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("gatewatch"));
        assert!(path.to_string_lossy().ends_with("config.yaml"));
    }

    #[test]
    fn test_config_load_missing() -> Result<()> {
        let config = Config::load(Some("/nonexistent/gatewatch.yaml".into()))?;
        assert_eq!(config.gateway_program, "openclaw");
        Ok(())
    }

    #[test]
    fn test_config_save_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("nested").join("config.yaml");

        let original = Config {
            probe_port: 18080,
            notify_target: Some("ops-room".to_string()),
            ..Config::default()
        };
        original.save(config_path.clone())?;

        let loaded = Config::load(Some(config_path))?;
        assert_eq!(loaded.probe_port, 18080);
        assert_eq!(loaded.notify_target.as_deref(), Some("ops-room"));
        assert_eq!(loaded.status_tokens, original.status_tokens);

        Ok(())
    }

    #[test]
    fn test_load_rejects_invalid_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "max_failures: 0\n")?;

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("max_failures"));
        Ok(())
    }

    #[test]
    fn test_validate() {
        let zero_interval = Config { check_interval_secs: 0, ..Config::default() };
        assert!(zero_interval.validate().is_err());

        let empty_program = Config { gateway_program: "  ".to_string(), ..Config::default() };
        assert!(empty_program.validate().is_err());

        let zero_port = Config { probe_port: 0, ..Config::default() };
        assert!(zero_port.validate().is_err());
    }

    #[test]
    fn test_control_url() {
        let config = Config::default();
        assert_eq!(config.control_url(), "http://127.0.0.1:9097/configs?force=true");

        let bare = Config { control_path: "reload".to_string(), ..Config::default() };
        assert_eq!(bare.control_url(), "http://127.0.0.1:9097/reload");
    }

    #[test]
    fn test_notify_target_respects_flag() {
        let config = Config {
            notify_target: Some(" 5550100 ".to_string()),
            ..Config::default()
        };
        assert_eq!(config.notify_target(), Some("5550100"));

        let disabled = Config { notify_enabled: false, ..config.clone() };
        assert_eq!(disabled.notify_target(), None);

        let blank = Config { notify_target: Some(String::new()), ..config };
        assert_eq!(blank.notify_target(), None);
    }

    #[test]
    fn test_explicit_paths_win() {
        let config = Config {
            log_file: Some("/var/log/gw.log".into()),
            pid_file: Some("/run/gw.pid".into()),
            ..Config::default()
        };
        assert_eq!(config.log_path(), std::path::PathBuf::from("/var/log/gw.log"));
        assert_eq!(config.pid_path(), std::path::PathBuf::from("/run/gw.pid"));

        let defaults = Config::default();
        assert!(defaults.log_path().ends_with("gatewatch/watchdog.log"));
        assert!(defaults.pid_path().ends_with("gatewatch/gatewatch.pid"));
    }
}
