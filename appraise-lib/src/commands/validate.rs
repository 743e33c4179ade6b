use super::Host;
use super::config::{CONFIG_FILE_NAME, Config};
use crate::Result;
use crate::metrics::find_metric_def;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file (default is `appraise.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

/// Loads and validates a configuration file, then describes what it will run.
pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    let config_path = args.config.as_ref();

    match Config::load(Utf8Path::new("."), config_path) {
        Ok(config) => {
            let mut out = host.output();
            match config_path {
                Some(path) => {
                    let _ = writeln!(out, "Configuration file '{path}' is valid");
                }
                None if Utf8Path::new(CONFIG_FILE_NAME).exists() => {
                    let _ = writeln!(out, "Configuration file '{CONFIG_FILE_NAME}' is valid");
                }
                None => {
                    let _ = writeln!(out, "Using default configuration (no config file found)");
                }
            }

            let _ = writeln!(out, "{}", describe(&config));
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Configuration validation failed: {e:#}");
            host.exit(1);
            Err(e)
        }
    }
}

fn describe(config: &Config) -> String {
    let mut lines = vec![
        format!("Pool size: {}", config.pool_size),
        format!("Priority function: {}", config.priority_function),
        format!("Missing metrics: {}", config.missing_metric_policy),
    ];

    if let Some(platform) = &config.target_platform {
        lines.push(format!("Target platform: {platform}"));
    }

    lines.push("Metrics:".to_string());
    for metric in &config.metrics {
        let timeout = metric.timeout.unwrap_or(config.metric_timeout);
        lines.push(format!(
            "  {:<24} weight {:<5} cost {:<6} timeout {}s{}",
            metric.name,
            metric.weight.to_string(),
            metric.cost_class.to_string(),
            timeout.as_secs(),
            if metric.enabled { "" } else { " (disabled)" }
        ));

        if let Some(def) = find_metric_def(&metric.name) {
            lines.push(format!("    {}", def.description));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;
    use crate::commands::init::{InitArgs, init_config};

    fn write_config(dir: &tempfile::TempDir, name: &str, text: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::try_from(dir.path().join(name)).unwrap();
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_default_config_is_valid() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = Utf8PathBuf::try_from(tmp.path().join(CONFIG_FILE_NAME)).unwrap();

        let mut init_host = TestHost::new();
        init_config(&mut init_host, &InitArgs { output: Some(config_path.clone()) }).unwrap();
        assert!(init_host.output_text().contains("Generated default configuration file"));

        let mut host = TestHost::new();
        validate_config(&mut host, &ValidateArgs { config: Some(config_path) }).unwrap();

        assert!(host.output_text().contains("is valid"));
        assert_eq!(host.exit_code, None);
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_describes_the_metrics() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = write_config(
            &tmp,
            "small.toml",
            r#"
pool_size = 2

[priority_function]
kind = "reciprocal"

[[metrics]]
name = "license"
weight = 0.7
cost_class = "low"

[[metrics]]
name = "size"
weight = 0.3
cost_class = "high"
timeout = "90s"
enabled = false
"#,
        );

        let mut host = TestHost::new();
        validate_config(&mut host, &ValidateArgs { config: Some(config_path) }).unwrap();

        let text = host.output_text();
        let summary: Vec<_> = text.lines().skip(1).collect();
        insta::assert_snapshot!(summary.join("\n"), @r"
        Pool size: 2
        Priority function: reciprocal
        Missing metrics: penalize
        Metrics:
          license                  weight 0.7   cost low    timeout 30s
            Whether the license is compatible with LGPL-2.1
          size                     weight 0.3   cost high   timeout 90s (disabled)
            How well the artifact fits on common deployment hardware
        ");
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_invalid_toml_syntax() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = write_config(&tmp, "invalid_syntax.toml", "[[metrics]\nname = \"license\"\n");

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &ValidateArgs { config: Some(config_path) });

        assert!(result.is_err());
        assert_eq!(host.exit_code, Some(1));
        assert!(host.error_text().contains("Configuration validation failed"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_unknown_metric() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = write_config(
            &tmp,
            "unknown_metric.toml",
            r#"
[[metrics]]
name = "popularity"
weight = 1.0
cost_class = "low"
"#,
        );

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &ValidateArgs { config: Some(config_path) });

        assert!(result.is_err());
        assert_eq!(host.exit_code, Some(1));
        assert!(host.error_text().contains("unknown metric 'popularity'"), "{}", host.error_text());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_invalid_duration_format() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = write_config(&tmp, "invalid_duration.toml", "metric_timeout = \"soon\"\n");

        let mut host = TestHost::new();
        assert!(validate_config(&mut host, &ValidateArgs { config: Some(config_path) }).is_err());
        assert_eq!(host.exit_code, Some(1));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_empty_config_is_valid() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = write_config(&tmp, "empty.toml", "# Empty config file\n");

        let mut host = TestHost::new();
        assert!(validate_config(&mut host, &ValidateArgs { config: Some(config_path) }).is_ok());
    }
}
