//! Process configuration: defaults, optional YAML file, then environment.

use std::path::Path;

use authgate::HttpAuthHookConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

/// Variables read by existing broker deployments and the keys they set.
const DEPLOYMENT_ENV: &[(&str, &str)] = &[
    ("HTTP_URL_AUTH", "authgate.auth.url"),
    ("HTTP_URL_ACL", "authgate.acl.url"),
    ("HTTP_AUTH_CACHE", "authgate.auth.cache_seconds"),
    ("HTTP_ACL_CACHE", "authgate.acl.cache_seconds"),
    ("HTTP_CLIENT_TIMEOUT", "authgate.client_timeout_seconds"),
];

/// Prefix of structured overrides, e.g. `AUTHGATE_AUTH__URL`.
const ENV_PREFIX: &str = "AUTHGATE_";

/// Password variable read by the CLI itself, not a configuration key.
pub const PASSWORD_ENV: &str = "AUTHGATE_PROBE_PASSWORD";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub authgate: HttpAuthHookConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load the layered configuration. Later layers win:
    /// defaults, `path` (YAML), deployment variables, `AUTHGATE_*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not name a file, or if any layer
    /// holds an unknown key or a value of the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(path)?.extract()
    }

    fn figment(path: Option<&Path>) -> Result<Figment, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.is_file() {
                return Err(format!("config file not found: {}", path.display()).into());
            }
            figment = figment.merge(Yaml::file(path));
        }

        for &(var, key) in DEPLOYMENT_ENV {
            figment = figment.merge(Env::raw().only(&[var]).map(move |_| key.into()));
        }

        let password_key = PASSWORD_ENV.trim_start_matches(ENV_PREFIX);
        let overrides = Env::prefixed(ENV_PREFIX)
            .ignore(&[password_key])
            .split("__")
            .map(|key| {
                let key = key.as_str().to_ascii_lowercase();
                if key.starts_with("logging.") {
                    key.into()
                } else {
                    format!("authgate.{key}").into()
                }
            });

        Ok(figment.merge(overrides))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::time::Duration;

    use authgate::{FingerprintScheme, PipelineConfig};
    use figment::Jail;

    use super::*;

    const FILE: &str = r#"
authgate:
  auth:
    url: "http://authority.local/auth"
  acl:
    url: "http://authority.local/acl"
    cache_seconds: 10
  fingerprint: length_prefixed
logging:
  level: debug
  json: true
"#;

    #[test]
    fn defaults_without_file_or_env() {
        Jail::expect_with(|_| {
            let cfg = AppConfig::load(None)?;
            assert_eq!(cfg, AppConfig::default());
            assert!(!cfg.authgate.auth.is_enabled());
            assert_eq!(cfg.authgate.auth_ttl(), Duration::from_secs(600));
            assert_eq!(cfg.authgate.acl_ttl(), Duration::from_secs(30));
            assert_eq!(cfg.logging.level, "info");
            Ok(())
        });
    }

    #[test]
    fn yaml_file_layer() {
        Jail::expect_with(|jail| {
            jail.create_file("authgate.yaml", FILE)?;
            let cfg = AppConfig::load(Some(Path::new("authgate.yaml")))?;

            assert_eq!(
                cfg.authgate.auth,
                PipelineConfig::new("http://authority.local/auth")
            );
            assert_eq!(cfg.authgate.auth_ttl(), Duration::from_secs(600));
            assert_eq!(cfg.authgate.acl_ttl(), Duration::from_secs(10));
            assert_eq!(cfg.authgate.fingerprint, FingerprintScheme::LengthPrefixed);
            assert_eq!(cfg.authgate.client_timeout_seconds, 5);
            assert_eq!(cfg.logging.level, "debug");
            assert!(cfg.logging.json);
            Ok(())
        });
    }

    #[test]
    fn deployment_variables_override_file() {
        Jail::expect_with(|jail| {
            jail.create_file("authgate.yaml", FILE)?;
            jail.set_env("HTTP_URL_AUTH", "http://other.local/auth");
            jail.set_env("HTTP_AUTH_CACHE", "120");
            jail.set_env("HTTP_ACL_CACHE", "15");
            jail.set_env("HTTP_CLIENT_TIMEOUT", "2");

            let cfg = AppConfig::load(Some(Path::new("authgate.yaml")))?;

            assert_eq!(cfg.authgate.auth.url, "http://other.local/auth");
            assert_eq!(cfg.authgate.acl.url, "http://authority.local/acl");
            assert_eq!(cfg.authgate.auth_ttl(), Duration::from_secs(120));
            assert_eq!(cfg.authgate.acl_ttl(), Duration::from_secs(15));
            assert_eq!(cfg.authgate.client_timeout(), Duration::from_secs(2));
            Ok(())
        });
    }

    #[test]
    fn prefixed_variables_win() {
        Jail::expect_with(|jail| {
            jail.set_env("HTTP_URL_ACL", "http://deployment.local/acl");
            jail.set_env("AUTHGATE_ACL__URL", "http://override.local/acl");
            jail.set_env("AUTHGATE_MAX_ENTRIES", "100");
            jail.set_env("AUTHGATE_LOGGING__LEVEL", "warn");

            let cfg = AppConfig::load(None)?;

            assert_eq!(cfg.authgate.acl.url, "http://override.local/acl");
            assert_eq!(cfg.authgate.max_entries, 100);
            assert_eq!(cfg.logging.level, "warn");
            Ok(())
        });
    }

    #[test]
    fn password_variable_is_not_a_config_key() {
        Jail::expect_with(|jail| {
            jail.set_env(PASSWORD_ENV, "s3cret");
            jail.set_env("AUTHGATE_AUTH__URL", "http://authority.local/auth");

            let cfg = AppConfig::load(None)?;

            assert_eq!(cfg.authgate.auth.url, "http://authority.local/auth");
            assert_eq!(cfg.authgate.acl, PipelineConfig::default());
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_an_error() {
        Jail::expect_with(|_| {
            let err = AppConfig::load(Some(Path::new("absent.yaml"))).unwrap_err();
            assert!(err.to_string().contains("config file not found"));
            Ok(())
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("authgate.yaml", "authgate:\n  auth:\n    uri: x\n")?;
            assert!(AppConfig::load(Some(Path::new("authgate.yaml"))).is_err());
            Ok(())
        });
    }
}
