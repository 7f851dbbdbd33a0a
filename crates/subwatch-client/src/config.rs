use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::detection::policy::{AmountTolerance, DetectionPolicy, SignConvention};
use crate::{ClientError, ClientResult};

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const CONFIG_ENV_VAR: &str = "SUBWATCH_CONFIG";
pub const HOME_ENV_VAR: &str = "SUBWATCH_HOME";

/// Values supplied on the command line. Each one replaces the matching
/// config file value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyOverrides {
    pub sign_convention: Option<String>,
    pub absolute_tolerance: Option<f64>,
    pub relative_tolerance: Option<f64>,
    pub interval_tolerance_days: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPolicy {
    pub policy: DetectionPolicy,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ConfigLocation {
    path: PathBuf,
    explicit: bool,
}

/// Resolves the config file, layers `overrides` on top and validates the
/// result. A missing default file means built-in defaults; a missing file
/// that was named explicitly is an error.
pub fn load_policy(
    config_override: Option<&Path>,
    overrides: &PolicyOverrides,
    command: &str,
) -> ClientResult<ResolvedPolicy> {
    let location = resolve_config_location(
        config_override,
        std::env::var_os(CONFIG_ENV_VAR),
        std::env::var_os(HOME_ENV_VAR),
        home::home_dir(),
    );

    let (base, config_path) = match location {
        Some(location) => match read_config(&location)? {
            Some(policy) => (policy, Some(location.path)),
            None => (DetectionPolicy::default(), None),
        },
        None => (DetectionPolicy::default(), None),
    };

    let policy = apply_overrides(base, overrides, command)?;
    policy.validate()?;
    Ok(ResolvedPolicy {
        policy,
        config_path,
    })
}

fn resolve_config_location(
    config_override: Option<&Path>,
    env_config: Option<OsString>,
    env_home: Option<OsString>,
    home_dir: Option<PathBuf>,
) -> Option<ConfigLocation> {
    if let Some(path) = config_override {
        return Some(ConfigLocation {
            path: path.to_path_buf(),
            explicit: true,
        });
    }
    if let Some(path) = env_config.filter(|value| !value.is_empty()) {
        return Some(ConfigLocation {
            path: PathBuf::from(path),
            explicit: true,
        });
    }
    let home = match env_home.filter(|value| !value.is_empty()) {
        Some(path) => PathBuf::from(path),
        None => home_dir?.join(".subwatch"),
    };
    Some(ConfigLocation {
        path: home.join(CONFIG_FILE_NAME),
        explicit: false,
    })
}

fn read_config(location: &ConfigLocation) -> ClientResult<Option<DetectionPolicy>> {
    let content = match fs::read_to_string(&location.path) {
        Ok(content) => content,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound && !location.explicit => {
            debug!(path = %location.path.display(), "no config file; using defaults");
            return Ok(None);
        }
        Err(error) => {
            return Err(ClientError::config_read_failed(
                &location.path,
                &error.to_string(),
            ));
        }
    };

    debug!(path = %location.path.display(), "loading detection config");
    parse_config(&content)
        .map(Some)
        .map_err(|error| match error.code.as_str() {
            "invalid_config" => error,
            _ => ClientError::config_read_failed(&location.path, &error.message),
        })
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    detection: Option<RawDetection>,
}

#[derive(Debug, Deserialize)]
struct RawDetection {
    sign_convention: Option<String>,
    interval_tolerance_days: Option<f64>,
    amount_tolerance: Option<RawAmountTolerance>,
}

#[derive(Debug, Deserialize)]
struct RawAmountTolerance {
    kind: Option<String>,
    value: Option<f64>,
}

/// Parses the TOML layout into a policy. Absent keys keep their defaults.
pub fn parse_config(content: &str) -> ClientResult<DetectionPolicy> {
    let raw: RawConfig = toml::from_str(content).map_err(|error| {
        ClientError::new(
            "config_read_failed",
            &format!("Invalid config TOML: {error}"),
            Vec::new(),
        )
    })?;

    let mut policy = DetectionPolicy::default();
    let Some(detection) = raw.detection else {
        return Ok(policy);
    };

    if let Some(value) = detection.sign_convention {
        policy.sign_convention = SignConvention::parse(&value).ok_or_else(|| {
            ClientError::invalid_config(
                "sign_convention",
                &format!("expected `negative_is_spend` or `positive_is_spend`; got `{value}`"),
            )
        })?;
    }
    if let Some(days) = detection.interval_tolerance_days {
        policy.interval_tolerance_days = days;
    }
    if let Some(tolerance) = detection.amount_tolerance {
        policy.amount_tolerance = parse_amount_tolerance(tolerance)?;
    }

    Ok(policy)
}

fn parse_amount_tolerance(raw: RawAmountTolerance) -> ClientResult<AmountTolerance> {
    let kind = raw.kind.unwrap_or_else(|| "absolute".to_string());
    match kind.trim().to_ascii_lowercase().as_str() {
        "absolute" => Ok(AmountTolerance::Absolute(
            raw.value
                .unwrap_or(AmountTolerance::default().value()),
        )),
        "relative" => raw.value.map(AmountTolerance::Relative).ok_or_else(|| {
            ClientError::invalid_config(
                "amount_tolerance",
                "relative tolerance needs a `value` such as 0.10",
            )
        }),
        other => Err(ClientError::invalid_config(
            "amount_tolerance",
            &format!("`kind` must be `absolute` or `relative`; got `{other}`"),
        )),
    }
}

fn apply_overrides(
    mut policy: DetectionPolicy,
    overrides: &PolicyOverrides,
    command: &str,
) -> ClientResult<DetectionPolicy> {
    if let Some(value) = overrides.sign_convention.as_deref() {
        policy.sign_convention = SignConvention::parse(value).ok_or_else(|| {
            ClientError::invalid_argument_for_command(
                &format!(
                    "`--sign-convention` must be `negative_is_spend` or `positive_is_spend`; got `{value}`."
                ),
                Some(command),
            )
        })?;
    }

    match (overrides.absolute_tolerance, overrides.relative_tolerance) {
        (Some(_), Some(_)) => {
            return Err(ClientError::invalid_argument_for_command(
                "Pass either `--absolute-tolerance` or `--relative-tolerance`, not both.",
                Some(command),
            ));
        }
        (Some(amount), None) => policy.amount_tolerance = AmountTolerance::Absolute(amount),
        (None, Some(ratio)) => policy.amount_tolerance = AmountTolerance::Relative(ratio),
        (None, None) => {}
    }

    if let Some(days) = overrides.interval_tolerance_days {
        policy.interval_tolerance_days = days;
    }

    Ok(policy)
}
