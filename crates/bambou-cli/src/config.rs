//! CLI configuration: a thin layer over `bambou_config`.
//!
//! Merges `GlobalOpts` flag overrides (--url, --username, ...) into the
//! selected profile before the shared crate resolves credentials.

use std::time::Duration;

use bambou::SessionConfig;

use clap::ValueEnum;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use bambou_config::{Config, Profile, config_path, load_config, save_config, store_password};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `SessionConfig` from the config file, profile, and CLI flags.
///
/// CLI flags take priority over profile values. Without a matching
/// profile, the flags alone must describe the VSD.
pub fn resolve_session_config(global: &GlobalOpts, cfg: &Config) -> Result<SessionConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
            names.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if names.is_empty() {
                    "(none)".into()
                } else {
                    names.join(", ")
                },
            });
        }
        None if global.url.is_none() => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
        None => Profile {
            organization: "csp".into(),
            ..Profile::default()
        },
    };

    apply_overrides(&mut profile, global);

    let mut session = bambou_config::profile_to_session_config(&profile, &profile_name, &cfg.defaults)?;
    if let Some(secs) = global.timeout {
        session.timeout = Duration::from_secs(secs);
    }
    Ok(session)
}

/// The output format: `--output` if given, else `defaults.output`.
pub fn resolve_output(global: &GlobalOpts, cfg: &Config) -> Result<OutputFormat, CliError> {
    if let Some(format) = global.output {
        return Ok(format);
    }
    OutputFormat::from_str(&cfg.defaults.output, true).map_err(|reason| CliError::Validation {
        field: "defaults.output".into(),
        reason,
    })
}

/// A new profile described entirely by the connection flags.
pub fn profile_from_flags(global: &GlobalOpts) -> Result<Profile, CliError> {
    if global.url.is_none() {
        return Err(CliError::Validation {
            field: "url".into(),
            reason: "pass --url (or set BAMBOU_URL) to describe the VSD".into(),
        });
    }

    let mut profile = Profile {
        organization: "csp".into(),
        ..Profile::default()
    };
    apply_overrides(&mut profile, global);
    Ok(profile)
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if let Some(ref organization) = global.organization {
        profile.organization.clone_from(organization);
    }
    if let Some(ref certificate) = global.certificate {
        profile.certificate = Some(certificate.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["bambou"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["config", "path"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn output_falls_back_to_config_default() {
        let mut cfg = Config::default();
        cfg.defaults.output = "yaml".into();

        assert_eq!(resolve_output(&global(&[]), &cfg).unwrap(), OutputFormat::Yaml);
        assert_eq!(
            resolve_output(&global(&["-o", "plain"]), &cfg).unwrap(),
            OutputFormat::Plain
        );
    }

    #[test]
    fn unknown_output_default_is_rejected() {
        let mut cfg = Config::default();
        cfg.defaults.output = "xml".into();

        let err = resolve_output(&global(&[]), &cfg).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "defaults.output"));
    }

    #[test]
    fn profile_from_flags_requires_url() {
        assert!(profile_from_flags(&global(&["-u", "csproot"])).is_err());

        let profile = profile_from_flags(&global(&[
            "--url",
            "https://vsd:8443/nuage/api/v6",
            "-u",
            "csproot",
            "-k",
        ]))
        .unwrap();
        assert_eq!(profile.url, "https://vsd:8443/nuage/api/v6");
        assert_eq!(profile.username.as_deref(), Some("csproot"));
        assert_eq!(profile.organization, "csp");
        assert_eq!(profile.insecure, Some(true));
        assert!(profile.password.is_none());
    }
}
