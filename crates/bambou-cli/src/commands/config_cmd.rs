//! Config subcommand handlers.

use std::fmt::Write;
use std::io::BufRead;

use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, ConfigInitArgs, GlobalOpts, SetPasswordArgs};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// Format config for display, masking secrets.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "page_size = {}", cfg.defaults.page_size);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "url = \"{}\"", p.url);
        let _ = writeln!(out, "organization = \"{}\"", p.organization);
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if let Some(ref cert) = p.certificate {
            let _ = writeln!(out, "certificate = \"{}\"", cert.display());
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(page_size) = p.page_size {
            let _ = writeln!(out, "page_size = {page_size}");
        }
    }

    out
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            output::print_output(format_config_redacted(&cfg).trim_end(), global.quiet);
            Ok(())
        }
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
        ConfigCommand::Init(args) => init(args, global),
        ConfigCommand::SetPassword(args) => set_password(args, global, std::io::stdin().lock()),
    }
}

fn init(args: ConfigInitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config()?;
    let name = args
        .name
        .unwrap_or_else(|| config::active_profile_name(global, &cfg));

    let profile = config::profile_from_flags(global)?;
    cfg.profiles.insert(name.clone(), profile);
    if args.default {
        cfg.default_profile = Some(name.clone());
    }

    config::save_config(&cfg)?;
    tracing::info!(profile = %name, "profile written");
    output::print_output(&config::config_path().display().to_string(), global.quiet);
    Ok(())
}

fn set_password(args: SetPasswordArgs, global: &GlobalOpts, input: impl BufRead) -> Result<(), CliError> {
    let name = match args.name {
        Some(name) => name,
        None => config::active_profile_name(global, &config::load_config()?),
    };
    let password = read_password(input)?;

    config::store_password(&name, &password)?;
    tracing::info!(profile = %name, "password stored in keyring");
    Ok(())
}

/// First line of `input`, without the line ending.
fn read_password(mut input: impl BufRead) -> Result<SecretString, CliError> {
    let mut line = String::new();
    input.read_line(&mut line)?;

    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "expected the password on standard input".into(),
        });
    }
    Ok(SecretString::from(password.to_owned()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use bambou_config::Profile;
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn redacted_config_masks_password() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                url: "https://vsd:8443/nuage/api/v6".into(),
                username: Some("csproot".into()),
                password: Some("hunter2".into()),
                organization: "csp".into(),
                ..Profile::default()
            },
        );

        let text = format_config_redacted(&cfg);
        assert!(text.contains("[profiles.lab]"));
        assert!(text.contains("username = \"csproot\""));
        assert!(text.contains("password = \"****\""));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn password_is_first_line_of_input() {
        let password = read_password("s3cret pass\r\nignored\n".as_bytes()).unwrap();
        assert_eq!(password.expose_secret(), "s3cret pass");
    }

    #[test]
    fn empty_password_input_is_rejected() {
        assert!(matches!(
            read_password("\n".as_bytes()),
            Err(CliError::Validation { .. })
        ));
        assert!(read_password("".as_bytes()).is_err());
    }
}
