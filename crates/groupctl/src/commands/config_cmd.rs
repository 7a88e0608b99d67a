//! Config subcommand handlers.

use dialoguer::{Input, Select};
use secrecy::{ExposeSecret, SecretString};
use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` with plaintext tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.api_token.is_some() {
            profile.api_token = Some("****".into());
        }
    }
    cfg
}

fn detail(cfg: &Config) -> String {
    let mut lines = vec![
        format!(
            "Default profile: {}",
            cfg.default_profile.as_deref().unwrap_or("-")
        ),
        format!("Output:          {}", cfg.defaults.output),
        format!("Timeout:         {}s", cfg.defaults.timeout),
        format!("Cache TTL:       {}s", cfg.defaults.cache_ttl),
    ];
    for (name, p) in &cfg.profiles {
        lines.push(String::new());
        lines.push(format!("[{name}]"));
        lines.push(format!("  Server:  {}", p.server));
        lines.push(format!("  Project: {}", p.project.as_deref().unwrap_or("-")));
        lines.push(format!("  Token:   {}", token_source(p)));
        if let Some(ref ca) = p.ca_cert {
            lines.push(format!("  CA cert: {}", ca.display()));
        }
        if p.insecure == Some(true) {
            lines.push("  TLS:     insecure".into());
        }
    }
    lines.join("\n")
}

/// Where a profile's token comes from, never the token itself.
fn token_source(p: &Profile) -> String {
    match (&p.api_token_env, &p.api_token) {
        (Some(env), _) => format!("${env}"),
        (None, Some(_)) => "**** (plaintext)".into(),
        (None, None) => "keyring".into(),
    }
}

#[derive(Clone, Tabled, serde::Serialize)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Default")]
    #[serde(rename = "default")]
    is_default: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "Project")]
    project: String,
}

fn read_token(prompt: &str) -> Result<SecretString, CliError> {
    let token = rpassword::prompt_password(prompt)?;
    if token.trim().is_empty() {
        return Err(CliError::Validation {
            field: "api_token".into(),
            reason: "API token cannot be empty".into(),
        });
    }
    Ok(SecretString::from(token.trim().to_owned()))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("groupctl configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Server URL
            let server: String = Input::new()
                .with_prompt("Server URL")
                .default("https://monitor.example.com".into())
                .validate_with(|s: &String| {
                    groupctl_config::parse_server_url(s)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            // 3. Project
            let project: String = Input::new()
                .with_prompt("Project")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            // 4. API token and where to keep it
            let token = read_token("API token: ")?;
            let store_choices = &[
                "Store in system keyring (recommended)",
                "Save to config file (plaintext)",
            ];
            let store_selection = Select::new()
                .with_prompt("Where to store the API token?")
                .items(store_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let api_token = if store_selection == 0 {
                groupctl_config::store_api_token(&profile_name, &token)?;
                eprintln!("   ✓ API token stored in system keyring");
                None
            } else {
                Some(token.expose_secret().to_owned())
            };

            // 5. Merge into the existing config
            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    server,
                    project: Some(project).filter(|p| !p.trim().is_empty()),
                    api_token,
                    ..Profile::default()
                },
            );
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: groupctl host-groups list");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(global.output, &cfg, detail, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let active = config::active_profile_name(global, &cfg);
            let rows: Vec<ProfileRow> = cfg
                .profiles
                .iter()
                .map(|(name, p)| ProfileRow {
                    name: name.clone(),
                    is_default: if *name == active { "*" } else { "" }.into(),
                    server: p.server.clone(),
                    project: p.project.clone().unwrap_or_default(),
                })
                .collect();
            let out = output::render_list(
                global.output,
                &rows,
                ProfileRow::clone,
                |r| r.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        // ── Set-token ───────────────────────────────────────────────
        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config_or_default();
            let name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }
            let token = read_token(&format!("API token for '{name}': "))?;
            groupctl_config::store_api_token(&name, &token)?;
            if !global.quiet {
                eprintln!("✓ API token for '{name}' stored in system keyring");
            }
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), false);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redaction_masks_only_plaintext_tokens() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                server: "https://monitor.lab".into(),
                api_token: Some("hunter2".into()),
                ..Profile::default()
            },
        );
        cfg.profiles.insert(
            "prod".into(),
            Profile {
                server: "https://monitor.prod".into(),
                api_token_env: Some("PROD_TOKEN".into()),
                ..Profile::default()
            },
        );

        let shown = redacted(&cfg);

        assert_eq!(shown.profiles["lab"].api_token.as_deref(), Some("****"));
        assert_eq!(shown.profiles["prod"].api_token, None);
        assert_eq!(token_source(&shown.profiles["prod"]), "$PROD_TOKEN");
        assert!(!detail(&shown).contains("hunter2"));
    }
}
