use anyhow::{Context, Result, anyhow};
use clap::{Args, Subcommand};
use std::io::Write;
use toml::Value;
use wave_core::EffectiveConfig;
use wave_core::config::{load_toml_table, project_config_path, user_config_path};

use crate::output::{OutputMode, fail};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Show resolved or raw configuration
    Show(ShowArgs),
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Show raw project config only
    #[arg(long, conflicts_with = "user")]
    project: bool,

    /// Show raw user config only
    #[arg(long)]
    user: bool,
}

pub fn run_config(
    args: &ConfigArgs,
    effective: &EffectiveConfig,
    output: OutputMode,
) -> Result<()> {
    match &args.command {
        ConfigCommand::Show(show) => run_show(show, effective, output),
    }
}

fn run_show(args: &ShowArgs, effective: &EffectiveConfig, output: OutputMode) -> Result<()> {
    if args.project {
        let table = load_toml_table(&project_config_path(&effective.project_root))
            .map_err(|err| fail(output, err))?;
        return print_toml_or_json(&Value::Table(table), output);
    }

    if args.user {
        let path = user_config_path()
            .ok_or_else(|| anyhow!("Unable to resolve user config directory"))?;
        let table = load_toml_table(&path).map_err(|err| fail(output, err))?;
        return print_toml_or_json(&Value::Table(table), output);
    }

    print_effective(effective, output)
}

fn print_toml_or_json(value: &Value, output: OutputMode) -> Result<()> {
    match output {
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputMode::Text | OutputMode::Pretty => println!("{}", toml::to_string_pretty(value)?),
    }
    Ok(())
}

fn print_effective(effective: &EffectiveConfig, output: OutputMode) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match output {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, effective)?;
            writeln!(out)?;
        }
        OutputMode::Text => {
            let value = Value::try_from(&effective.config)
                .context("config is not representable as TOML")?;
            for line in flatten_keys(&value) {
                writeln!(out, "{line}")?;
            }
        }
        OutputMode::Pretty => {
            writeln!(out, "# project: {}", effective.project_path.display())?;
            if let Some(user) = &effective.user_path {
                writeln!(out, "# user:    {}", user.display())?;
            }
            writeln!(out)?;
            write!(out, "{}", toml::to_string_pretty(&effective.config)?)?;
        }
    }
    Ok(())
}

/// `section.key=value` lines for every leaf of a TOML table.
fn flatten_keys(value: &Value) -> Vec<String> {
    let mut lines = Vec::new();
    flatten_into("", value, &mut lines);
    lines
}

fn flatten_into(prefix: &str, value: &Value, lines: &mut Vec<String>) {
    match value {
        Value::Table(table) => {
            for (key, child) in table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(&path, child, lines);
            }
        }
        Value::String(s) => lines.push(format!("{prefix}={s}")),
        other => lines.push(format!("{prefix}={other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wave_core::WaveConfig;

    #[test]
    fn flatten_defaults_lists_every_section() {
        let value = Value::try_from(WaveConfig::default()).expect("toml value");
        let lines = flatten_keys(&value);
        assert!(lines.contains(&"sources.default=local".to_string()));
        assert!(lines.contains(&"sources.remote=https://example.com/wave-data.json".to_string()));
        assert!(lines.contains(&"summarize.timeout_secs=60".to_string()));
        assert!(lines.contains(&"fetch.timeout_secs=30".to_string()));
        assert!(lines.contains(&"ui.author=CurrentUser".to_string()));
        assert!(lines.contains(&"diagnostics.enabled=true".to_string()));
    }

    #[test]
    fn flatten_nested_prefixes() {
        let value: Value = toml::from_str("[a]\nb = 1\n[a.c]\nd = \"x\"\n").expect("toml");
        assert_eq!(flatten_keys(&value), vec!["a.b=1".to_string(), "a.c.d=x".to_string()]);
    }
}
