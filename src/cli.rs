//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_LAYOUT: &str = "two_mon";

/// Generates i3 window manager configuration files based on detected
/// monitors and user-defined layouts.
#[derive(Debug, Parser)]
#[command(name = "i3gen", version, about)]
pub struct Cli {
    /// Path to the configuration file
    /// (default: ~/.config/i3gen/config.yaml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output path for the generated i3 configuration
    /// (default: ~/.i3/config)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Screen layout to render, as named in the configuration
    #[arg(short, long, default_value = DEFAULT_LAYOUT, value_name = "NAME")]
    pub layout: String,

    /// Directory checked for an i3.tmpl override of the built-in template
    #[arg(short, long, value_name = "DIR")]
    pub template_dir: Option<PathBuf>,
}

impl Cli {
    /// Output path with the default applied and `~` expanded.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .map(expand_tilde)
            .unwrap_or_else(default_output_path)
    }

    /// Config path with `~` expanded, if one was given.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().map(expand_tilde)
    }
}

fn default_output_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".i3").join("config"),
        None => PathBuf::from(".i3/config"),
    }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: PathBuf) -> PathBuf {
    let Some(home) = dirs::home_dir() else {
        return path;
    };
    if path == PathBuf::from("~") {
        return home;
    }
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_no_flags_given() {
        let cli = Cli::parse_from(["i3gen"]);
        assert_eq!(cli.layout, "two_mon");
        assert!(cli.config.is_none());
        assert!(cli.template_dir.is_none());
        assert!(cli.output_path().ends_with(".i3/config"));
    }

    #[test]
    fn short_and_long_flags_parse() {
        let cli = Cli::parse_from(["i3gen", "-l", "one_mon", "--output", "/tmp/i3config"]);
        assert_eq!(cli.layout, "one_mon");
        assert_eq!(cli.output_path(), PathBuf::from("/tmp/i3config"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(
            expand_tilde(PathBuf::from("~/my-config.yaml")),
            home.join("my-config.yaml")
        );
        assert_eq!(expand_tilde(PathBuf::from("~")), home);
        // No tilde: unchanged.
        assert_eq!(
            expand_tilde(PathBuf::from("/etc/i3gen.yaml")),
            PathBuf::from("/etc/i3gen.yaml")
        );
    }
}
