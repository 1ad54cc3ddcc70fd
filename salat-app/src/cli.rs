use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "salat", version, about = "Daily prayer times from najaf.org")]
pub struct Cli {
    /// YAML config file; `salat.yaml` in the working directory is used when present.
    #[arg(long, short, global = true, env = "SALAT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print today's schedule.
    Show(ShowOpts),
    /// Keep printing the schedule, refreshing at each local midnight.
    Watch(ShowOpts),
}

impl Default for Command {
    fn default() -> Self {
        Command::Show(ShowOpts::default())
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct ShowOpts {
    /// Print the times exactly as the page published them.
    #[arg(long)]
    pub raw: bool,
    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
    /// Every published event in page order, under the page's own labels.
    #[arg(long)]
    pub all: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_defaults_to_show() {
        let cli = Cli::try_parse_from(["salat"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(Command::default(), Command::Show(ShowOpts { all: false, .. })));
    }

    #[test]
    fn show_flags_and_global_config() {
        let cli =
            Cli::try_parse_from(["salat", "show", "--all", "--json", "--config", "x.yaml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("x.yaml")));
        match cli.command {
            Some(Command::Show(opts)) => assert!(opts.all && opts.json && !opts.raw),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn watch_accepts_show_flags() {
        let cli = Cli::try_parse_from(["salat", "watch", "--raw"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Watch(ShowOpts { raw: true, .. }))));
    }
}
