use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lemma",
    about = "Lemma Chain: immutable content graphs with short, owner-scoped addresses",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Convert between node identities and hashids
    Hashid(HashidArgs),
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Address to listen on, overriding configuration
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct HashidArgs {
    /// TOML configuration file supplying the codec settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub action: HashidAction,
}

#[derive(Subcommand)]
pub enum HashidAction {
    /// Encode a numeric identity
    Encode { id: u64 },
    /// Decode a hashid or `@owner/hashid` address
    Decode { hashid: String },
}

#[derive(Args)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve() {
        let cli = Cli::try_parse_from(["lemma", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.bind.unwrap().port(), 8080);
        assert!(args.config.is_none());
    }

    #[test]
    fn parses_hashid_actions() {
        let cli = Cli::try_parse_from(["lemma", "--format", "json", "hashid", "encode", "42"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Command::Hashid(HashidArgs { action: HashidAction::Encode { id: 42 }, .. })
        ));

        let cli = Cli::try_parse_from(["lemma", "hashid", "decode", "@alice/abc123"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Hashid(HashidArgs { action: HashidAction::Decode { ref hashid }, .. }) if hashid == "@alice/abc123"
        ));
    }

    #[test]
    fn rejects_bad_bind() {
        assert!(Cli::try_parse_from(["lemma", "serve", "--bind", "nowhere"]).is_err());
    }
}
