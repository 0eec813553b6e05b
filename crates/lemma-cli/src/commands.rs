use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use serde_json::json;

use lemma_codec::AddressCodec;
use lemma_server::{LemmaServer, ServerConfig};
use lemma_types::{Address, NodeId};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Hashid(args) => cmd_hashid(args, cli.format),
        Command::Config(args) => cmd_config(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ServerConfig> {
    ServerConfig::load(path).with_context(|| match path {
        Some(path) => format!("loading configuration from {}", path.display()),
        None => "loading configuration from the environment".to_string(),
    })
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    println!("{} Lemma Chain on {}", "▶".green().bold(), config.bind_addr.to_string().bold());

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(async move {
        let server = LemmaServer::new(config)?;
        server.serve().await?;
        Ok::<_, anyhow::Error>(())
    })
}

fn cmd_hashid(args: HashidArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let codec = AddressCodec::new(&config.codec).context("building address codec")?;
    let line = match args.action {
        HashidAction::Encode { id } => encode_line(&codec, id, format),
        HashidAction::Decode { hashid } => decode_line(&codec, &hashid, format)?,
    };
    println!("{line}");
    Ok(())
}

fn encode_line(codec: &AddressCodec, id: u64, format: OutputFormat) -> String {
    let hashid = codec.encode(NodeId::new(id));
    match format {
        OutputFormat::Text => format!("{} {} {}", id.to_string().cyan(), "→".dimmed(), hashid.yellow().bold()),
        OutputFormat::Json => json!({ "id": id, "hashid": hashid }).to_string(),
    }
}

fn decode_line(codec: &AddressCodec, raw: &str, format: OutputFormat) -> anyhow::Result<String> {
    let address = Address::parse(raw).with_context(|| format!("{raw:?} is not an address"))?;
    let id = codec
        .decode(&address.hashid)
        .with_context(|| format!("{:?} is not a valid hashid", address.hashid))?;
    Ok(match format {
        OutputFormat::Text => format!("{} {} {}", raw.yellow().bold(), "→".dimmed(), id.get().to_string().cyan()),
        OutputFormat::Json => json!({
            "hashid": address.hashid,
            "owner": address.owner,
            "id": id.get(),
        })
        .to_string(),
    })
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    print!("{}", config.to_toml()?);
    Ok(())
}
