use anyhow::{Context, Result, bail};
use std::io::{self, Write};
use std::path::Path;

use crate::client::QueryClient;
use crate::config::Config;
use crate::events::Turn;

/// One-shot query: print the assembled reply and exit
pub async fn ask(config: &Config, question: &str, as_json: bool) -> Result<()> {
    if question.is_empty() {
        bail!("no question provided");
    }

    let client = QueryClient::new(&config.endpoint)?;
    log::info!("asking {}", client.url());

    let reply = client
        .ask(question)
        .await
        .context("There was an error processing your request")?;

    let mut out = io::stdout().lock();
    if as_json {
        let turn = Turn::bot(reply);
        writeln!(out, "{}", serde_json::to_string(&turn)?)?;
    } else {
        writeln!(out, "{}", reply)?;
    }
    out.flush()?;

    Ok(())
}

/// Print the resolved configuration, optionally writing it to `path`
pub fn show_config(config: &Config, path: &Path, save: bool) -> Result<()> {
    if save {
        config.save(path)?;
        println!("# written to {}", path.display());
    } else {
        println!("# {}", path.display());
    }
    print!("{}", config.to_toml()?);
    Ok(())
}
