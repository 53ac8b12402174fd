mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use auditcom_portal::form::SubmitState;
use auditcom_portal::message::TerminalStatus;
use auditcom_portal::models::NEWSLETTER_FIELD;
use auditcom_portal::progress::SystemClock;
use auditcom_portal::{Page, Settings};

use crate::cli::{Args, Command};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("auditcom={default_level},auditcom_portal={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn settings_from_args(args: &Args) -> Result<Settings> {
    let mut settings = Settings::default()
        .with_api_url(&args.api_url)
        .with_site_origin(&args.site_origin)
        .context("Invalid site origin")?;

    settings.template_dir = args.templates.clone();
    settings.proxy = args.proxy.clone();
    settings.request_timeout = Duration::from_secs(args.timeout);

    if let Command::Submit {
        output, filename, ..
    } = &args.command
    {
        settings.output_dir = output.clone();
        settings.download_name = filename.clone();
    }

    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let settings = settings_from_args(&args)?;
    let mut page = Page::bootstrap(
        settings,
        Arc::new(SystemClock),
        Box::new(TerminalStatus::new()),
    )
    .await
    .context("Failed to prepare the page")?;

    match args.command {
        Command::List { html } => {
            let rendered = page.load_list().await;
            let output = page.render_html().context("Failed to render the page")?;

            match html {
                Some(path) => {
                    tokio::fs::write(&path, output)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {} reports to {}", rendered, path.display());
                }
                None => print!("{output}"),
            }
        }
        Command::Submit {
            mut fields,
            newsletter,
            ..
        } => {
            if newsletter {
                fields.push((NEWSLETTER_FIELD.to_string(), "on".to_string()));
            }

            match page.submit(fields).await? {
                SubmitState::Success { path, bytes } => {
                    println!("Saved {} ({} bytes)", path.display(), bytes);
                }
                SubmitState::ValidationError { status } => {
                    return Err(anyhow!("The portal rejected the form (HTTP {status})"));
                }
                SubmitState::NetworkError { reason } => {
                    return Err(anyhow!("Download failed: {reason}"));
                }
                state => return Err(anyhow!("Unexpected submission state: {state:?}")),
            }
        }
    }

    Ok(())
}
