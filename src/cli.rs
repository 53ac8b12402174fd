use std::path::PathBuf;

use clap::{Parser, Subcommand};

use auditcom_portal::config::{DEFAULT_API_URL, DEFAULT_DOWNLOAD_NAME, DEFAULT_SITE_ORIGIN};

#[derive(Parser, Debug)]
#[command(name = "auditcom")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base URL of the portal API
    #[arg(long, env = "AUDITCOM_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Origin that relative logo paths are resolved against
    #[arg(long, env = "AUDITCOM_SITE_ORIGIN", default_value = DEFAULT_SITE_ORIGIN)]
    pub site_origin: String,

    /// Directory holding teamItem.html and messageItem.html
    #[arg(long)]
    pub templates: Option<PathBuf>,

    /// HTTP proxy (e.g., http://127.0.0.1:7890)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "300")]
    pub timeout: u64,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the published reports
    List {
        /// Write the rendered page to this file instead of stdout
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Submit the report form and download the generated PDF
    Submit {
        /// Form field as name=value (repeatable)
        #[arg(short = 'F', long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// Tick the newsletter agreement box
        #[arg(long)]
        newsletter: bool,

        /// Output directory
        #[arg(short, long, env = "AUDITCOM_OUTPUT", default_value = ".")]
        output: PathBuf,

        /// File name of the downloaded report
        #[arg(long, default_value = DEFAULT_DOWNLOAD_NAME)]
        filename: String,
    },
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    if name.is_empty() {
        return Err(format!("empty field name in '{raw}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_submit_fields() {
        let args = Args::parse_from([
            "auditcom",
            "submit",
            "-F",
            "email=a@b.c",
            "--field",
            "company=ACME=1",
            "--newsletter",
        ]);
        match args.command {
            Command::Submit {
                fields, newsletter, ..
            } => {
                assert_eq!(fields[0], ("email".into(), "a@b.c".into()));
                assert_eq!(fields[1], ("company".into(), "ACME=1".into()));
                assert!(newsletter);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_field_without_value() {
        assert!(parse_field("email").is_err());
        assert!(parse_field("=x").is_err());
    }
}
