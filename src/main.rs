mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use log::LevelFilter;
use miette::IntoDiagnostic;
use serde::{Deserialize, Serialize};

use commands::Feedback;

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the configuration file
    #[arg(short, long, default_value = "akismet.toml")]
    config: PathBuf,
    /// Log requests and responses
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check that the configured API key is valid for the blog
    VerifyKey,
    /// Ask Akismet whether one or more comments are spam
    Check {
        /// TOML files describing comments; the flags below are used when none are given
        files: Vec<PathBuf>,
        #[command(flatten)]
        comment: CommentArgs,
    },
    /// Report a comment that should have been caught as spam
    Spam {
        file: Option<PathBuf>,
        #[command(flatten)]
        comment: CommentArgs,
    },
    /// Report a legitimate comment that was flagged as spam
    Ham {
        file: Option<PathBuf>,
        #[command(flatten)]
        comment: CommentArgs,
    },
}

/// Comment fields given on the command line. These win over values read from
/// a comment file.
#[derive(Args, Serialize)]
pub struct CommentArgs {
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    user_ip: Option<String>,
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    user_agent: Option<String>,
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    referrer: Option<String>,
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    permalink: Option<String>,
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    comment_type: Option<String>,
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    author_email: Option<String>,
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    author_url: Option<String>,
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    /// Mark the request as a test query
    #[arg(long)]
    #[serde(skip)]
    test: bool,
}

#[derive(Deserialize)]
pub struct Config {
    key: String,
    blog: String,
    #[serde(default)]
    strict: bool,
    user_agent: Option<String>,
}

/// `--verbose` only raises this crate's level. reqwest logs the keyed host at
/// debug, so other crates stay at whatever `RUST_LOG` says.
fn logger(verbose: bool) -> env_logger::Builder {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_module("akismet", log_level);
    builder
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    logger(cli.verbose).init();

    let config: Config = Figment::new()
        .merge(Toml::file(&cli.config))
        .merge(Env::prefixed("AKISMET_"))
        .extract()
        .into_diagnostic()?;

    let client = commands::connect(&config)?;

    match cli.command {
        Command::VerifyKey => commands::verify_key(&client).await?,
        Command::Check { files, comment } => commands::check(&client, &files, &comment).await?,
        Command::Spam { file, comment } => {
            commands::submit(&client, Feedback::Spam, file.as_deref(), &comment).await?
        }
        Command::Ham { file, comment } => {
            commands::submit(&client, Feedback::Ham, file.as_deref(), &comment).await?
        }
    }

    Ok(())
}
