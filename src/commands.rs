use std::path::{Path, PathBuf};

use akismet::{AkismetClient, Comment};
use comfy_table::{Row, Table};
use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use log::info;
use miette::{miette, IntoDiagnostic};
use reqwest::Client;

use crate::{CommentArgs, Config};

#[derive(Clone, Copy)]
pub enum Feedback {
    Spam,
    Ham,
}

pub fn connect(conf: &Config) -> miette::Result<AkismetClient> {
    let user_agent = conf
        .user_agent
        .clone()
        .unwrap_or_else(|| format!("akismet/{}", env!("CARGO_PKG_VERSION")));
    let http = Client::builder()
        .user_agent(user_agent)
        .build()
        .into_diagnostic()?;

    let client = AkismetClient::builder()
        .blog(&conf.blog)
        .api_key(&conf.key)
        .http_client(http)
        .strict(conf.strict)
        .build()?;

    Ok(client)
}

pub async fn verify_key(client: &AkismetClient) -> miette::Result<()> {
    if client.verify_key().await? {
        println!("API key is valid for {}", client.blog());
        Ok(())
    } else {
        Err(miette!("Akismet rejected the API key for {}", client.blog()))
    }
}

pub async fn check(
    client: &AkismetClient,
    files: &[PathBuf],
    args: &CommentArgs,
) -> miette::Result<()> {
    let mut table = Table::new();
    table.set_header(Row::from(vec!["Source", "Author", "Verdict"]));

    if files.is_empty() {
        let comment = load_comment(None, args)?;
        table.add_row(row("command line", &comment, client.check_spam(&comment).await?));
    }

    for file in files {
        let comment = load_comment(Some(file.as_path()), args)?;
        let spam = client.check_spam(&comment).await?;
        info!("{}: {}", file.display(), if spam { "spam" } else { "ham" });
        table.add_row(row(&file.display().to_string(), &comment, spam));
    }

    println!("{table}");
    Ok(())
}

pub async fn submit(
    client: &AkismetClient,
    feedback: Feedback,
    file: Option<&Path>,
    args: &CommentArgs,
) -> miette::Result<()> {
    let comment = load_comment(file, args)?;

    let ack = match feedback {
        Feedback::Spam => client.submit_spam(&comment).await?,
        Feedback::Ham => client.submit_ham(&comment).await?,
    };

    println!("{ack}");
    Ok(())
}

fn row(source: &str, comment: &Comment, spam: bool) -> Row {
    Row::from(vec![
        source,
        comment.author.as_deref().unwrap_or("-"),
        if spam { "spam" } else { "ham" },
    ])
}

/// Comment defaults, then the file (if any), then command line flags.
fn load_comment(file: Option<&Path>, args: &CommentArgs) -> miette::Result<Comment> {
    let mut figment = Figment::from(Serialized::defaults(Comment::default()));

    if let Some(path) = file {
        if !path.is_file() {
            return Err(miette!("comment file {} does not exist", path.display()));
        }
        figment = figment.merge(Toml::file(path));
    }

    let comment: Comment = figment
        .merge(Serialized::defaults(args))
        .extract()
        .into_diagnostic()?;

    Ok(if args.test {
        comment.with_test_mode()
    } else {
        comment
    })
}
