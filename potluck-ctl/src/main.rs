use std::sync::Arc;

use anyhow::Context;
use potluck_client::{
    api::{AuthToken, CommentId, RecipeId},
    CommentThread, Config, ExpandedThreads, HttpCommentService, MemoryCredentials, ThreadState,
    ThreadView,
};

#[derive(structopt::StructOpt)]
struct Opt {
    /// Base url of the recipe API, overrides POTLUCK_HOST
    #[structopt(short, long)]
    host: Option<String>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Show the comment threads of a recipe
    List {
        recipe: i64,

        /// Show every reply instead of a preview
        #[structopt(long)]
        expand_all: bool,
    },

    /// Comment on a recipe, or reply to a comment
    Post {
        recipe: i64,

        content: String,

        /// Comment to reply to
        #[structopt(long)]
        parent: Option<i64>,
    },
}

fn token_from_env(var: &str) -> anyhow::Result<Option<AuthToken>> {
    match std::env::var(var) {
        Ok(tok) if !tok.trim().is_empty() => Ok(Some(AuthToken(tok.trim().to_string()))),
        Ok(_) | Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("retrieving {var} environment variable")),
    }
}

fn print_thread(view: &ThreadView) {
    println!(
        "#{} {}: {}",
        view.root.key(),
        view.root.author_name(),
        view.root.content()
    );
    for reply in &view.visible_replies {
        println!(
            "    #{} {} (to @{}): {}",
            reply.comment.key(),
            reply.comment.author_name(),
            reply.parent.author_name(),
            reply.comment.content()
        );
    }
    if view.hidden_count > 0 {
        println!("    ... {} more replies", view.hidden_count);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = <Opt as structopt::StructOpt>::from_args();

    let mut config = Config::from_env().context("reading configuration")?;
    if let Some(host) = opt.host {
        config.host = host;
    }
    let credentials = Arc::new(MemoryCredentials::new(
        token_from_env("POTLUCK_ACCESS_TOKEN")?,
        token_from_env("POTLUCK_REFRESH_TOKEN")?,
    ));
    let service = HttpCommentService::new(&config, credentials.clone());
    let mut thread = CommentThread::with_config(&config, service, credentials);

    match opt.cmd {
        Command::List { recipe, expand_all } => {
            let recipe = RecipeId(recipe);
            if thread.load(recipe).await.is_empty() {
                println!("No comments yet.");
                return Ok(());
            }
            let mut expanded = ExpandedThreads::new();
            if expand_all {
                for root in thread.forest() {
                    expanded.expand(root.comment.key());
                }
            }
            for view in thread.views(&expanded) {
                print_thread(&view);
            }
        }
        Command::Post {
            recipe,
            content,
            parent,
        } => {
            let mut state = ThreadState::default();
            let posted = thread
                .post(&mut state, RecipeId(recipe), &content, parent.map(CommentId))
                .await
                .with_context(|| format!("posting comment on recipe {recipe}"))?;
            match posted {
                Some(c) => {
                    tracing::debug!(id = %c.id, %recipe, "posted comment");
                    println!("Posted comment #{}", c.id);
                }
                None => println!("Nothing to post."),
            }
        }
    }

    Ok(())
}
