use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "gmail-unread",
    version,
    about = "Read unread Gmail messages and send replies"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "default",
        help = "Profile name to use"
    )]
    pub profile: String,
    #[arg(long, global = true, help = "Emit JSON output")]
    pub json: bool,
    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Verbose logging")]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Unread(UnreadArgs),
    Get(GetArgs),
    Send(SendArgs),
    Reply(ReplyArgs),
    Auth(AuthArgs),
}

#[derive(Debug, Args)]
pub struct UnreadArgs {
    #[arg(long, help = "Fetch messages with one batch request per chunk")]
    pub batch: bool,
    #[arg(long, conflicts_with = "batch", help = "Fetch messages one request at a time")]
    pub no_batch: bool,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    #[arg(help = "Gmail message id")]
    pub id: String,
}

#[derive(Debug, Args)]
pub struct BodyArgs {
    #[arg(long, help = "Inline body text")]
    pub body: Option<String>,
    #[arg(long, help = "Read body from file")]
    pub body_file: Option<PathBuf>,
    #[arg(long, help = "Read body from stdin")]
    pub stdin: bool,
    #[arg(long, action = ArgAction::Append, help = "Attach file (repeatable)")]
    pub attach: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SendArgs {
    #[arg(long, help = "Recipient address")]
    pub to: String,
    #[arg(long, help = "Sender address; defaults to the profile sender")]
    pub from: Option<String>,
    #[arg(long, visible_alias = "subj", default_value = "", help = "Email subject")]
    pub subject: String,
    #[command(flatten)]
    pub body: BodyArgs,
}

#[derive(Debug, Args)]
pub struct ReplyArgs {
    #[arg(help = "Gmail id of the message to reply to")]
    pub id: String,
    #[command(flatten)]
    pub body: BodyArgs,
}

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    Status,
}
