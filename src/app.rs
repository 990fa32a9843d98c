use crate::cli::{Cli, Command};
use crate::commands;
use crate::context::AppContext;
use crate::error::AppResult;

pub async fn run(cli: Cli) -> AppResult<()> {
    let Cli {
        profile,
        json,
        verbose: _,
        command,
    } = cli;

    let ctx = AppContext::bootstrap(profile, json)?;

    match command {
        Command::Unread(args) => commands::unread::run(&ctx, args).await,
        Command::Get(args) => commands::get::run(&ctx, args).await,
        Command::Send(args) => commands::send::run(&ctx, args).await,
        Command::Reply(args) => commands::reply::run(&ctx, args).await,
        Command::Auth(args) => commands::auth::run(&ctx, args.command).await,
    }
}
