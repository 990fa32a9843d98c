pub mod auth;
pub mod get;
pub mod reply;
pub mod send;
pub mod unread;

use std::fs;
use std::io::{self, Read};

use crate::cli::BodyArgs;
use crate::error::{AppError, AppResult};

pub(crate) fn read_body(args: &BodyArgs) -> AppResult<String> {
    let selected = [args.body.is_some(), args.body_file.is_some(), args.stdin]
        .into_iter()
        .filter(|selected| *selected)
        .count();

    if selected == 0 {
        return Err(AppError::InvalidInput(
            "missing body source; pass one of --body, --body-file, or --stdin".to_string(),
        ));
    }

    if selected > 1 {
        return Err(AppError::InvalidInput(
            "pass only one body source: --body, --body-file, or --stdin".to_string(),
        ));
    }

    if let Some(body) = &args.body {
        return Ok(body.clone());
    }

    if let Some(path) = &args.body_file {
        return Ok(fs::read_to_string(path)?);
    }

    let mut body = String::new();
    io::stdin().read_to_string(&mut body)?;
    Ok(body)
}

pub(crate) fn attachment_paths(args: &BodyArgs) -> Vec<String> {
    args.attach
        .iter()
        .map(|path| path.to_string_lossy().to_string())
        .collect()
}
