//! Echo builder.
//!
//! Logs a sequence of messages with step-wise progress. Mostly useful for
//! trying out a workspace configuration and for exercising the progress
//! protocol in tests.
//!
//! # Options
//!
//! - `message` (string): a single message to log.
//! - `messages` (array of strings): messages to log in order. Takes
//!   precedence over `message`.
//! - `count` (integer): with `message`, repeat it this many times.
//! - `fail` (boolean): report failure after logging everything.

use super::{optional_bool, optional_str, optional_u64, Builder, BuilderContext, BuilderOutput};
use crate::error::{ArchitectError, Result};
use serde_json::{Map, Value};

pub struct EchoBuilder;

impl Builder for EchoBuilder {
    fn run(&self, ctx: &BuilderContext, options: &Map<String, Value>) -> Result<BuilderOutput> {
        let fail = optional_bool("echo", options, "fail")?.unwrap_or(false);
        let messages = collect_messages(options)?;

        ctx.logger
            .debug(format!("echoing {} message(s)", messages.len()));
        ctx.progress.start(Some(messages.len() as u64), None);

        for (i, message) in messages.iter().enumerate() {
            ctx.logger.info(message.clone());
            ctx.progress.advance((i + 1) as u64, Some(message));
        }

        if fail {
            Ok(BuilderOutput::failure("echo builder was asked to fail"))
        } else {
            Ok(BuilderOutput::ok())
        }
    }
}

fn collect_messages(options: &Map<String, Value>) -> Result<Vec<String>> {
    if let Some(messages) = options.get("messages") {
        let Value::Array(messages) = messages else {
            return Err(ArchitectError::Execution(format!(
                "builder 'echo' option 'messages' must be an array of strings, got {}",
                messages
            )));
        };
        return messages
            .iter()
            .map(|m| match m {
                Value::String(s) => Ok(s.clone()),
                other => Err(ArchitectError::Execution(format!(
                    "builder 'echo' option 'messages' must contain only strings, got {}",
                    other
                ))),
            })
            .collect();
    }

    let Some(message) = optional_str("echo", options, "message")? else {
        return Ok(Vec::new());
    };
    let count = optional_u64("echo", options, "count")?.unwrap_or(1);
    Ok(vec![message.to_string(); count as usize])
}
