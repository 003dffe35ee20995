use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{debug, error};

use crate::apis::DataSource;
use crate::commands::{self, CommandCall};
use crate::config::Config;
use crate::platform::Reply;

pub const FAILURE_REPLY: &str =
    "⚠️ Não consegui completar o pedido agora. Tente novamente mais tarde.";

/// Shared application state. Read-only after startup.
pub struct AppState {
    config: Config,
    source: Box<dyn DataSource>,
}

impl AppState {
    pub fn new(config: Config, source: Box<dyn DataSource>) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Run one command to completion and produce its reply.
///
/// Never fails: handler errors and panics are logged and answered with
/// [`FAILURE_REPLY`], so one bad update cannot stop the ones after it.
pub async fn respond(state: &AppState, call: &CommandCall) -> Reply {
    let name = call.command.name();
    debug!("Running /{} with {} argument(s)", name, call.args.len());

    let outcome = AssertUnwindSafe(commands::handle(call, state.source.as_ref()))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(reply)) => reply,
        Ok(Err(e)) => {
            error!("/{} failed: {:#}", name, e);
            Reply::text(FAILURE_REPLY)
        }
        Err(panic) => {
            error!("/{} panicked: {}", name, panic_message(panic.as_ref()));
            Reply::text(FAILURE_REPLY)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
