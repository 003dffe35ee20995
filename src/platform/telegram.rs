use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, Me, ParseMode};
use tracing::{debug, info, warn};

use crate::bot::{self, AppState};
use crate::commands::{self, CommandCall};
use crate::platform::Reply;

/// Telegram rejects messages longer than 4096 UTF-16 code units.
const MAX_MESSAGE_UNITS: usize = 4096;

/// Every update gets exactly one message back, so an oversized reply is cut
/// at a char boundary and marked with an ellipsis instead of being split.
fn fit_message(text: &str) -> String {
    if text.encode_utf16().count() <= MAX_MESSAGE_UNITS {
        return text.to_string();
    }

    let budget = MAX_MESSAGE_UNITS - '…'.len_utf16();
    let mut used = 0;
    let mut end = 0;
    for (i, c) in text.char_indices() {
        used += c.len_utf16();
        if used > budget {
            break;
        }
        end = i + c.len_utf8();
    }

    format!("{}…", &text[..end])
}

/// Run the Telegram dispatch loop until the process is interrupted.
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let bot = Bot::new(&state.config().telegram.bot_token);

    info!("Starting Telegram platform...");

    if let Err(e) = bot.set_my_commands(commands::bot_commands()).await {
        warn!("Failed to register command menu: {}", e);
    }

    let handler = Update::filter_message()
        .filter_map(|msg: Message, me: Me| {
            let text = msg.text()?;
            CommandCall::parse(text, me.username())
        })
        .endpoint(handle_command);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            debug!("Ignoring update {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Telegram platform stopped");
    Ok(())
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    call: CommandCall,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    info!(
        "/{} from chat {} ({} args)",
        call.command.name(),
        msg.chat.id,
        call.args.len()
    );

    let reply = bot::respond(&state, &call).await;
    send_reply(&bot, msg.chat.id, reply).await
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> ResponseResult<()> {
    match reply {
        Reply::Text(text) => {
            bot.send_message(chat_id, fit_message(&text)).await?;
        }
        Reply::Html(text) => {
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Reply::Animation(url) => {
            bot.send_animation(chat_id, InputFile::url(url)).await?;
        }
    }
    Ok(())
}
