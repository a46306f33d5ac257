pub mod callback;
pub mod general_message;
pub mod message;

use teloxide::{dispatching::UpdateHandler, prelude::*};

use crate::database::connection::DatabaseManager;

/// Sent whenever a command fails for reasons the user can't fix.
pub const TRANSIENT_ERROR_TEXT: &str =
    "😕 Something went wrong on our side. Please try again in a moment.";

pub struct BotHandler {
    pub db: DatabaseManager,
}

impl BotHandler {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    pub fn schema(&self) -> UpdateHandler<teloxide::RequestError> {
        use teloxide::dispatching::UpdateFilterExt;

        let db_command = self.db.clone();
        let db_message = self.db.clone();
        let db_callback = self.db.clone();

        dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<crate::bot::commands::Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: crate::bot::commands::Command| {
                        let db = db_command.clone();
                        async move { message::command_handler(bot, msg, cmd, db).await }
                    }),
            )
            .branch(Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
                let db = db_message.clone();
                async move { general_message::handle_general_message(bot, msg, db).await }
            }))
            .branch(Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                let db = db_callback.clone();
                async move { callback::callback_handler(bot, q, db).await }
            }))
    }
}
