use crystalline_protocol::Message;
use futures_core::Stream;
use tokio::sync::mpsc;

use crate::error::ClientError;

/// Turn a session's message queue into a [`Stream`].
///
/// Each item is a decoded reply or the error that replaced it. The stream
/// ends when the session's listener stops (disconnect or server EOF).
pub fn message_stream(
    mut events: mpsc::Receiver<Result<Message, ClientError>>,
) -> impl Stream<Item = Result<Message, ClientError>> {
    async_stream::stream! {
        while let Some(item) = events.recv().await {
            yield item;
        }
    }
}
