use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serenity::async_trait;
use tracing::info;

use super::queue_manager::PlaybackQueue;

/// Moves a queue on to its next track when songbird reports the current one ended or failed.
/// The same notifier is attached to both events; `fired` makes sure only one of them advances.
pub struct TrackEndNotifier {
    pub queue: Arc<PlaybackQueue>,
    pub track_title: String,
    pub fired: Arc<AtomicBool>,
}

#[async_trait]
impl songbird::EventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &songbird::EventContext<'_>) -> Option<songbird::Event> {
        if let songbird::EventContext::Track(_) = ctx {
            if self.fired.swap(true, Ordering::SeqCst) {
                return None;
            }
            info!(
                "Track '{}' ended for guild {}",
                self.track_title,
                self.queue.guild_id()
            );
            self.queue.advance().await;
        }
        None
    }
}
