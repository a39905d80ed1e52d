use futures_util::{stream, Stream};
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::model::profile::Profile;

const FEED_CAPACITY: usize = 256;

/// In-process change feed of `profiles` rows.
#[derive(Clone, Debug)]
pub struct ProfileFeed {
    sender: broadcast::Sender<Profile>,
}

impl Default for ProfileFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }

    /// Returns the number of subscribers the change reached.
    pub fn publish(&self, profile: &Profile) -> usize {
        self.sender.send(profile.clone()).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Profile> {
        self.sender.subscribe()
    }

    /// Changes of a single profile row. Lagged receivers skip what they
    /// missed; the stream ends when the feed is dropped.
    pub fn watch(&self, profile_id: Uuid) -> impl Stream<Item = Profile> + Send + 'static {
        stream::unfold(self.subscribe(), move |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(profile) if profile.id == profile_id => return Some((profile, receiver)),
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("profile feed for {profile_id} lagged by {skipped}");
                        continue;
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
    }
}
