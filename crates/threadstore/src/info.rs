use serde::{Deserialize, Serialize};
use threadstore_types::{PeerId, ThreadId};

/// Summary of what the store knows about one thread.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadInfo {
    pub id: ThreadId,
    /// Logs with key material or addresses under this thread, sorted.
    pub logs: Vec<PeerId>,
}
