//! Likes and saves, owned by the application shell.
//!
//! [`ReactionStore`] is the single owner of the viewer's like/save flags. It is
//! handed to whoever renders meme cards instead of living in ambient global
//! state, and it writes every mutation through a [`ReactionPersistence`] port.

use anyhow::Result;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Mutex;

use crate::api::Meme;
use crate::storage::ReactionKind;

/// Point-in-time copy of all reactions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionSnapshot {
    pub liked: HashSet<String>,
    pub saved: HashSet<String>,
}

/// Where reactions are loaded from and written to.
pub trait ReactionPersistence: Send + Sync {
    fn load(&self) -> impl Future<Output = Result<ReactionSnapshot>> + Send;

    fn save(
        &self,
        meme_id: &str,
        kind: ReactionKind,
        active: bool,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Persistence that only lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryReactions {
    inner: Mutex<ReactionSnapshot>,
}

impl MemoryReactions {
    pub fn snapshot(&self) -> ReactionSnapshot {
        self.inner
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl ReactionPersistence for MemoryReactions {
    async fn load(&self) -> Result<ReactionSnapshot> {
        Ok(self.snapshot())
    }

    async fn save(&self, meme_id: &str, kind: ReactionKind, active: bool) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("reaction store lock poisoned"))?;
        let set = match kind {
            ReactionKind::Like => &mut guard.liked,
            ReactionKind::Save => &mut guard.saved,
        };
        if active {
            set.insert(meme_id.to_string());
        } else {
            set.remove(meme_id);
        }
        Ok(())
    }
}

pub struct ReactionStore<P: ReactionPersistence> {
    persistence: P,
    state: ReactionSnapshot,
}

impl<P: ReactionPersistence> ReactionStore<P> {
    /// Restore reactions from `persistence`.
    ///
    /// A failed load is logged and the store starts empty.
    pub async fn load(persistence: P) -> Self {
        let state = match persistence.load().await {
            Ok(state) => {
                tracing::debug!(
                    liked = state.liked.len(),
                    saved = state.saved.len(),
                    "Reactions restored"
                );
                state
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load reactions, starting empty");
                ReactionSnapshot::default()
            }
        };
        Self { persistence, state }
    }

    pub fn is_liked(&self, meme_id: &str) -> bool {
        self.state.liked.contains(meme_id)
    }

    pub fn is_saved(&self, meme_id: &str) -> bool {
        self.state.saved.contains(meme_id)
    }

    /// Like count as shown to this viewer: a liked meme counts one more.
    pub fn display_likes(&self, meme: &Meme) -> u64 {
        if self.is_liked(&meme.id) {
            meme.likes.saturating_add(1)
        } else {
            meme.likes
        }
    }

    pub fn snapshot(&self) -> &ReactionSnapshot {
        &self.state
    }

    /// Flip the like flag. Returns the new value.
    pub async fn toggle_like(&mut self, meme_id: &str) -> bool {
        self.toggle(meme_id, ReactionKind::Like).await
    }

    /// Flip the save flag. Returns the new value.
    pub async fn toggle_save(&mut self, meme_id: &str) -> bool {
        self.toggle(meme_id, ReactionKind::Save).await
    }

    async fn toggle(&mut self, meme_id: &str, kind: ReactionKind) -> bool {
        let set = match kind {
            ReactionKind::Like => &mut self.state.liked,
            ReactionKind::Save => &mut self.state.saved,
        };
        let active = if set.remove(meme_id) {
            false
        } else {
            set.insert(meme_id.to_string());
            true
        };

        // In-memory state stays authoritative for this session if the write fails.
        if let Err(e) = self.persistence.save(meme_id, kind, active).await {
            tracing::warn!(meme_id, kind = kind.as_str(), error = %e, "Failed to persist reaction");
        }
        active
    }
}
