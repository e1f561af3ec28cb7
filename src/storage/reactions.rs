use anyhow::Result;

use super::schema::Database;
use super::types::{DatabaseError, ReactionKind};
use crate::reactions::{ReactionPersistence, ReactionSnapshot};

impl Database {
    // ========================================================================
    // Reaction Operations
    // ========================================================================

    /// Turn a reaction on or off for a meme.
    ///
    /// Setting an active reaction again only refreshes `updated_at`.
    pub async fn set_reaction(&self, meme_id: &str, kind: ReactionKind, active: bool) -> Result<()> {
        if active {
            sqlx::query(
                r#"
                INSERT INTO reactions (meme_id, kind, updated_at)
                VALUES (?, ?, datetime('now'))
                ON CONFLICT(meme_id, kind) DO UPDATE SET updated_at = excluded.updated_at
            "#,
            )
            .bind(meme_id)
            .bind(kind.as_str())
            .execute(&self.pool)
            .await?;
        } else {
            sqlx::query("DELETE FROM reactions WHERE meme_id = ? AND kind = ?")
                .bind(meme_id)
                .bind(kind.as_str())
                .execute(&self.pool)
                .await?;
        }

        tracing::debug!(meme_id, kind = kind.as_str(), active, "Reaction stored");
        Ok(())
    }

    /// Meme ids with the given reaction, most recent first.
    pub async fn get_reactions(&self, kind: ReactionKind) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT meme_id FROM reactions WHERE kind = ? ORDER BY updated_at DESC, meme_id",
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Every stored reaction.
    pub async fn load_reactions(&self) -> Result<ReactionSnapshot> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT meme_id, kind FROM reactions")
            .fetch_all(&self.pool)
            .await?;

        let mut snapshot = ReactionSnapshot::default();
        for (meme_id, kind) in rows {
            match ReactionKind::parse(&kind) {
                Some(ReactionKind::Like) => {
                    snapshot.liked.insert(meme_id);
                }
                Some(ReactionKind::Save) => {
                    snapshot.saved.insert(meme_id);
                }
                None => return Err(DatabaseError::Corrupt(kind).into()),
            }
        }
        Ok(snapshot)
    }
}

impl ReactionPersistence for Database {
    async fn load(&self) -> Result<ReactionSnapshot> {
        self.load_reactions().await
    }

    async fn save(&self, meme_id: &str, kind: ReactionKind, active: bool) -> Result<()> {
        self.set_reaction(meme_id, kind, active).await
    }
}
