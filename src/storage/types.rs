use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The reactions file is held by another memefeed process.
    #[error("Another instance of memefeed appears to be running. Please close it and try again.")]
    InstanceLocked,

    #[error("Database migration failed: {0}")]
    Migration(String),

    /// A `kind` column value outside `like`/`save`.
    #[error("Corrupt reaction row: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Map busy/locked/cannot-open failures to [`DatabaseError::InstanceLocked`].
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        let message = err.to_string().to_lowercase();
        if message.contains("database is locked")
            || message.contains("database table is locked")
            || message.contains("sqlite_busy")
            || message.contains("sqlite_locked")
            || message.contains("unable to open database file")
        {
            return DatabaseError::InstanceLocked;
        }

        DatabaseError::Other(err)
    }
}

// ============================================================================
// Reactions
// ============================================================================

/// The two per-meme toggles a viewer can set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionKind {
    Like,
    Save,
}

impl ReactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Save => "save",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "like" => Some(ReactionKind::Like),
            "save" => Some(ReactionKind::Save),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_errors_map_to_instance_locked() {
        let err = sqlx::Error::Protocol("Database is locked".to_string());
        assert!(matches!(DatabaseError::from_sqlx(err), DatabaseError::InstanceLocked));

        let err = sqlx::Error::Protocol("no such table: reactions".to_string());
        assert!(matches!(DatabaseError::from_sqlx(err), DatabaseError::Other(_)));
    }

    #[test]
    fn test_reaction_kind_parse() {
        assert_eq!(ReactionKind::parse("like"), Some(ReactionKind::Like));
        assert_eq!(ReactionKind::parse(ReactionKind::Save.as_str()), Some(ReactionKind::Save));
        assert_eq!(ReactionKind::parse("LIKE"), None);
    }
}
