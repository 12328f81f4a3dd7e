use sha2::{Digest, Sha256};

use crate::models::{Category, ReactionKind};

/// Hash of the author's ID, so repeated submissions from the same user can be
/// correlated in the audit log without revealing who they are.
pub fn author_hash(author_id: u64) -> String {
    format!("{:x}", Sha256::digest(author_id.to_string()))
}

/// Logs a confession event for auditing purposes.
/// The log includes the author hash, the category and the content.
pub fn log_confession(hash: &str, confession_id: &str, category: Category, content: &str) {
    log::warn!(
        "Confession received: {} | {} | {} | {}",
        hash,
        confession_id,
        category,
        content.replace('\n', " \\n ")
    );
}

pub fn log_reaction(confession_id: &str, kind: ReactionKind) {
    log::info!("Reaction {} on confession {}", kind.key(), confession_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_hash_is_stable_and_opaque() {
        let hash = author_hash(1234567890);
        assert_eq!(hash, author_hash(1234567890));
        assert_ne!(hash, author_hash(1234567891));
        assert_eq!(hash.len(), 64);
        assert!(!hash.contains("1234567890"));
    }
}
