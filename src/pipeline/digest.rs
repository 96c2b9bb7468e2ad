// src/pipeline/digest.rs

//! Content digest over the ranked list, for change detection.

use sha2::{Digest, Sha256};

use crate::models::RankedLink;

/// Compute a stable digest of a ranked list.
///
/// Pairs are resorted by rank, rendered as `"<rank>:<url>"` lines and
/// hashed with SHA-256, returned as lowercase hex. Used only for equality
/// comparison between cycles, never for anything security-sensitive.
pub fn list_digest(links: &[RankedLink]) -> String {
    let mut sorted: Vec<&RankedLink> = links.iter().collect();
    sorted.sort_by_key(|link| link.rank);

    let canonical = sorted
        .iter()
        .map(|link| format!("{}:{}", link.rank, link.url))
        .collect::<Vec<_>>()
        .join("\n");

    hex::encode(Sha256::digest(canonical.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(rank: u32, url: &str) -> RankedLink {
        RankedLink {
            rank,
            url: url.to_string(),
        }
    }

    #[test]
    fn digest_is_order_independent() {
        let in_order = vec![link(1, "https://a"), link(2, "https://b")];
        let shuffled = vec![link(2, "https://b"), link(1, "https://a")];

        assert_eq!(list_digest(&in_order), list_digest(&shuffled));
    }

    #[test]
    fn digest_changes_when_a_url_changes() {
        let original = vec![link(1, "https://a"), link(2, "https://b")];
        let changed = vec![link(1, "https://a"), link(2, "https://c")];

        assert_ne!(list_digest(&original), list_digest(&changed));
    }

    #[test]
    fn digest_changes_when_a_rank_changes() {
        let original = vec![link(1, "https://a"), link(2, "https://b")];
        let swapped = vec![link(2, "https://a"), link(1, "https://b")];

        assert_ne!(list_digest(&original), list_digest(&swapped));
    }

    #[test]
    fn digest_is_lowercase_hex() {
        let digest = list_digest(&[link(1, "https://a")]);
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn empty_list_has_a_digest() {
        assert_eq!(list_digest(&[]), list_digest(&[]));
    }
}
