//! Content digests for change detection
//!
//! A board hash is the SHA-256 of its canonical serialization, hex encoded.
//! Equal hashes mean nothing changed; when they differ, [`crate::diff`]
//! says what.

use sha2::{Digest, Sha256};

use crate::board::{serialize_board, Board};
use crate::error::Result;

/// SHA-256 of the UTF-8 bytes of `content`, lowercase hex.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hash of a board's canonical serialization.
pub fn hash_board(board: &Board) -> Result<String> {
    Ok(hash_content(&serialize_board(board)?))
}
