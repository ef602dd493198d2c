//! Content hashing for cache-busting tokens.
//!
//! Uses blake3 so a token only changes when the file bytes change, regardless
//! of modification times or the platform building the stylesheet.
//!
//! ```ignore
//! let token = hash::fingerprint(&bytes);          // -> "a1b2c3d4"
//! let token = hash::fingerprint_file(&path)?;     // streaming read
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Length of the hex token appended to asset URLs.
pub const TOKEN_LEN: usize = 8;

/// Hash bytes and return the first `TOKEN_LEN` hex characters.
#[inline]
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    let hash = blake3::hash(data.as_ref());
    hex::encode(&hash.as_bytes()[..TOKEN_LEN / 2])
}

/// Hash a file's contents without loading it all at once.
pub fn fingerprint_file(path: &Path) -> io::Result<String> {
    let mut reader = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; 8192];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(&hasher.finalize().as_bytes()[..TOKEN_LEN / 2]))
}
