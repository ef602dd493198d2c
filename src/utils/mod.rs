//! Shared helpers: process execution, hashing, MIME lookup and path math.

pub mod exec;
pub mod hash;
pub mod mime;
pub mod path;
mod plural;

pub use plural::plural_count;
