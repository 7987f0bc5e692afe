//! Duplicate detection for clipboard entries.
//!
//! Two policies live here:
//!
//! - consecutive: compare a new entry with the last processed entry of the same
//!   data type only ([`ConsecutiveDuplicateFilter`])
//! - history: compare against every stored entry of the same data type
//!   ([`find_history_duplicate`], [`plan_cleanup`], [`unique_newest`])
mod consecutive;
mod equality;
mod history;
mod key;

pub use consecutive::ConsecutiveDuplicateFilter;
pub use equality::{content_equals, entries_equal, file_paths_equal};
pub use history::{find_history_duplicate, plan_cleanup, unique_newest};
pub use key::{fnv1a_32, ContentKey, IMAGE_HASH_PREFIX_LEN};
