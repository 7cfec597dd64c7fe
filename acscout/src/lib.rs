//! Multi-pattern byte search built on an Aho-Corasick automaton.
//!
//! Patterns are added to a [`TrieBuilder`], which compiles them into an immutable
//! [`Automaton`]. The automaton reports every occurrence of every pattern in a single
//! left-to-right pass, can be shared across threads, and can be persisted with
//! [`codec::encode`] / [`codec::decode`].
//!
//! ```
//! use acscout::TrieBuilder;
//!
//! let mut builder = TrieBuilder::new();
//! builder.add_strings(["he", "she", "his", "hers"]);
//! let automaton = builder.build();
//!
//! let found: Vec<&[u8]> = automaton
//!     .find_all("ushers")
//!     .iter()
//!     .map(|m| m.as_bytes())
//!     .collect();
//! assert_eq!(found, vec![&b"she"[..], &b"he"[..], &b"hers"[..]]);
//! ```

pub mod automaton;
pub mod builder;
pub mod codec;
pub mod config;
pub mod errors;
pub mod loader;
pub mod metrics;
pub mod pool;
pub mod results;
pub mod scan;

pub use automaton::{Automaton, Match, MatchRecord};
pub use builder::TrieBuilder;
pub use codec::{decode, encode};
pub use config::ScanConfig;
pub use errors::{AcError, AcResult};
pub use pool::{MatchPool, PooledMatches};
pub use results::{FileResult, ScanOutput};
