//! Queue protocol layered on top of the store
//!
//! - `claim`: the peek/claim/retry loop that hands each worker an
//!   exclusively owned URL
//! - `load`: bulk-loading a newline-delimited URL file as `NEW` records

mod claim;
mod load;

pub use claim::{claim_next, ClaimOutcome};
pub use load::{load_urls, parse_url_list, LoadReport};
