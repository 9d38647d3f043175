//! Loading many records on the rayon pool.

use rayon::prelude::*;

use crate::record::{LoadOptions, Record};
use crate::Result;

/// Parse each slice as one record.
///
/// Results come back in input order. Slices are independent, so one failure
/// does not affect the others.
pub fn load_all(slices: &[&[u8]], options: &LoadOptions<'_>) -> Vec<Result<Record>> {
    slices
        .par_iter()
        .map(|bytes| Record::parse(bytes, options))
        .collect()
}
