//! Uniform random picks behind the "random poem" action.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::CorpusError;
use crate::models::{PoetDetail, PoetSummary};
use crate::route::Location;

/// Any loaded poet, uniformly. `None` when nothing is loaded.
pub fn pick_poet<'a, R: Rng + ?Sized>(poets: &'a [PoetSummary], rng: &mut R) -> Option<&'a PoetSummary> {
    poets.choose(rng)
}

/// Where a random pick lands once the poet's document fetch settled: a random
/// poem when there is one, the bare poet page otherwise or on failure.
pub fn destination<R: Rng + ?Sized>(
    poet_id: &str,
    fetched: &Result<PoetDetail, CorpusError>,
    rng: &mut R,
) -> Location {
    match fetched {
        Ok(detail) if !detail.poems.is_empty() => {
            Location::poet(poet_id, Some(rng.gen_range(0..detail.poems.len())))
        }
        _ => Location::poet(poet_id, None),
    }
}
