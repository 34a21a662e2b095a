//! Executor collaborator: bounded data-parallel map over partition work.

use anyhow::Result;
use rayon::prelude::*;

/// Map `f` over `items` with at most `limit` workers in flight, collecting
/// results in input order. The first worker error fails the whole batch.
pub fn map_collect<T, R, F>(items: &[T], limit: usize, f: F) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Sync + Fn(&T) -> Result<R>,
{
    if limit <= 1 {
        return items.iter().map(&f).collect();
    }
    let mut out = Vec::with_capacity(items.len());
    for chunk in items.chunks(limit) {
        let part: Vec<R> = chunk.par_iter().map(|t| f(t)).collect::<Result<Vec<R>>>()?;
        out.extend(part);
    }
    Ok(out)
}
