//! Substitution map normalization
//!
//! A batch can hold several revisions of one module. Each replaces its
//! predecessor, so the raw map for a batch may chain `A -> B -> C`. The
//! tree being copied only ever contains `A`, so the map handed to the
//! tree rebuild must say `A -> C`.

use std::collections::HashSet;

use super::errors::{ReconstructError, ReconstructResult};
use crate::archive::IdMap;

/// Collapses substitution chains.
///
/// Every key that is not itself a replacement maps to the end of its
/// chain. Intermediate keys are dropped. A map without chains comes back
/// unchanged.
///
/// # Errors
///
/// `CyclicSubstitution` if some chain never ends, or if a key can only be
/// reached through a cycle.
pub fn collapse_id_map(id_map: &IdMap) -> ReconstructResult<IdMap> {
    let replacements: HashSet<_> = id_map.values().copied().collect();
    let mut collapsed = IdMap::new();
    let mut covered = HashSet::new();

    for (&old, &new) in id_map {
        if replacements.contains(&old) {
            continue;
        }
        covered.insert(old);

        let mut seen = HashSet::from([old]);
        let mut end = new;
        while let Some(&next) = id_map.get(&end) {
            if !seen.insert(end) {
                return Err(ReconstructError::CyclicSubstitution(old));
            }
            covered.insert(end);
            end = next;
        }
        collapsed.insert(old, end);
    }

    if let Some(&stray) = id_map.keys().find(|k| !covered.contains(*k)) {
        return Err(ReconstructError::CyclicSubstitution(stray));
    }

    Ok(collapsed)
}
