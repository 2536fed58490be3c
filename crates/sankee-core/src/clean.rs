//! Pre-plot cleaning: class exclusion and class-count capping.
//!
//! Both steps drop whole rows. A row is removed as soon as any of its cells
//! holds a rejected class; cells are never remapped.

use std::collections::{BTreeSet, HashMap};

use crate::error::{Result, SankeeError};
use crate::table::SampleTable;
use crate::ClassCode;

/// Exclude `exclude` classes, then keep only the `max_classes` most frequent
/// classes. Both options are skipped when absent (or, for `exclude`, empty).
pub fn clean(
    table: &SampleTable,
    exclude: Option<&[ClassCode]>,
    max_classes: Option<usize>,
) -> Result<SampleTable> {
    let mut out = match exclude {
        Some(codes) if !codes.is_empty() => {
            exclude_classes(table, &codes.iter().copied().collect())
        }
        _ => table.clone(),
    };
    if let Some(k) = max_classes {
        out = limit_classes(&out, k)?;
    }
    Ok(out)
}

/// Drop every row containing an excluded class in any column.
pub fn exclude_classes(table: &SampleTable, exclude: &BTreeSet<ClassCode>) -> SampleTable {
    let out = table.retain_rows(|r| !table.row(r).flatten().any(|c| exclude.contains(&c)));
    log::debug!(
        "excluding {:?} dropped {} of {} rows",
        exclude,
        table.n_rows() - out.n_rows(),
        table.n_rows()
    );
    out
}

/// Class frequencies over every cell of the table, most frequent first.
/// Equal counts are ordered by ascending class code.
pub fn rank_classes(table: &SampleTable) -> Vec<(ClassCode, usize)> {
    let mut counts: HashMap<ClassCode, usize> = HashMap::new();
    for col in table.columns() {
        for &code in col.values.iter().flatten() {
            *counts.entry(code).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(ClassCode, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}

/// Keep rows whose classes all rank within the top `max_classes`.
pub fn limit_classes(table: &SampleTable, max_classes: usize) -> Result<SampleTable> {
    if max_classes == 0 {
        return Err(SankeeError::InvalidConfig(
            "max_classes must be at least 1".to_string(),
        ));
    }
    let ranked = rank_classes(table);
    if max_classes >= ranked.len() {
        return Ok(table.clone());
    }
    let (kept, dropped) = ranked.split_at(max_classes);
    log::debug!(
        "keeping {} most frequent classes, dropping {:?}",
        max_classes,
        dropped.iter().map(|&(c, _)| c).collect::<Vec<_>>()
    );
    let retained: BTreeSet<ClassCode> = kept.iter().map(|&(c, _)| c).collect();
    Ok(table.retain_rows(|r| table.row(r).flatten().all(|c| retained.contains(&c))))
}
