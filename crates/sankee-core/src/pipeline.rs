//! End-to-end entry points: sample → clean → reshape → assemble → figure.

use serde::{Deserialize, Serialize};

use crate::assemble::{assemble, DiagramData};
use crate::clean::clean;
use crate::error::Result;
use crate::figure::{figure, FigureStyle, SankeyFigure};
use crate::reshape::reshape;
use crate::sampler::{sample, SampleRequest, Sampler};
use crate::scheme::ClassificationScheme;
use crate::table::SampleTable;
use crate::ClassCode;

/// Options for turning a sample table into a figure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SankifyConfig {
    /// Classes whose rows are removed before plotting.
    pub exclude: Vec<ClassCode>,
    /// Keep only this many of the most frequent classes.
    pub max_classes: Option<usize>,
    pub title: Option<String>,
    pub style: FigureStyle,
}

/// Clean, reshape and assemble `table`.
pub fn sankify_data(
    table: &SampleTable,
    scheme: &ClassificationScheme,
    config: &SankifyConfig,
) -> Result<DiagramData> {
    let cleaned = clean(table, Some(config.exclude.as_slice()), config.max_classes)?;
    log::info!(
        "cleaned table: {} of {} rows kept, {} classes",
        cleaned.n_rows(),
        table.n_rows(),
        cleaned.distinct_classes().len()
    );
    let transitions = reshape(&cleaned, scheme)?;
    assemble(&transitions, scheme)
}

/// [`sankify_data`] followed by figure construction.
pub fn sankify_table(
    table: &SampleTable,
    scheme: &ClassificationScheme,
    config: &SankifyConfig,
) -> Result<SankeyFigure> {
    let data = sankify_data(table, scheme, config)?;
    Ok(figure(&data, config.title.as_deref(), &config.style))
}

/// Sample the imagery once, then build the figure from the materialized table.
pub fn sankify<S: Sampler + ?Sized>(
    sampler: &S,
    request: &SampleRequest,
    scheme: &ClassificationScheme,
    config: &SankifyConfig,
) -> Result<SankeyFigure> {
    let table = sample(sampler, request, Some(scheme))?;
    sankify_table(&table, scheme, config)
}
