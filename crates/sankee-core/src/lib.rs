//! Land-cover change as Sankey diagrams.
//!
//! Pipeline: a [`SampleTable`] of class codes per point and time step is
//! cleaned ([`clean`]), reshaped into transition records between adjacent
//! time steps ([`reshape`]) and assembled into parallel node/link arrays
//! ([`assemble`]) that any Sankey renderer can draw. [`figure`] wraps the
//! arrays in a plotly-compatible description.

pub mod assemble;
pub mod clean;
pub mod error;
pub mod figure;
pub mod pipeline;
pub mod reshape;
pub mod sampler;
pub mod scheme;
pub mod table;

/// Integer key of a land-cover class within one scheme.
pub type ClassCode = i32;

/// Index of a (time step, class) node in the diagram.
pub type NodeId = usize;

pub use assemble::{assemble, link_label, DiagramData};
pub use clean::clean;
pub use error::{Result, SankeeError};
pub use figure::{figure, FigureStyle, SankeyFigure};
pub use pipeline::{sankify, sankify_data, sankify_table, SankifyConfig};
pub use reshape::{reshape, TransitionRecord, Transitions};
pub use sampler::{sample, GridSampler, SampleRequest, Sampler};
pub use scheme::{ClassificationScheme, SchemeName};
pub use table::{Column, SampleTable};
