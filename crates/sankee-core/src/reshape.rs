//! Transition reshaping: wide sample table → weighted links between nodes.
//!
//! Adjacent column pairs are processed left to right. Each pair assigns node
//! ids to the distinct classes of its source column, then to the distinct
//! classes of its target column, and counts the rows moving between them.
//!
//! Node ids are threaded through the chain: the smallest target id of pair
//! `i` is the first source id of pair `i + 1`. Both sides enumerate the
//! shared column in first-appearance order, so a (time step, class) node has
//! the same id as a target of one pair and a source of the next. Ids run
//! from 0 to `node_count() - 1` without gaps.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SankeeError};
use crate::scheme::{label_of, ClassificationScheme};
use crate::table::SampleTable;
use crate::{ClassCode, NodeId};

/// A (time step, class) node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub class: ClassCode,
    pub label: String,
}

/// Aggregated rows moving from one class to another between two adjacent
/// time steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub source_index: NodeId,
    pub target_index: NodeId,
    pub source_class: ClassCode,
    pub target_class: ClassCode,
    pub source_label: String,
    pub target_label: String,
    pub count: usize,
    /// Rows leaving the source node across all its links.
    pub source_total: usize,
    /// `count` over `source_total`.
    pub change_fraction: f64,
}

/// Everything produced for one adjacent column pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairTransitions {
    pub pair_index: usize,
    pub source_column: String,
    pub target_column: String,
    /// Source nodes in id order.
    pub source_nodes: Vec<Node>,
    /// Target nodes in id order.
    pub target_nodes: Vec<Node>,
    /// Ordered by (source class, target class).
    pub records: Vec<TransitionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transitions {
    pub pairs: Vec<PairTransitions>,
}

impl Transitions {
    /// Records of every pair, tagged with their pair index, in emission order.
    pub fn records(&self) -> impl Iterator<Item = (usize, &TransitionRecord)> {
        self.pairs
            .iter()
            .flat_map(|p| p.records.iter().map(move |r| (p.pair_index, r)))
    }

    /// Number of distinct nodes across the chain.
    pub fn node_count(&self) -> usize {
        match self.pairs.last() {
            Some(last) => last.target_nodes.last().map_or(0, |n| n.id + 1),
            None => 0,
        }
    }
}

/// Progress through the column chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainState {
    Ready,
    Processing { pair_index: usize, offset: NodeId },
    Done,
}

/// Convert `table` into transition records for every adjacent column pair.
///
/// Fails with `InvalidInput` for fewer than two columns, zero rows or a
/// missing cell, and with `UnknownClass` for a class the scheme lacks.
pub fn reshape(table: &SampleTable, scheme: &ClassificationScheme) -> Result<Transitions> {
    if table.n_columns() < 2 {
        return Err(SankeeError::InvalidInput(format!(
            "need at least two time steps, got {}",
            table.n_columns()
        )));
    }
    if table.is_empty() {
        return Err(SankeeError::InvalidInput("table has no rows".to_string()));
    }

    let n_pairs = table.n_columns() - 1;
    let mut pairs = Vec::with_capacity(n_pairs);
    let mut state = ChainState::Ready;

    loop {
        state = match state {
            ChainState::Ready => ChainState::Processing {
                pair_index: 0,
                offset: 0,
            },
            ChainState::Processing { pair_index, offset } => {
                let (pair, next_offset) = reshape_pair(table, pair_index, offset, scheme)?;
                pairs.push(pair);
                if pair_index + 1 < n_pairs {
                    ChainState::Processing {
                        pair_index: pair_index + 1,
                        offset: next_offset,
                    }
                } else {
                    ChainState::Done
                }
            }
            ChainState::Done => break,
        };
    }

    Ok(Transitions { pairs })
}

/// Reshape columns `pair_index` and `pair_index + 1`, numbering source nodes
/// from `offset`. Returns the pair and the offset for the next pair.
fn reshape_pair(
    table: &SampleTable,
    pair_index: usize,
    offset: NodeId,
    scheme: &ClassificationScheme,
) -> Result<(PairTransitions, NodeId)> {
    let source_col = &table.columns()[pair_index];
    let target_col = &table.columns()[pair_index + 1];
    let source_values = complete_values(source_col.name.as_str(), &source_col.values)?;
    let target_values = complete_values(target_col.name.as_str(), &target_col.values)?;

    let source_nodes = number_nodes(&source_values, offset, scheme)?;
    let target_offset = offset + source_nodes.len();
    let target_nodes = number_nodes(&target_values, target_offset, scheme)?;

    let source_ids: HashMap<ClassCode, &Node> = source_nodes.iter().map(|n| (n.class, n)).collect();
    let target_ids: HashMap<ClassCode, &Node> = target_nodes.iter().map(|n| (n.class, n)).collect();

    let mut counts: BTreeMap<(ClassCode, ClassCode), usize> = BTreeMap::new();
    let mut outgoing: HashMap<ClassCode, usize> = HashMap::new();
    for (&s, &t) in source_values.iter().zip(&target_values) {
        *counts.entry((s, t)).or_insert(0) += 1;
        *outgoing.entry(s).or_insert(0) += 1;
    }

    let records = counts
        .into_iter()
        .map(|((s, t), count)| {
            let src = source_ids[&s];
            let tgt = target_ids[&t];
            let source_total = outgoing[&s];
            TransitionRecord {
                source_index: src.id,
                target_index: tgt.id,
                source_class: s,
                target_class: t,
                source_label: src.label.clone(),
                target_label: tgt.label.clone(),
                count,
                source_total,
                change_fraction: count as f64 / source_total as f64,
            }
        })
        .collect::<Vec<_>>();

    log::debug!(
        "pair {pair_index} ({} → {}): {} source nodes from id {offset}, {} target nodes, {} links",
        source_col.name,
        target_col.name,
        source_nodes.len(),
        target_nodes.len(),
        records.len()
    );

    let pair = PairTransitions {
        pair_index,
        source_column: source_col.name.clone(),
        target_column: target_col.name.clone(),
        source_nodes,
        target_nodes,
        records,
    };
    Ok((pair, target_offset))
}

fn complete_values(column: &str, values: &[Option<ClassCode>]) -> Result<Vec<ClassCode>> {
    values
        .iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                SankeeError::InvalidInput(format!(
                    "missing class value in column {column:?}, row {row}"
                ))
            })
        })
        .collect()
}

/// Distinct classes of `values` in first-appearance order, numbered from
/// `first_id`.
fn number_nodes(
    values: &[ClassCode],
    first_id: NodeId,
    scheme: &ClassificationScheme,
) -> Result<Vec<Node>> {
    let mut nodes: Vec<Node> = Vec::new();
    let mut seen: HashSet<ClassCode> = HashSet::new();
    for &class in values {
        if !seen.insert(class) {
            continue;
        }
        nodes.push(Node {
            id: first_id + nodes.len(),
            class,
            label: label_of(scheme, class)?.to_string(),
        });
    }
    Ok(nodes)
}
