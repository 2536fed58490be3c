//! Diagram assembly: transition records → parallel node/link arrays.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SankeeError};
use crate::reshape::{TransitionRecord, Transitions};
use crate::scheme::{get_color, ClassificationScheme};
use crate::NodeId;

/// Node and link arrays for a Sankey renderer.
///
/// Node arrays (`node_labels`, `node_palette`, `label`) are indexed by
/// [`NodeId`]. Link arrays (`link_labels`, `link_palette`, `source`,
/// `target`, `value`) follow record emission order, pair by pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramData {
    /// Time-step label of each node.
    pub node_labels: Vec<String>,
    /// Hover text of each link.
    pub link_labels: Vec<String>,
    pub node_palette: Vec<String>,
    /// Colour of each link's source node.
    pub link_palette: Vec<String>,
    /// Class label of each node.
    pub label: Vec<String>,
    pub source: Vec<NodeId>,
    pub target: Vec<NodeId>,
    pub value: Vec<usize>,
}

impl DiagramData {
    pub fn node_count(&self) -> usize {
        self.label.len()
    }

    pub fn link_count(&self) -> usize {
        self.value.len()
    }
}

/// Integer percent of `count` over `total`, rounded half-up.
fn rounded_percent(count: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    (200 * count + total) / (2 * total)
}

/// Hover text for one link, e.g. "50% of Forest remained Forest".
pub fn link_label(record: &TransitionRecord) -> String {
    let percent = rounded_percent(record.count, record.source_total);
    let verb = if record.source_label == record.target_label {
        "remained"
    } else {
        "became"
    };
    format!(
        "{percent}% of {} {verb} {}",
        record.source_label, record.target_label
    )
}

pub fn assemble(transitions: &Transitions, scheme: &ClassificationScheme) -> Result<DiagramData> {
    let Some(last) = transitions.pairs.last() else {
        return Err(SankeeError::InvalidInput("no column pairs to assemble".to_string()));
    };

    let mut data = DiagramData::default();

    for pair in &transitions.pairs {
        for node in &pair.source_nodes {
            push_node(&mut data, node.id, &pair.source_column, &node.label)?;
        }
        for record in &pair.records {
            data.link_labels.push(link_label(record));
            data.source.push(record.source_index);
            data.target.push(record.target_index);
            data.value.push(record.count);
        }
    }
    for node in &last.target_nodes {
        push_node(&mut data, node.id, &last.target_column, &node.label)?;
    }

    data.node_palette = data
        .label
        .iter()
        .map(|l| get_color(scheme, l).map(str::to_string))
        .collect::<Result<Vec<_>>>()?;
    data.link_palette = data
        .source
        .iter()
        .map(|&id| data.node_palette[id].clone())
        .collect();

    log::info!(
        "assembled {} nodes and {} links over {} time steps",
        data.node_count(),
        data.link_count(),
        transitions.pairs.len() + 1
    );
    Ok(data)
}

fn push_node(data: &mut DiagramData, id: NodeId, column: &str, label: &str) -> Result<()> {
    if id != data.label.len() {
        return Err(SankeeError::InvalidInput(format!(
            "node id {id} out of sequence, expected {}",
            data.label.len()
        )));
    }
    data.node_labels.push(column.to_string());
    data.label.push(label.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::reshape::reshape;
    use crate::scheme::custom;
    use crate::table::SampleTable;
    use crate::ClassCode;

    const A: ClassCode = 1;
    const B: ClassCode = 2;
    const C: ClassCode = 3;

    fn scheme() -> ClassificationScheme {
        custom(
            BTreeMap::from([
                (A, "Forest".to_string()),
                (B, "Urban".to_string()),
                (C, "Water".to_string()),
            ]),
            BTreeMap::from([
                (A, "#00ff00".to_string()),
                (B, "#ff0000".to_string()),
                (C, "#0000ff".to_string()),
            ]),
        )
        .unwrap()
    }

    fn diagram(names: &[&str], rows: &[Vec<ClassCode>]) -> DiagramData {
        let table = SampleTable::from_rows(names, rows).unwrap();
        assemble(&reshape(&table, &scheme()).unwrap(), &scheme()).unwrap()
    }

    fn record(source: &str, target: &str, count: usize, total: usize) -> TransitionRecord {
        TransitionRecord {
            source_index: 0,
            target_index: 1,
            source_class: A,
            target_class: B,
            source_label: source.to_string(),
            target_label: target.to_string(),
            count,
            source_total: total,
            change_fraction: count as f64 / total as f64,
        }
    }

    #[test]
    fn forest_urban_scenario() {
        let d = diagram(
            &["t0", "t1"],
            &[vec![A, A], vec![A, B], vec![B, B], vec![B, B]],
        );
        assert_eq!(d.node_labels, vec!["t0", "t0", "t1", "t1"]);
        assert_eq!(d.label, vec!["Forest", "Urban", "Forest", "Urban"]);
        assert_eq!(d.source, vec![0, 0, 1]);
        assert_eq!(d.target, vec![2, 3, 3]);
        assert_eq!(d.value, vec![1, 1, 2]);
        assert_eq!(
            d.link_labels,
            vec![
                "50% of Forest remained Forest",
                "50% of Forest became Urban",
                "100% of Urban remained Urban",
            ]
        );
        assert_eq!(d.node_palette, vec!["#00ff00", "#ff0000", "#00ff00", "#ff0000"]);
        assert_eq!(d.link_palette, vec!["#00ff00", "#00ff00", "#ff0000"]);
    }

    #[test]
    fn two_by_two_has_four_nodes() {
        let d = diagram(
            &["t0", "t1"],
            &[vec![A, B], vec![B, A], vec![A, A], vec![B, A]],
        );
        assert_eq!(d.node_count(), 4);
        assert!(d.link_count() <= 4);
    }

    #[test]
    fn three_steps_share_middle_nodes() {
        let d = diagram(
            &["2001", "2008", "2016"],
            &[vec![A, A, C], vec![B, A, A], vec![A, C, C]],
        );
        // 2001: A, B. 2008: A, C. 2016: C, A.
        assert_eq!(
            d.node_labels,
            vec!["2001", "2001", "2008", "2008", "2016", "2016"]
        );
        assert_eq!(d.label, vec!["Forest", "Urban", "Forest", "Water", "Water", "Forest"]);
        assert!(d.source.iter().chain(&d.target).all(|&id| id < d.node_count()));
        assert_eq!(d.link_labels.len(), d.link_palette.len());
        assert_eq!(d.source.len(), d.value.len());
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(link_label(&record("Forest", "Urban", 1, 8)), "13% of Forest became Urban");
        assert_eq!(link_label(&record("Forest", "Urban", 1, 3)), "33% of Forest became Urban");
        assert_eq!(link_label(&record("Urban", "Urban", 1, 200)), "1% of Urban remained Urban");
    }

    #[test]
    fn exact_halves_round_up_despite_float_error() {
        // 23 / 40 * 100 is 57.49999999999999 in f64.
        assert_eq!(link_label(&record("Forest", "Forest", 23, 40)), "58% of Forest remained Forest");
        assert_eq!(link_label(&record("Forest", "Urban", 29, 200)), "15% of Forest became Urban");
        assert_eq!(link_label(&record("Forest", "Urban", 69, 120)), "58% of Forest became Urban");
    }

    #[test]
    fn hover_text_from_sampled_rows_rounds_half_up() {
        let mut rows = vec![vec![A, A]; 23];
        rows.extend(vec![vec![A, B]; 17]);
        let d = diagram(&["2001", "2016"], &rows);
        assert_eq!(
            d.link_labels,
            vec!["58% of Forest remained Forest", "43% of Forest became Urban"]
        );
    }

    #[test]
    fn empty_transitions_rejected() {
        let err = assemble(&Transitions { pairs: Vec::new() }, &scheme()).unwrap_err();
        assert!(matches!(err, SankeeError::InvalidInput(_)));
    }

    #[test]
    fn label_missing_from_scheme_fails() {
        let table = SampleTable::from_rows(&["t0", "t1"], &[vec![A, B]]).unwrap();
        let tr = reshape(&table, &scheme()).unwrap();
        let mut other = scheme();
        other.labels.insert(B, "Built-up".to_string());
        assert!(matches!(
            assemble(&tr, &other),
            Err(SankeeError::UnknownClass { .. })
        ));
    }
}
