//! Plotly-compatible Sankey figure description.
//!
//! Serializes to the `{"data": [...], "layout": {...}}` shape accepted by
//! plotly.js `Plotly.newPlot` and by `plotly.io.from_json`.

use serde::{Deserialize, Serialize};

use crate::assemble::DiagramData;
use crate::NodeId;

/// Rendering constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureStyle {
    pub node_pad: f64,
    pub node_thickness: f64,
    pub node_line_color: String,
    pub node_line_width: f64,
    pub title_font_size: f64,
    /// Horizontal title anchor, 0-1.
    pub title_x: f64,
    pub template: String,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self {
            node_pad: 15.0,
            node_thickness: 20.0,
            node_line_color: "black".to_string(),
            node_line_width: 0.5,
            title_font_size: 14.0,
            title_x: 0.5,
            template: "seaborn".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyFigure {
    pub data: Vec<SankeyTrace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyTrace {
    #[serde(rename = "type")]
    pub kind: String,
    pub node: TraceNodes,
    pub link: TraceLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceNodes {
    pub pad: f64,
    pub thickness: f64,
    pub line: Line,
    /// Time-step label per node, shown on hover.
    pub customdata: Vec<String>,
    pub hovertemplate: String,
    pub label: Vec<String>,
    pub color: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceLinks {
    pub source: Vec<NodeId>,
    pub target: Vec<NodeId>,
    pub value: Vec<usize>,
    pub color: Vec<String>,
    /// Change description per link, shown on hover.
    pub customdata: Vec<String>,
    pub hovertemplate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: Title,
    pub font: Font,
    pub template: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
    pub x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub size: f64,
}

/// Wrap `data` in a single-trace Sankey figure. Layout is only emitted when
/// a title is given; the title is rendered bold.
pub fn figure(data: &DiagramData, title: Option<&str>, style: &FigureStyle) -> SankeyFigure {
    let trace = SankeyTrace {
        kind: "sankey".to_string(),
        node: TraceNodes {
            pad: style.node_pad,
            thickness: style.node_thickness,
            line: Line {
                color: style.node_line_color.clone(),
                width: style.node_line_width,
            },
            customdata: data.node_labels.clone(),
            hovertemplate: "%{customdata}<extra></extra>".to_string(),
            label: data.label.clone(),
            color: data.node_palette.clone(),
        },
        link: TraceLinks {
            source: data.source.clone(),
            target: data.target.clone(),
            value: data.value.clone(),
            color: data.link_palette.clone(),
            customdata: data.link_labels.clone(),
            hovertemplate: "%{customdata} <extra></extra>".to_string(),
        },
    };

    let layout = title.map(|t| Layout {
        title: Title {
            text: format!("<b>{t}</b>"),
            x: style.title_x,
        },
        font: Font {
            size: style.title_font_size,
        },
        template: style.template.clone(),
    });

    SankeyFigure {
        data: vec![trace],
        layout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> DiagramData {
        DiagramData {
            node_labels: vec!["2001".into(), "2016".into()],
            link_labels: vec!["100% of Forest remained Forest".into()],
            node_palette: vec!["#68ab5f".into(), "#68ab5f".into()],
            link_palette: vec!["#68ab5f".into()],
            label: vec!["Deciduous forest".into(), "Deciduous forest".into()],
            source: vec![0],
            target: vec![1],
            value: vec![12],
        }
    }

    #[test]
    fn untitled_figure_has_no_layout() {
        let fig = figure(&data(), None, &FigureStyle::default());
        let json = serde_json::to_value(&fig).unwrap();
        assert!(json.get("layout").is_none());
        assert_eq!(json["data"][0]["type"], "sankey");
        assert_eq!(json["data"][0]["node"]["pad"], 15.0);
        assert_eq!(json["data"][0]["link"]["value"][0], 12);
    }

    #[test]
    fn title_is_bold_and_centered() {
        let fig = figure(&data(), Some("Change 2001-2016"), &FigureStyle::default());
        let layout = fig.layout.unwrap();
        assert_eq!(layout.title.text, "<b>Change 2001-2016</b>");
        assert_eq!(layout.title.x, 0.5);
        assert_eq!(layout.font.size, 14.0);
        assert_eq!(layout.template, "seaborn");
    }

    #[test]
    fn style_defaults_fill_partial_config() {
        let style: FigureStyle = serde_json::from_str(r#"{"node_pad": 30}"#).unwrap();
        assert_eq!(style.node_pad, 30.0);
        assert_eq!(style.node_thickness, 20.0);
    }
}
