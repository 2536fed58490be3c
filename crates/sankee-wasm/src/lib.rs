use serde::Serialize;
use wasm_bindgen::prelude::*;

use sankee_core::scheme::{summary, SchemeName};
use sankee_core::{sankify_data, sankify_table, SampleTable, SankifyConfig};

/// Build a plotly Sankey figure from a sample table.
///
/// `table_json` is a serialized `SampleTable`, `scheme` a registry name such
/// as "NLCD2016", and `config_json` a `SankifyConfig` (an empty string uses
/// the defaults). The returned object can be passed to `Plotly.newPlot`.
#[wasm_bindgen]
pub fn sankify(table_json: &str, scheme: &str, config_json: &str) -> Result<JsValue, JsValue> {
    let (table, scheme, config) = parse_inputs(table_json, scheme, config_json)?;
    let fig = sankify_table(&table, &scheme, &config).map_err(to_js)?;
    to_value(&fig)
}

/// Same inputs as [`sankify`]; returns the raw node/link arrays instead.
#[wasm_bindgen(js_name = sankifyData)]
pub fn sankify_data_js(table_json: &str, scheme: &str, config_json: &str) -> Result<JsValue, JsValue> {
    let (table, scheme, config) = parse_inputs(table_json, scheme, config_json)?;
    let data = sankify_data(&table, &scheme, &config).map_err(to_js)?;
    to_value(&data)
}

/// Registry scheme names.
#[wasm_bindgen(js_name = schemeNames)]
pub fn scheme_names() -> Result<JsValue, JsValue> {
    to_value(&SchemeName::names())
}

/// id/label/color rows of one registry scheme.
#[wasm_bindgen(js_name = schemeSummary)]
pub fn scheme_summary(scheme: &str) -> Result<JsValue, JsValue> {
    let name: SchemeName = scheme.parse().map_err(to_js)?;
    to_value(&summary(&name.scheme()))
}

fn parse_inputs(
    table_json: &str,
    scheme: &str,
    config_json: &str,
) -> Result<(SampleTable, sankee_core::ClassificationScheme, SankifyConfig), JsValue> {
    let table: SampleTable = serde_json::from_str(table_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid table: {e}")))?;
    let name: SchemeName = scheme.parse().map_err(to_js)?;
    let config = if config_json.trim().is_empty() {
        SankifyConfig::default()
    } else {
        serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {e}")))?
    };
    Ok((table, name.scheme(), config))
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_js(err: sankee_core::SankeeError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
