//! Classification schemes: class code → (label, colour) lookups.
//!
//! A scheme is an immutable value. The built-in registry lives in
//! [`registry`]; ad-hoc schemes are built with [`custom`]. All derived
//! behaviour is exposed as free functions over `&ClassificationScheme`.

pub mod registry;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SankeeError};
use crate::ClassCode;

pub use registry::SchemeName;

/// Name given to schemes assembled from explicit labels and palette.
pub const CUSTOM_SCHEME: &str = "custom";

/// Marker appended by [`list_images`] when the listing was truncated.
pub const TRUNCATION_MARKER: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationScheme {
    pub name: String,
    /// Identifier of the image collection the scheme describes.
    pub collection_id: String,
    /// Image band holding the class values.
    pub band: String,
    pub labels: BTreeMap<ClassCode, String>,
    /// Hex colour per class code.
    pub palette: BTreeMap<ClassCode, String>,
}

/// One row of [`summary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeEntry {
    pub id: ClassCode,
    pub label: String,
    pub color: String,
}

/// Label for `code`, or `UnknownClass`.
pub fn label_of<'a>(scheme: &'a ClassificationScheme, code: ClassCode) -> Result<&'a str> {
    scheme
        .labels
        .get(&code)
        .map(String::as_str)
        .ok_or_else(|| SankeeError::unknown_code(code, &scheme.name))
}

/// Colour of the first class (in code order) whose label is `label`.
pub fn get_color<'a>(scheme: &'a ClassificationScheme, label: &str) -> Result<&'a str> {
    let code = scheme
        .labels
        .iter()
        .find(|(_, l)| l.as_str() == label)
        .map(|(&code, _)| code)
        .ok_or_else(|| SankeeError::unknown_label(label, &scheme.name))?;
    scheme
        .palette
        .get(&code)
        .map(String::as_str)
        .ok_or_else(|| SankeeError::unknown_code(code, &scheme.name))
}

/// All class codes of the scheme, ascending.
pub fn keys(scheme: &ClassificationScheme) -> Vec<ClassCode> {
    scheme.labels.keys().copied().collect()
}

/// Tabular id/label/colour view. Classes without a palette entry get an
/// empty colour.
pub fn summary(scheme: &ClassificationScheme) -> Vec<SchemeEntry> {
    scheme
        .labels
        .iter()
        .map(|(&id, label)| SchemeEntry {
            id,
            label: label.clone(),
            color: scheme.palette.get(&id).cloned().unwrap_or_default(),
        })
        .collect()
}

/// Build a scheme from explicit labels and palette. Every labelled class
/// must have a colour.
pub fn custom(
    labels: BTreeMap<ClassCode, String>,
    palette: BTreeMap<ClassCode, String>,
) -> Result<ClassificationScheme> {
    if let Some(&code) = labels.keys().find(|code| !palette.contains_key(code)) {
        return Err(SankeeError::unknown_code(code, CUSTOM_SCHEME));
    }
    Ok(ClassificationScheme {
        name: CUSTOM_SCHEME.to_string(),
        collection_id: String::new(),
        band: String::new(),
        labels,
        palette,
    })
}

/// Pick the active scheme: a named scheme wins, otherwise explicit labels and
/// palette (with the optional band) form a custom scheme.
pub fn resolve_scheme(
    named: Option<SchemeName>,
    band: Option<&str>,
    labels: Option<BTreeMap<ClassCode, String>>,
    palette: Option<BTreeMap<ClassCode, String>>,
) -> Result<ClassificationScheme> {
    if let Some(name) = named {
        let mut scheme = name.scheme();
        if let Some(band) = band {
            scheme.band = band.to_string();
        }
        return Ok(scheme);
    }
    match (labels, palette) {
        (Some(labels), Some(palette)) => {
            let mut scheme = custom(labels, palette)?;
            scheme.band = band.unwrap_or_default().to_string();
            Ok(scheme)
        }
        (Some(_), None) | (None, Some(_)) => Err(SankeeError::InvalidConfig(
            "class labels and class palette must be supplied together".to_string(),
        )),
        (None, None) => Err(SankeeError::MissingBandOrDataset),
    }
}

/// Source of image identifiers for a collection.
pub trait ImageCatalog {
    /// Up to `max` image ids of `collection_id`, in catalog order.
    fn image_ids(&self, collection_id: &str, max: usize) -> Result<Vec<String>>;
}

/// First `max_images` image ids of the scheme's collection. When the catalog
/// returned exactly `max_images`, [`TRUNCATION_MARKER`] is appended.
pub fn list_images<C: ImageCatalog + ?Sized>(
    catalog: &C,
    scheme: &ClassificationScheme,
    max_images: usize,
) -> Result<Vec<String>> {
    let mut ids = catalog.image_ids(&scheme.collection_id, max_images)?;
    ids.truncate(max_images);
    if ids.len() == max_images {
        ids.push(TRUNCATION_MARKER.to_string());
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_class() -> ClassificationScheme {
        custom(
            BTreeMap::from([(1, "Forest".to_string()), (2, "Urban".to_string())]),
            BTreeMap::from([(1, "#00ff00".to_string()), (2, "#ff0000".to_string())]),
        )
        .unwrap()
    }

    struct FixedCatalog(Vec<&'static str>);

    impl ImageCatalog for FixedCatalog {
        fn image_ids(&self, _collection_id: &str, max: usize) -> Result<Vec<String>> {
            Ok(self.0.iter().take(max).map(|s| s.to_string()).collect())
        }
    }

    #[test]
    fn get_color_by_label() {
        let s = two_class();
        assert_eq!(get_color(&s, "Urban").unwrap(), "#ff0000");
        assert!(matches!(
            get_color(&s, "Water"),
            Err(SankeeError::UnknownClass { .. })
        ));
    }

    #[test]
    fn label_lookup_miss_is_unknown_class() {
        let s = two_class();
        assert_eq!(label_of(&s, 1).unwrap(), "Forest");
        assert_eq!(
            label_of(&s, 7),
            Err(SankeeError::unknown_code(7, CUSTOM_SCHEME))
        );
    }

    #[test]
    fn custom_requires_palette_for_every_label() {
        let err = custom(
            BTreeMap::from([(1, "Forest".to_string()), (2, "Urban".to_string())]),
            BTreeMap::from([(1, "#00ff00".to_string())]),
        )
        .unwrap_err();
        assert_eq!(err, SankeeError::unknown_code(2, CUSTOM_SCHEME));
    }

    #[test]
    fn resolve_prefers_named_scheme() {
        let s = resolve_scheme(Some(SchemeName::Nlcd2016), None, None, None).unwrap();
        assert_eq!(s.band, "landcover");
        let s = resolve_scheme(Some(SchemeName::Nlcd2016), Some("lc"), None, None).unwrap();
        assert_eq!(s.band, "lc");
    }

    #[test]
    fn resolve_without_anything_fails() {
        assert_eq!(
            resolve_scheme(None, Some("b1"), None, None),
            Err(SankeeError::MissingBandOrDataset)
        );
        assert!(matches!(
            resolve_scheme(None, None, Some(BTreeMap::new()), None),
            Err(SankeeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn summary_and_keys_follow_code_order() {
        let s = two_class();
        assert_eq!(keys(&s), vec![1, 2]);
        let rows = summary(&s);
        assert_eq!(rows[1].label, "Urban");
        assert_eq!(rows[1].color, "#ff0000");
    }

    #[test]
    fn list_images_marks_truncation() {
        let s = two_class();
        let cat = FixedCatalog(vec!["a", "b", "c"]);
        assert_eq!(list_images(&cat, &s, 2).unwrap(), vec!["a", "b", "..."]);
        assert_eq!(list_images(&cat, &s, 5).unwrap(), vec!["a", "b", "c"]);
    }
}
