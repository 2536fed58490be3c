//! Built-in land-cover classification schemes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ClassificationScheme;
use crate::error::SankeeError;
use crate::ClassCode;

// ── Registry ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeName {
    #[serde(rename = "NLCD2016")]
    Nlcd2016,
    #[serde(rename = "MODIS_LC_TYPE1")]
    ModisLcType1,
    #[serde(rename = "MODIS_LC_TYPE2")]
    ModisLcType2,
    #[serde(rename = "MODIS_LC_TYPE3")]
    ModisLcType3,
    #[serde(rename = "CGLS_LC100")]
    CglsLc100,
}

impl SchemeName {
    pub const ALL: [SchemeName; 5] = [
        SchemeName::Nlcd2016,
        SchemeName::ModisLcType1,
        SchemeName::ModisLcType2,
        SchemeName::ModisLcType3,
        SchemeName::CglsLc100,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SchemeName::Nlcd2016 => "NLCD2016",
            SchemeName::ModisLcType1 => "MODIS_LC_TYPE1",
            SchemeName::ModisLcType2 => "MODIS_LC_TYPE2",
            SchemeName::ModisLcType3 => "MODIS_LC_TYPE3",
            SchemeName::CglsLc100 => "CGLS_LC100",
        }
    }

    /// Registry names in declaration order.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|n| n.as_str()).collect()
    }

    /// Scheme at registry position `index`.
    pub fn get(index: usize) -> Option<SchemeName> {
        Self::ALL.get(index).copied()
    }

    /// Materialize every built-in scheme.
    pub fn all() -> Vec<ClassificationScheme> {
        Self::ALL.iter().map(|n| n.scheme()).collect()
    }

    pub fn scheme(self) -> ClassificationScheme {
        let (collection_id, band, table) = match self {
            SchemeName::Nlcd2016 => ("USGS/NLCD", "landcover", NLCD2016),
            SchemeName::ModisLcType1 => ("MODIS/006/MCD12Q1", "LC_Type1", MODIS_LC_TYPE1),
            SchemeName::ModisLcType2 => ("MODIS/006/MCD12Q1", "LC_Type2", MODIS_LC_TYPE2),
            SchemeName::ModisLcType3 => ("MODIS/006/MCD12Q1", "LC_Type3", MODIS_LC_TYPE3),
            SchemeName::CglsLc100 => (
                "COPERNICUS/Landcover/100m/Proba-V-C3/Global",
                "discrete_classification",
                CGLS_LC100,
            ),
        };
        ClassificationScheme {
            name: self.as_str().to_string(),
            collection_id: collection_id.to_string(),
            band: band.to_string(),
            labels: table.iter().map(|&(c, l, _)| (c, l.to_string())).collect(),
            palette: table.iter().map(|&(c, _, p)| (c, p.to_string())).collect(),
        }
    }
}

impl fmt::Display for SchemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemeName {
    type Err = SankeeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|n| n.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                SankeeError::InvalidConfig(format!(
                    "unknown scheme {s:?}; expected one of {}",
                    Self::names().join(", ")
                ))
            })
    }
}

// ── Class tables: (code, label, colour) ─────────────────────────────────────

type ClassTable = &'static [(ClassCode, &'static str, &'static str)];

const NLCD2016: ClassTable = &[
    (1, "No data", "#000000"),
    (11, "Open water", "#466b9f"),
    (12, "Perennial ice/snow", "#d1def8"),
    (21, "Developed, open space", "#dec5c5"),
    (22, "Developed, low intensity", "#d99282"),
    (23, "Developed, medium intensity", "#eb0000"),
    (24, "Developed, high intensity", "#ab0000"),
    (31, "Barren land (rock/sand/clay)", "#b3ac9f"),
    (41, "Deciduous forest", "#68ab5f"),
    (42, "Evergreen forest", "#1c5f2c"),
    (43, "Mixed forest", "#b5c58f"),
    (51, "Dwarf scrub", "#af963c"),
    (52, "Shrub/scrub", "#ccb879"),
    (71, "Grassland/herbaceous", "#dfdfc2"),
    (72, "Sedge/herbaceous", "#d1d182"),
    (73, "Lichens", "#a3cc51"),
    (74, "Moss", "#82ba9e"),
    (81, "Pasture/hay", "#dcd939"),
    (82, "Cultivated crops", "#ab6c28"),
    (90, "Woody wetlands", "#b8d9eb"),
    (95, "Emergent herbaceous wetlands", "#6c9fb8"),
];

const MODIS_LC_TYPE1: ClassTable = &[
    (1, "Evergreen conifer forest", "#086a10"),
    (2, "Evergreen broadleaf forest", "#dcd159"),
    (3, "Deciduous conifer forest", "#54a708"),
    (4, "Deciduous broadleaf forest", "#78d203"),
    (5, "Mixed forest", "#009900"),
    (6, "Closed shrubland", "#c6b044"),
    (7, "Open shrubland", "#dcd159"),
    (8, "Woody savanna", "#dade48"),
    (9, "Savanna", "#fbff13"),
    (10, "Grassland", "#b6ff05"),
    (11, "Permanent wetland", "#27ff87"),
    (12, "Cropland", "#c24f44"),
    (13, "Urban", "#a5a5a5"),
    (14, "Cropland and natural vegetation", "#ff6d4c"),
    (15, "Permanent snow and ice", "#69fff8"),
    (16, "Barren", "#f9ffa4"),
    (17, "Water", "#1c0dff"),
];

const MODIS_LC_TYPE2: ClassTable = &[
    (0, "Water", "#1c0dff"),
    (1, "Evergreen conifer forest", "#05450a"),
    (2, "Evergreen broadleaf forest", "#086a10"),
    (3, "Deciduous conifer forest", "#54a708"),
    (4, "Deciduous broadleaf forest", "#78d203"),
    (5, "Mixed forest", "#009900"),
    (6, "Closed shrubland", "#c6b044"),
    (7, "Open shrubland", "#dcd159"),
    (8, "Woody savanna", "#dade48"),
    (9, "Savanna", "#fbff13"),
    (10, "Grassland", "#b6ff05"),
    (11, "Permanent wetland", "#27ff87"),
    (12, "Cropland", "#c24f44"),
    (13, "Urban", "#a5a5a5"),
    (14, "Cropland and natural vegetation", "#ff6d4c"),
    (15, "Barren", "#f9ffa4"),
];

const MODIS_LC_TYPE3: ClassTable = &[
    (0, "Water", "#1c0dff"),
    (1, "Grassland", "#b6ff05"),
    (2, "Shrubland", "#dcd159"),
    (3, "Crops", "#c24f44"),
    (4, "Savannas", "#fbff13"),
    (5, "Evergreen broadleaf", "#086a10"),
    (6, "Deciduous broadleaf", "#78d203"),
    (7, "Evergreen conifer", "#05450a"),
    (8, "Deciduous conifer", "#54a708"),
    (9, "Barren", "#f9ffa4"),
    (10, "Urban", "#a5a5a5"),
];

const CGLS_LC100: ClassTable = &[
    (0, "Unknown", "#282828"),
    (20, "Shrubs", "#FFBB22"),
    (30, "Herbaceous vegetation", "#FFFF4C"),
    (40, "Cultivated", "#F096FF"),
    (50, "Urban", "#FA0000"),
    (60, "Bare", "#B4B4B4"),
    (70, "Snow and ice", "#F0F0F0"),
    (80, "Water body", "#0032C8"),
    (90, "Herbaceous wetland", "#0096A0"),
    (100, "Moss and lichen", "#FAE6A0"),
    (111, "Closed forest, evergreen conifer", "#58481F"),
    (112, "Closed forest, evergreen broad leaf", "#009900"),
    (113, "Closed forest, deciduous conifer", "#70663E"),
    (114, "Closed forest, deciduous broad leaf", "#00CC00"),
    (115, "Closed forest, mixed", "#4E751F"),
    (116, "Closed forest, other", "#007800"),
    (121, "Open forest, evergreen conifer", "#666000"),
    (122, "Open forest, evergreen broad leaf", "#8DB400"),
    (123, "Open forest, deciduous conifer", "#8D7400"),
    (124, "Open forest, deciduous broad leaf", "#A0DC00"),
    (125, "Open forest, mixed", "#929900"),
    (126, "Open forest, other", "#648C00"),
    (200, "Ocean", "#000080"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::get_color;

    #[test]
    fn every_builtin_has_a_colour_per_label() {
        for scheme in SchemeName::all() {
            assert_eq!(scheme.labels.len(), scheme.palette.len(), "{}", scheme.name);
            for label in scheme.labels.values() {
                assert!(get_color(&scheme, label).is_ok(), "{}: {label}", scheme.name);
            }
        }
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for name in SchemeName::names() {
            let parsed: SchemeName = name.parse().unwrap();
            assert_eq!(parsed.as_str(), name);
        }
        assert_eq!("modis_lc_type2".parse::<SchemeName>(), Ok(SchemeName::ModisLcType2));
        assert!("LANDSAT".parse::<SchemeName>().is_err());
    }

    #[test]
    fn get_by_index() {
        assert_eq!(SchemeName::get(0), Some(SchemeName::Nlcd2016));
        assert_eq!(SchemeName::get(4), Some(SchemeName::CglsLc100));
        assert_eq!(SchemeName::get(5), None);
    }

    #[test]
    fn modis_type1_shares_colour_between_classes() {
        let s = SchemeName::ModisLcType1.scheme();
        assert_eq!(get_color(&s, "Evergreen broadleaf forest").unwrap(), "#dcd159");
        assert_eq!(get_color(&s, "Open shrubland").unwrap(), "#dcd159");
    }
}
