//! Point sampling seam.
//!
//! Sampling classified imagery is done by an external collaborator behind the
//! [`Sampler`] trait: one synchronous call that returns a materialized
//! [`SampleTable`]. [`sample`] is the front door that validates the request
//! and resolves defaults before delegating. [`GridSampler`] samples in-memory
//! class rasters and backs the `sampler` tool.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SankeeError};
use crate::scheme::ClassificationScheme;
use crate::table::{Column, SampleTable};
use crate::ClassCode;

/// Caller-facing sampling options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleRequest {
    /// Image identifiers, one per time step, oldest first.
    pub images: Vec<String>,
    /// Time-step label per image. Defaults to "0", "1", ...
    pub labels: Option<Vec<String>>,
    /// Band holding class values. Defaults to the scheme's band.
    pub band: Option<String>,
    /// Number of random points.
    pub n: usize,
    /// Sampling scale in metres; `None` uses the imagery's native scale.
    pub scale: Option<f64>,
    pub seed: u64,
    /// Drop points with no class data in any image.
    pub dropna: bool,
}

impl Default for SampleRequest {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            labels: None,
            band: None,
            n: 100,
            scale: None,
            seed: 0,
            dropna: true,
        }
    }
}

/// Fully resolved request handed to a [`Sampler`].
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePlan {
    pub images: Vec<String>,
    pub labels: Vec<String>,
    pub band: String,
    pub n: usize,
    pub scale: Option<f64>,
    pub seed: u64,
}

pub trait Sampler {
    /// Sample `plan.n` points. The returned table has one column per image,
    /// named by `plan.labels`, in image order. Missing data is `None`.
    fn sample(&self, plan: &SamplePlan) -> Result<SampleTable>;
}

/// Validate `request`, resolve band and labels, run the sampler and
/// optionally drop rows with missing values.
pub fn sample<S: Sampler + ?Sized>(
    sampler: &S,
    request: &SampleRequest,
    scheme: Option<&ClassificationScheme>,
) -> Result<SampleTable> {
    let band = match (&request.band, scheme) {
        (Some(band), _) => band.clone(),
        (None, Some(s)) if !s.band.is_empty() => s.band.clone(),
        _ => return Err(SankeeError::MissingBandOrDataset),
    };

    let labels = match &request.labels {
        Some(labels) => labels.clone(),
        None => (0..request.images.len()).map(|i| i.to_string()).collect(),
    };
    if labels.len() != request.images.len() {
        return Err(SankeeError::InvalidConfig(format!(
            "{} labels supplied for {} images",
            labels.len(),
            request.images.len()
        )));
    }
    if request.images.len() < 2 {
        return Err(SankeeError::InvalidConfig(format!(
            "at least two images are needed to sample change, got {}",
            request.images.len()
        )));
    }

    let plan = SamplePlan {
        images: request.images.clone(),
        labels,
        band,
        n: request.n,
        scale: request.scale,
        seed: request.seed,
    };
    log::info!(
        "sampling {} points from {} images (band {}, seed {})",
        plan.n,
        plan.images.len(),
        plan.band,
        plan.seed
    );
    let table = sampler.sample(&plan)?;

    if table.column_names() != plan.labels {
        return Err(SankeeError::InvalidInput(format!(
            "sampler returned columns {:?}, expected {:?}",
            table.column_names(),
            plan.labels
        )));
    }
    Ok(if request.dropna { table.drop_missing() } else { table })
}

// ── In-memory raster sampler ─────────────────────────────────────────────────

/// Single-band class raster, row-major. `None` is nodata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassGrid {
    pub data: Vec<Option<ClassCode>>,
    pub width: usize,
    pub height: usize,
}

impl ClassGrid {
    pub fn new(data: Vec<Option<ClassCode>>, width: usize, height: usize) -> Result<Self> {
        if data.len() != width * height {
            return Err(SankeeError::InvalidInput(format!(
                "grid of {width}×{height} needs {} cells, got {}",
                width * height,
                data.len()
            )));
        }
        Ok(Self { data, width, height })
    }

    /// Convert raw pixel values, mapping `nodata` to `None`.
    pub fn from_raw(raw: &[ClassCode], width: usize, height: usize, nodata: Option<ClassCode>) -> Result<Self> {
        let data = raw
            .iter()
            .map(|&v| if Some(v) == nodata { None } else { Some(v) })
            .collect();
        Self::new(data, width, height)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<ClassCode> {
        self.data[row * self.width + col]
    }
}

/// Samples co-registered class rasters at seeded random pixels. Every point
/// is read from the same pixel in every image. Rasters are sampled at their
/// native resolution, so `scale` is not used.
#[derive(Debug, Clone)]
pub struct GridSampler {
    band: String,
    grids: BTreeMap<String, ClassGrid>,
}

impl GridSampler {
    pub fn new(band: impl Into<String>) -> Self {
        Self {
            band: band.into(),
            grids: BTreeMap::new(),
        }
    }

    /// Register `grid` under `image_id`. All grids must share dimensions.
    pub fn insert(&mut self, image_id: impl Into<String>, grid: ClassGrid) -> Result<()> {
        let image_id = image_id.into();
        if let Some(other) = self.grids.values().next() {
            if (other.width, other.height) != (grid.width, grid.height) {
                return Err(SankeeError::InvalidInput(format!(
                    "image {image_id} is {}×{}, expected {}×{}",
                    grid.width, grid.height, other.width, other.height
                )));
            }
        }
        self.grids.insert(image_id, grid);
        Ok(())
    }
}

impl Sampler for GridSampler {
    fn sample(&self, plan: &SamplePlan) -> Result<SampleTable> {
        if plan.band != self.band {
            return Err(SankeeError::InvalidConfig(format!(
                "band {:?} is not available, rasters hold {:?}",
                plan.band, self.band
            )));
        }
        let grids = plan
            .images
            .iter()
            .map(|id| {
                self.grids
                    .get(id)
                    .ok_or_else(|| SankeeError::InvalidConfig(format!("unknown image {id:?}")))
            })
            .collect::<Result<Vec<_>>>()?;
        let Some(first) = grids.first() else {
            return Err(SankeeError::InvalidConfig("no images to sample".to_string()));
        };

        let (width, height) = (first.width, first.height);
        if plan.n > 0 && width * height == 0 {
            return Err(SankeeError::InvalidInput("cannot sample an empty raster".to_string()));
        }

        let mut rng = StdRng::seed_from_u64(plan.seed);
        let points: Vec<(usize, usize)> = (0..plan.n)
            .map(|_| (rng.gen_range(0..height), rng.gen_range(0..width)))
            .collect();

        let columns = grids
            .iter()
            .zip(&plan.labels)
            .map(|(grid, label)| {
                Column::new(label.clone(), points.iter().map(|&(r, c)| grid.get(r, c)).collect())
            })
            .collect();
        SampleTable::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::SchemeName;

    fn sampler() -> GridSampler {
        let mut s = GridSampler::new("landcover");
        s.insert("img_2001", ClassGrid::from_raw(&[41, 41, 82, 0], 2, 2, Some(0)).unwrap())
            .unwrap();
        s.insert("img_2016", ClassGrid::from_raw(&[41, 21, 82, 82], 2, 2, Some(0)).unwrap())
            .unwrap();
        s
    }

    fn request() -> SampleRequest {
        SampleRequest {
            images: vec!["img_2001".into(), "img_2016".into()],
            n: 50,
            seed: 7,
            ..SampleRequest::default()
        }
    }

    #[test]
    fn band_comes_from_scheme_when_absent() {
        let scheme = SchemeName::Nlcd2016.scheme();
        let t = sample(&sampler(), &request(), Some(&scheme)).unwrap();
        assert_eq!(t.column_names(), vec!["0", "1"]);
        assert!(t.n_rows() <= 50);
    }

    #[test]
    fn missing_band_and_scheme_fails() {
        assert_eq!(
            sample(&sampler(), &request(), None),
            Err(SankeeError::MissingBandOrDataset)
        );
    }

    #[test]
    fn label_count_must_match_images() {
        let req = SampleRequest {
            labels: Some(vec!["2001".into()]),
            band: Some("landcover".into()),
            ..request()
        };
        assert!(matches!(
            sample(&sampler(), &req, None),
            Err(SankeeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn single_image_rejected() {
        let req = SampleRequest {
            images: vec!["img_2001".into()],
            band: Some("landcover".into()),
            ..request()
        };
        assert!(matches!(
            sample(&sampler(), &req, None),
            Err(SankeeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn same_seed_same_points() {
        let req = SampleRequest {
            band: Some("landcover".into()),
            dropna: false,
            ..request()
        };
        let a = sample(&sampler(), &req, None).unwrap();
        let b = sample(&sampler(), &req, None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.n_rows(), 50);
    }

    #[test]
    fn dropna_removes_nodata_points() {
        let req = SampleRequest {
            band: Some("landcover".into()),
            n: 200,
            ..request()
        };
        let t = sample(&sampler(), &req, None).unwrap();
        assert!((0..t.n_rows()).all(|r| t.row(r).all(|v| v.is_some())));
        // The nodata pixel is hit with probability 1/4 per draw.
        assert!(t.n_rows() < 200);
    }

    #[test]
    fn mismatched_grid_dimensions_rejected() {
        let mut s = sampler();
        let err = s
            .insert("img_2020", ClassGrid::from_raw(&[1, 2, 3], 3, 1, None).unwrap())
            .unwrap_err();
        assert!(matches!(err, SankeeError::InvalidInput(_)));
    }

    #[test]
    fn unknown_image_rejected() {
        let req = SampleRequest {
            images: vec!["img_2001".into(), "img_1990".into()],
            band: Some("landcover".into()),
            ..request()
        };
        assert!(matches!(
            sample(&sampler(), &req, None),
            Err(SankeeError::InvalidConfig(_))
        ));
    }
}
