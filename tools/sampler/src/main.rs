/// Classified-raster point sampler: reads one single-band class GeoTIFF per
/// time step and writes a CSV sample table of class codes at seeded random
/// pixels, ready for `sankify run`.
///
/// All rasters must be co-registered (same grid, same dimensions). Every
/// point reads the same pixel from each raster.
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::LevelFilter;
use serde::Deserialize;
use tiff::decoder::{Decoder, DecodingResult};

use sankee_core::sampler::{sample, ClassGrid, GridSampler, SampleRequest};
use sankee_core::{ClassCode, SchemeName};

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "sampler",
    about = "Sample co-registered land-cover GeoTIFFs into a CSV table of class codes"
)]
struct Args {
    /// Classified GeoTIFFs, one per time step, oldest first.
    #[arg(required_unless_present = "request", num_args = 1..)]
    images: Vec<PathBuf>,

    /// JSON `SampleRequest` whose `images` are GeoTIFF paths. Flags override.
    #[arg(long)]
    request: Option<PathBuf>,

    /// Time-step labels, comma separated (default: 0, 1, ...).
    #[arg(short, long, value_delimiter = ',')]
    labels: Vec<String>,

    /// Scheme whose band name is recorded for the rasters.
    #[arg(short, long)]
    scheme: Option<String>,

    /// Band name of the rasters when no scheme is given.
    #[arg(short, long)]
    band: Option<String>,

    /// Number of random points.
    #[arg(short, long)]
    n: Option<usize>,

    /// Random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Pixel value treated as "no data".
    #[arg(long)]
    nodata: Option<ClassCode>,

    /// Keep points with no data in some raster (written as empty cells).
    #[arg(long)]
    keep_missing: bool,

    /// Output CSV path (stdout when omitted).
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

// ── Raster loading ───────────────────────────────────────────────────────────

/// Decode an integer class raster. Float rasters are accepted when every
/// value is integral, with NaN read as nodata.
fn read_class_raster(path: &Path, nodata: Option<ClassCode>) -> Result<ClassGrid> {
    let file = fs::File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut decoder = Decoder::new(io::BufReader::new(file))
        .with_context(|| format!("Not a valid TIFF: {}", path.display()))?;
    let (width, height) = decoder
        .dimensions()
        .with_context(|| format!("Dimensions error: {}", path.display()))?;
    let img = decoder
        .read_image()
        .with_context(|| format!("read_image failed: {}", path.display()))?;

    let raw: Vec<Option<ClassCode>> = match img {
        DecodingResult::U8(v) => v.into_iter().map(|x| Some(ClassCode::from(x))).collect(),
        DecodingResult::U16(v) => v.into_iter().map(|x| Some(ClassCode::from(x))).collect(),
        DecodingResult::I8(v) => v.into_iter().map(|x| Some(ClassCode::from(x))).collect(),
        DecodingResult::I16(v) => v.into_iter().map(|x| Some(ClassCode::from(x))).collect(),
        DecodingResult::I32(v) => v.into_iter().map(Some).collect(),
        DecodingResult::U32(v) => v
            .into_iter()
            .map(|x| ClassCode::try_from(x).map(Some))
            .collect::<std::result::Result<_, _>>()
            .with_context(|| format!("Class value out of range in {}", path.display()))?,
        DecodingResult::F32(v) => float_classes(v.into_iter().map(f64::from), path)?,
        DecodingResult::F64(v) => float_classes(v.into_iter(), path)?,
        _ => bail!("Unsupported pixel type in {}", path.display()),
    };

    let data = raw
        .into_iter()
        .map(|v| v.filter(|&c| Some(c) != nodata))
        .collect();
    Ok(ClassGrid::new(data, width as usize, height as usize)?)
}

fn float_classes(values: impl Iterator<Item = f64>, path: &Path) -> Result<Vec<Option<ClassCode>>> {
    values
        .map(|f| {
            if f.is_nan() {
                Ok(None)
            } else if f.fract() == 0.0 && f.abs() <= f64::from(ClassCode::MAX) {
                Ok(Some(f as ClassCode))
            } else {
                bail!("Non-integral class value {f} in {}", path.display())
            }
        })
        .collect()
}

// ── Request assembly ─────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
struct RequestFile {
    #[serde(flatten)]
    request: SampleRequest,
    scheme: Option<SchemeName>,
    nodata: Option<ClassCode>,
}

fn build_request(args: &Args) -> Result<(SampleRequest, Option<SchemeName>, Option<ClassCode>)> {
    let file = match &args.request {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Cannot read {}", path.display()))?;
            serde_json::from_str::<RequestFile>(&text)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        }
        None => RequestFile::default(),
    };
    let mut request = file.request;

    if !args.images.is_empty() {
        request.images = args.images.iter().map(|p| p.display().to_string()).collect();
    }
    if !args.labels.is_empty() {
        request.labels = Some(args.labels.clone());
    }
    if args.band.is_some() {
        request.band = args.band.clone();
    }
    if let Some(n) = args.n {
        request.n = n;
    }
    if let Some(seed) = args.seed {
        request.seed = seed;
    }
    if args.keep_missing {
        request.dropna = false;
    }
    let scheme = match &args.scheme {
        Some(name) => Some(name.parse::<SchemeName>()?),
        None => file.scheme,
    };
    Ok((request, scheme, args.nodata.or(file.nodata)))
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = env_logger::Builder::new();
    builder.filter_level(if args.verbose { LevelFilter::Debug } else { LevelFilter::Info });
    builder.parse_default_env();
    let _ = builder.try_init();

    let (request, scheme_name, nodata) = build_request(&args)?;
    let scheme = scheme_name.map(SchemeName::scheme);
    let band = request
        .band
        .clone()
        .or_else(|| scheme.as_ref().map(|s| s.band.clone()))
        .context("Pass --scheme or --band to name the class band")?;

    let mut sampler = GridSampler::new(band);
    for image in &request.images {
        let grid = read_class_raster(Path::new(image), nodata)?;
        log::info!("[sampler] {image}: {}×{}", grid.width, grid.height);
        sampler.insert(image.clone(), grid)?;
    }

    let table = sample(&sampler, &request, scheme.as_ref())?;
    log::info!(
        "[sampler] {} of {} points kept over {} time steps",
        table.n_rows(),
        request.n,
        table.n_columns()
    );

    match &args.output {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("Cannot create {}", path.display()))?;
            table.write_csv(io::BufWriter::new(file))?;
            log::info!("[sampler] wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout().lock();
            table.write_csv(stdout)?;
        }
    }
    io::stdout().flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_classes_accept_integral_and_nan() {
        let vals = float_classes([41.0, f64::NAN, 82.0].into_iter(), Path::new("x.tif")).unwrap();
        assert_eq!(vals, vec![Some(41), None, Some(82)]);
    }

    #[test]
    fn float_classes_reject_fractional() {
        assert!(float_classes([41.5].into_iter(), Path::new("x.tif")).is_err());
    }

    #[test]
    fn flags_override_request_defaults() {
        let args = Args::parse_from([
            "sampler", "a.tif", "b.tif", "--labels", "2001,2016", "-n", "250", "--seed", "3",
            "--scheme", "NLCD2016", "--keep-missing",
        ]);
        let (req, scheme, nodata) = build_request(&args).unwrap();
        assert_eq!(req.images, vec!["a.tif", "b.tif"]);
        assert_eq!(req.labels, Some(vec!["2001".to_string(), "2016".to_string()]));
        assert_eq!((req.n, req.seed, req.dropna), (250, 3, false));
        assert_eq!(scheme, Some(SchemeName::Nlcd2016));
        assert_eq!(nodata, None);
    }

    #[test]
    fn defaults_match_request_defaults() {
        let args = Args::parse_from(["sampler", "a.tif", "b.tif"]);
        let (req, _, _) = build_request(&args).unwrap();
        assert_eq!(req.n, 100);
        assert!(req.dropna);
    }
}
