//! GeoTIFF-backed raster source.
//!
//! Reads the first band of a GeoTIFF, its affine transform
//! (ModelPixelScale + ModelTiepoint, or ModelTransformation), its EPSG code
//! from the GeoKeyDirectory, and masks the GDAL nodata value to NaN.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek};
use std::path::{Path, PathBuf};

use geo_common::{AffineTransform, CrsCode, GeoError, GeoResult};
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;
use tracing::{debug, warn};

use super::{year_path, RasterSource};
use crate::types::RasterGrid;

// GeoTIFF tag IDs. The decoder maps these to named `Tag` variants, so
// lookups go through `geotiff_tag` rather than `Tag::Unknown`.
const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

// GeoKey IDs
const GT_MODEL_TYPE_GEO_KEY: u16 = 1024;
const GT_RASTER_TYPE_GEO_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;

// GeoKey values
const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

/// Rasters stored as `<base>/<year>/<year>.tif`.
#[derive(Debug, Clone)]
pub struct GeoTiffSource {
    base_path: PathBuf,
}

impl GeoTiffSource {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl RasterSource for GeoTiffSource {
    fn load(&self, year: &str) -> GeoResult<RasterGrid> {
        read_geotiff(&year_path(&self.base_path, year))
    }
}

/// Read the first band of a GeoTIFF file.
pub fn read_geotiff(path: &Path) -> GeoResult<RasterGrid> {
    let file = File::open(path)
        .map_err(|e| GeoError::raster_read(format!("{}: {e}", path.display())))?;

    let raster = decode(BufReader::new(file))
        .map_err(|e| GeoError::raster_read(format!("{}: {e}", path.display())))?;

    debug!(
        path = %path.display(),
        width = raster.width,
        height = raster.height,
        crs = %raster.crs,
        "Loaded GeoTIFF"
    );

    Ok(raster)
}

fn decode<R: Read + Seek>(reader: R) -> Result<RasterGrid, String> {
    let mut decoder = Decoder::new(reader)
        .map_err(|e| format!("not a TIFF file: {e}"))?
        .with_limits(Limits::unlimited());

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| format!("failed to get dimensions: {e}"))?;
    let (width, height) = (width as usize, height as usize);

    let transform = read_transform(&mut decoder)?;
    let crs = read_crs(&mut decoder)?;
    let nodata = read_nodata(&mut decoder);

    let image = decoder
        .read_image()
        .map_err(|e| format!("failed to read image: {e}"))?;
    let samples = to_f32(image)?;

    let pixels = width * height;
    if pixels == 0 || samples.len() % pixels != 0 {
        return Err(format!(
            "sample count {} does not match {}x{} image",
            samples.len(),
            width,
            height
        ));
    }

    // Interleaved bands: keep the first one
    let bands = samples.len() / pixels;
    let data: Vec<f32> = samples
        .into_iter()
        .step_by(bands)
        .map(|v| match nodata {
            Some(nd) if v == nd => f32::NAN,
            _ => v,
        })
        .collect();

    RasterGrid::new(data, width, height, transform, crs).map_err(|e| e.to_string())
}

fn geotiff_tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

fn find_f64s<R: Read + Seek>(decoder: &mut Decoder<R>, tag: u16) -> Result<Option<Vec<f64>>, String> {
    match decoder.find_tag(geotiff_tag(tag)) {
        Ok(Some(value)) => value
            .into_f64_vec()
            .map(Some)
            .map_err(|e| format!("malformed tag {tag}: {e}")),
        Ok(None) => Ok(None),
        Err(e) => Err(format!("failed to read tag {tag}: {e}")),
    }
}

fn read_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<AffineTransform, String> {
    if let Some(m) = find_f64s(decoder, MODEL_TRANSFORMATION)? {
        if m.len() < 8 {
            return Err("ModelTransformation must have 16 values".to_string());
        }
        return Ok(AffineTransform::new(m[0], m[1], m[3], m[4], m[5], m[7]));
    }

    let scale = find_f64s(decoder, MODEL_PIXEL_SCALE)?
        .ok_or_else(|| "missing ModelPixelScale tag".to_string())?;
    let tiepoint = find_f64s(decoder, MODEL_TIEPOINT)?
        .ok_or_else(|| "missing ModelTiepoint tag".to_string())?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err("malformed ModelPixelScale/ModelTiepoint".to_string());
    }

    let (sx, sy) = (scale[0], scale[1]);
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);

    Ok(AffineTransform::new(sx, 0.0, x - i * sx, 0.0, -sy, y + j * sy))
}

fn read_crs<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<CrsCode, String> {
    let keys: Vec<u32> = match decoder.find_tag(geotiff_tag(GEO_KEY_DIRECTORY)) {
        Ok(Some(value)) => value
            .into_u32_vec()
            .map_err(|e| format!("malformed GeoKeyDirectory: {e}"))?,
        Ok(None) => return Err("missing GeoKeyDirectory tag".to_string()),
        Err(e) => return Err(format!("failed to read GeoKeyDirectory: {e}")),
    };

    let entries = geo_key_entries(&keys);
    let lookup = |id: u16| {
        entries
            .iter()
            .find(|(key, location, _)| *key == id && *location == 0)
            .map(|(_, _, value)| *value)
    };

    lookup(PROJECTED_CS_TYPE_GEO_KEY)
        .or_else(|| lookup(GEOGRAPHIC_TYPE_GEO_KEY))
        .filter(|code| *code > 0 && *code != 32767)
        .map(CrsCode::new)
        .ok_or_else(|| "GeoKeyDirectory has no EPSG code".to_string())
}

/// Split a GeoKeyDirectory into `(key, location, value)` entries.
fn geo_key_entries(keys: &[u32]) -> Vec<(u16, u16, u16)> {
    if keys.len() < 4 {
        return Vec::new();
    }
    let count = keys[3] as usize;
    keys[4..]
        .chunks_exact(4)
        .take(count)
        .map(|k| (k[0] as u16, k[1] as u16, k[3] as u16))
        .collect()
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f32> {
    let value = decoder.find_tag(geotiff_tag(GDAL_NODATA)).ok().flatten()?;
    let text = value.into_string().ok()?;
    match text.trim_end_matches('\0').trim().parse::<f32>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(nodata = %text, "Ignoring unparsable GDAL nodata value");
            None
        }
    }
}

fn to_f32(image: DecodingResult) -> Result<Vec<f32>, String> {
    Ok(match image {
        DecodingResult::U8(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U16(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I8(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I16(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|x| x as f32).collect(),
        #[allow(unreachable_patterns)]
        _ => return Err("unsupported sample format".to_string()),
    })
}

/// Write a raster as a single-band float GeoTIFF.
///
/// NaN pixels are written as-is; no nodata tag is emitted.
pub fn write_geotiff(path: &Path, raster: &RasterGrid) -> GeoResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = BufWriter::new(File::create(path)?);
    let render = |e: tiff::TiffError| GeoError::Render(format!("{}: {e}", path.display()));

    let mut encoder = TiffEncoder::new(file).map_err(render)?;
    let mut image = encoder
        .new_image::<Gray32Float>(raster.width as u32, raster.height as u32)
        .map_err(render)?;

    let t = &raster.transform;
    let pixel_scale = [t.a.abs(), t.e.abs(), 0.0];
    let tiepoint = [0.0, 0.0, 0.0, t.c, t.f, 0.0];
    let geokeys = geo_key_directory(raster.crs);

    image
        .encoder()
        .write_tag(geotiff_tag(MODEL_PIXEL_SCALE), pixel_scale.as_slice())
        .map_err(render)?;
    image
        .encoder()
        .write_tag(geotiff_tag(MODEL_TIEPOINT), tiepoint.as_slice())
        .map_err(render)?;
    image
        .encoder()
        .write_tag(geotiff_tag(GEO_KEY_DIRECTORY), geokeys.as_slice())
        .map_err(render)?;
    image.write_data(&raster.data).map_err(render)?;

    debug!(path = %path.display(), width = raster.width, height = raster.height, "Wrote GeoTIFF");
    Ok(())
}

fn geo_key_directory(crs: CrsCode) -> Vec<u16> {
    let (model, key) = if projection::is_geographic(crs) {
        (MODEL_TYPE_GEOGRAPHIC, GEOGRAPHIC_TYPE_GEO_KEY)
    } else {
        (MODEL_TYPE_PROJECTED, PROJECTED_CS_TYPE_GEO_KEY)
    };

    vec![
        1, 1, 0, 3, // version, revision, minor, number of keys
        GT_MODEL_TYPE_GEO_KEY, 0, 1, model,
        GT_RASTER_TYPE_GEO_KEY, 0, 1, RASTER_PIXEL_IS_AREA,
        key, 0, 1, crs.epsg(),
    ]
}
