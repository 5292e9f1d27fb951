//! Integration test: write GeoTIFFs, read them back through `GeoTiffSource`.
//!
//! 1. Write a raster with known values and georeferencing
//! 2. Read it back by year from a `<base>/<year>/<year>.tif` tree
//! 3. Verify values, transform and CRS survive
//! 4. Verify the GDAL nodata value is masked to NaN
//! 5. Read a file assembled byte by byte, independent of the `tiff` encoder

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use geo_common::{AffineTransform, CrsCode};
use raster::{
    discover_years, read_geotiff, write_geotiff, year_path, GeoTiffSource, MultiYearClipper,
    RasterGrid, RasterSource,
};
use test_utils::{create_test_grid, fixtures};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

fn utm_transform() -> AffineTransform {
    let (a, b, c, d, e, f) = fixtures::transform::UTM33_10M;
    AffineTransform::new(a, b, c, d, e, f)
}

fn utm_raster(width: usize, height: usize) -> RasterGrid {
    RasterGrid::new(
        create_test_grid(width, height),
        width,
        height,
        utm_transform(),
        CrsCode::new(fixtures::crs::UTM33N),
    )
    .unwrap()
}

/// Write a float GeoTIFF carrying a GDAL_NODATA tag.
fn write_with_nodata(path: &Path, data: &[f32], width: u32, height: u32, nodata: &str) {
    let file = BufWriter::new(File::create(path).unwrap());
    let mut encoder = TiffEncoder::new(file).unwrap();
    let mut image = encoder.new_image::<Gray32Float>(width, height).unwrap();

    let scale = [10.0_f64, 10.0, 0.0];
    let tiepoint = [0.0_f64, 0.0, 0.0, 500000.0, 4000000.0, 0.0];
    let geokeys: [u16; 16] = [1, 1, 0, 3, 1024, 0, 1, 1, 1025, 0, 1, 1, 3072, 0, 1, 32633];

    image.encoder().write_tag(Tag::ModelPixelScaleTag, &scale[..]).unwrap();
    image.encoder().write_tag(Tag::ModelTiepointTag, &tiepoint[..]).unwrap();
    image.encoder().write_tag(Tag::GeoKeyDirectoryTag, &geokeys[..]).unwrap();
    image.encoder().write_tag(Tag::GdalNodata, nodata).unwrap();
    image.write_data(data).unwrap();
}

// TIFF field types
const ASCII: u16 = 2;
const SHORT: u16 = 3;
const LONG: u16 = 4;
const DOUBLE: u16 = 12;

fn shorts(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn doubles(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Lay out a little-endian, single-strip TIFF: header, pixel bytes, one IFD,
/// then any tag values too large for the IFD entry.
fn assemble_tiff(pixels: &[u8], mut entries: Vec<(u16, u16, u32, Vec<u8>)>) -> Vec<u8> {
    entries.sort_by_key(|entry| entry.0);

    let mut out = b"II".to_vec();
    out.extend(42u16.to_le_bytes());
    let mut ifd_offset = 8 + pixels.len() as u32;
    ifd_offset += ifd_offset % 2;
    out.extend(ifd_offset.to_le_bytes());
    out.extend(pixels);
    out.resize(ifd_offset as usize, 0);

    let spill_start = ifd_offset + 2 + 12 * entries.len() as u32 + 4;
    let mut spill = Vec::new();

    out.extend((entries.len() as u16).to_le_bytes());
    for (tag, field_type, count, bytes) in &entries {
        out.extend(tag.to_le_bytes());
        out.extend(field_type.to_le_bytes());
        out.extend(count.to_le_bytes());
        if bytes.len() <= 4 {
            let mut inline = bytes.clone();
            inline.resize(4, 0);
            out.extend(inline);
        } else {
            out.extend((spill_start + spill.len() as u32).to_le_bytes());
            spill.extend(bytes);
            spill.resize(spill.len() + spill.len() % 2, 0);
        }
    }
    out.extend(0u32.to_le_bytes());
    out.extend(spill);
    out
}

#[test]
fn test_reads_hand_assembled_geotiff() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("external.tif");

    // 3 x 2 unsigned bytes, 255 is nodata
    let pixels = [10u8, 20, 255, 30, 40, 50];
    let geokeys = [1, 1, 0, 3, 1024, 0, 1, 1, 1025, 0, 1, 1, 3072, 0, 1, 32633];
    let bytes = assemble_tiff(
        &pixels,
        vec![
            (256, SHORT, 1, shorts(&[3])),
            (257, SHORT, 1, shorts(&[2])),
            (258, SHORT, 1, shorts(&[8])),
            (259, SHORT, 1, shorts(&[1])),
            (262, SHORT, 1, shorts(&[1])),
            (273, LONG, 1, 8u32.to_le_bytes().to_vec()),
            (277, SHORT, 1, shorts(&[1])),
            (278, SHORT, 1, shorts(&[2])),
            (279, LONG, 1, 6u32.to_le_bytes().to_vec()),
            (33550, DOUBLE, 3, doubles(&[30.0, 30.0, 0.0])),
            (33922, DOUBLE, 6, doubles(&[0.0, 0.0, 0.0, 500000.0, 4000000.0, 0.0])),
            (34735, SHORT, 16, shorts(&geokeys)),
            (42113, ASCII, 4, b"255\0".to_vec()),
        ],
    );
    std::fs::write(&path, bytes).unwrap();

    let loaded = read_geotiff(&path).unwrap();
    assert_eq!((loaded.width, loaded.height), (3, 2));
    assert_eq!(loaded.crs, CrsCode::new(32633));
    assert_eq!(
        loaded.transform,
        AffineTransform::new(30.0, 0.0, 500000.0, 0.0, -30.0, 4000000.0)
    );
    assert_eq!(loaded.get(0, 0), Some(10.0));
    assert_eq!(loaded.get(2, 1), Some(50.0));
    assert!(loaded.get(2, 0).unwrap().is_nan());
}

#[test]
fn test_nad83_roundtrip_keeps_geographic_crs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nad83.tif");
    let raster = RasterGrid::new(
        vec![2.0; 6],
        3,
        2,
        AffineTransform::north_up(-100.0, 40.0, 0.01, 0.01),
        CrsCode::new(4269),
    )
    .unwrap();

    write_geotiff(&path, &raster).unwrap();
    let loaded = read_geotiff(&path).unwrap();
    assert_eq!(loaded.crs, CrsCode::new(4269));
    assert_eq!(loaded.transform, raster.transform);
}

#[test]
fn test_roundtrip_values_and_georeferencing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.tif");
    let original = utm_raster(40, 30);

    write_geotiff(&path, &original).unwrap();
    let loaded = read_geotiff(&path).unwrap();

    assert_eq!(loaded.width, 40);
    assert_eq!(loaded.height, 30);
    assert_eq!(loaded.crs, CrsCode::new(32633));
    assert_eq!(loaded.transform, original.transform);
    assert_eq!(loaded.get(7, 3), Some(7003.0));
    assert_eq!(loaded.data, original.data);
}

#[test]
fn test_geographic_crs_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geo.tif");
    let (a, b, c, d, e, f) = fixtures::transform::WGS84_MILLIDEG;
    let raster = RasterGrid::new(
        vec![1.0; 12],
        4,
        3,
        AffineTransform::new(a, b, c, d, e, f),
        CrsCode::WGS84,
    )
    .unwrap();

    write_geotiff(&path, &raster).unwrap();
    let loaded = read_geotiff(&path).unwrap();
    assert_eq!(loaded.crs, CrsCode::WGS84);
    assert_eq!(loaded.transform.c, 15.0);
}

#[test]
fn test_nodata_masked_to_nan() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("holes.tif");
    let mut data = vec![0.25_f32; 16];
    data[3] = -9999.0;
    data[10] = -9999.0;

    write_with_nodata(&path, &data, 4, 4, "-9999");
    let loaded = read_geotiff(&path).unwrap();

    assert!(loaded.get(3, 0).unwrap().is_nan());
    assert!(loaded.get(2, 2).unwrap().is_nan());
    assert_eq!(loaded.get(0, 0), Some(0.25));
    assert_eq!(loaded.data.iter().filter(|v| v.is_nan()).count(), 2);
}

#[test]
fn test_source_reads_year_layout() {
    let dir = tempfile::tempdir().unwrap();
    for year in fixtures::years::THREE {
        write_geotiff(&year_path(dir.path(), year), &utm_raster(20, 10)).unwrap();
    }

    let years = discover_years(dir.path()).unwrap();
    assert_eq!(years, fixtures::years::owned(&fixtures::years::THREE));

    let source = GeoTiffSource::new(dir.path());
    let raster = source.load("2020").unwrap();
    assert_eq!(raster.width, 20);
    assert!(source.load("1999").is_err());
}

#[test]
fn test_clip_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    for year in fixtures::years::THREE {
        write_geotiff(&year_path(dir.path(), year), &utm_raster(200, 100)).unwrap();
    }

    let source = GeoTiffSource::new(dir.path());
    let clipper = MultiYearClipper::new(&source, CrsCode::new(32633));
    let (x0, y0, x1, y1) = fixtures::bbox::UTM33_PIXEL_RECT;
    let bbox = geo_common::BoundingBox::new(x0, y0, x1, y1);

    let years = fixtures::years::owned(&fixtures::years::THREE);
    let clips = clipper.clip_all(&years, &bbox).unwrap();

    assert_eq!(clips.len(), 3);
    for clip in clips.values() {
        assert_eq!((clip.width, clip.height), (100, 50));
        assert_eq!(clip.nodata_count, 0);
    }
}
