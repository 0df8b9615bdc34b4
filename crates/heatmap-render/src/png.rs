//! PNG encoding for the exported raster.
//!
//! Two encodings depending on the surface contents:
//! - **Indexed (color type 3)**: chosen when at most 256 distinct colors
//!   appear, the common case for palette-driven output. Smaller and faster.
//! - **RGBA (color type 6)**: fallback for anything more colorful.
//!
//! `encode_auto` picks the encoding; `encode_rgba`/`encode_indexed` force
//! one.

use heatmap_common::{HeatmapError, HeatmapResult};
use rayon::prelude::*;
use std::collections::HashMap;
use std::io::Write;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum palette entries for an indexed PNG.
const MAX_INDEXED_COLORS: usize = 256;

/// Below this pixel count the sequential palette scan wins.
const PARALLEL_THRESHOLD: usize = 64 * 64;

/// Encode RGBA pixels, picking the smaller of the two supported encodings.
pub fn encode_auto(pixels: &[u8], width: usize, height: usize) -> HeatmapResult<Vec<u8>> {
    let num_pixels = pixels.len() / 4;
    if num_pixels == 0 {
        return encode_rgba(pixels, width, height);
    }

    let extracted = if num_pixels >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette(pixels)
    };

    match extracted {
        Some((palette, indices)) => encode_indexed(width, height, &palette, &indices),
        None => encode_rgba(pixels, width, height),
    }
}

/// Encode as RGBA PNG (color type 6).
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> HeatmapResult<Vec<u8>> {
    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 6));

    let idat = deflate_scanlines(pixels, width, height, 4)?;
    write_chunk(&mut png, b"IDAT", &idat);

    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Encode as indexed PNG (color type 3) from a palette and per-pixel
/// indices. Emits a tRNS chunk when any palette entry is translucent.
pub fn encode_indexed(
    width: usize,
    height: usize,
    palette: &[[u8; 4]],
    indices: &[u8],
) -> HeatmapResult<Vec<u8>> {
    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    let mut plte = Vec::with_capacity(palette.len() * 3);
    for [r, g, b, _] in palette {
        plte.extend_from_slice(&[*r, *g, *b]);
    }
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.iter().any(|[_, _, _, a]| *a < 255) {
        let trns: Vec<u8> = palette.iter().map(|[_, _, _, a]| *a).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(indices, width, height, 1)?;
    write_chunk(&mut png, b"IDAT", &idat);

    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Build the 13-byte IHDR payload.
fn ihdr(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&(width as u32).to_be_bytes());
    data.extend_from_slice(&(height as u32).to_be_bytes());
    data.push(8); // bit depth
    data.push(color_type);
    data.push(0); // compression method
    data.push(0); // filter method
    data.push(0); // interlace method
    data
}

/// Write one length-prefixed, CRC-terminated PNG chunk.
fn write_chunk(png: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(kind);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix each scanline with a filter byte (none) and zlib-deflate the lot.
fn deflate_scanlines(
    data: &[u8],
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
) -> HeatmapResult<Vec<u8>> {
    let stride = width * bytes_per_pixel;
    let mut raw = Vec::with_capacity(height * (1 + stride));

    for y in 0..height {
        raw.push(0); // filter type: none
        let start = y * stride;
        raw.extend_from_slice(&data[start..start + stride]);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&raw)
        .map_err(|e| HeatmapError::encoding_failed(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| HeatmapError::encoding_failed(e.to_string()))
}

/// Pack RGBA bytes into a u32 for fast hashing.
#[inline(always)]
fn pack(pixel: &[u8]) -> u32 {
    (pixel[0] as u32)
        | ((pixel[1] as u32) << 8)
        | ((pixel[2] as u32) << 16)
        | ((pixel[3] as u32) << 24)
}

#[inline(always)]
fn unpack(packed: u32) -> [u8; 4] {
    [
        packed as u8,
        (packed >> 8) as u8,
        (packed >> 16) as u8,
        (packed >> 24) as u8,
    ]
}

/// Sequential palette extraction.
///
/// Returns the palette and one index per pixel, or `None` when more than
/// 256 distinct colors appear.
fn extract_palette(pixels: &[u8]) -> Option<(Vec<[u8; 4]>, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_INDEXED_COLORS);
    let mut palette: Vec<[u8; 4]> = Vec::with_capacity(MAX_INDEXED_COLORS);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 4);

    for pixel in pixels.chunks_exact(4) {
        let packed = pack(pixel);
        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_INDEXED_COLORS {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push(unpack(packed));
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Parallel palette extraction for larger surfaces.
///
/// First pass collects distinct colors per chunk in parallel; after the
/// merge confirms the palette fits, a second parallel pass maps every pixel
/// to its index.
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Vec<[u8; 4]>, Vec<u8>)> {
    let num_pixels = pixels.len() / 4;
    let chunk_pixels = (num_pixels / rayon::current_num_threads()).max(256);

    let per_chunk: Vec<Vec<u32>> = pixels
        .par_chunks(chunk_pixels * 4)
        .map(|chunk| {
            let mut local: HashMap<u32, ()> = HashMap::with_capacity(MAX_INDEXED_COLORS);
            for pixel in chunk.chunks_exact(4) {
                local.insert(pack(pixel), ());
                if local.len() > MAX_INDEXED_COLORS {
                    break;
                }
            }
            local.into_keys().collect()
        })
        .collect();

    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_INDEXED_COLORS);
    let mut palette: Vec<[u8; 4]> = Vec::with_capacity(MAX_INDEXED_COLORS);
    for packed in per_chunk.into_iter().flatten() {
        if !color_to_index.contains_key(&packed) {
            if palette.len() >= MAX_INDEXED_COLORS {
                return None;
            }
            color_to_index.insert(packed, palette.len() as u8);
            palette.push(unpack(packed));
        }
    }

    let indices: Vec<u8> = pixels
        .par_chunks_exact(4)
        .map(|pixel| color_to_index.get(&pack(pixel)).copied().unwrap_or(0))
        .collect();

    Some((palette, indices))
}
