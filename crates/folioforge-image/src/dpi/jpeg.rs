//! JFIF APP0 density patching.

use bytes::{BufMut, BytesMut};

const SOI: [u8; 2] = [0xFF, 0xD8];
const APP0: [u8; 2] = [0xFF, 0xE0];
const JFIF_ID: &[u8; 5] = b"JFIF\0";

/// Size of the APP0 segment inserted when none exists.
pub const JFIF_SEGMENT_LEN: usize = 18;

/// Shortest input that is patched at all.
const MIN_LEN: usize = 20;

/// Set the JFIF density of a JPEG stream to `dpi` in both axes.
///
/// An existing `JFIF` APP0 segment is patched in place (units = dots per
/// inch) and the length is unchanged. Otherwise an 18-byte segment is
/// inserted right after SOI. Inputs shorter than 20 bytes, or that do not
/// start with SOI, are returned unchanged.
pub fn inject_jfif_dpi(data: &[u8], dpi: u32) -> Vec<u8> {
    if data.len() < MIN_LEN || data[..2] != SOI {
        return data.to_vec();
    }
    let density = u16::try_from(dpi).unwrap_or(u16::MAX);

    match find_jfif_app0(data) {
        Some(i) => {
            let mut out = data.to_vec();
            out[i + 11] = 1;
            out[i + 12..i + 14].copy_from_slice(&density.to_be_bytes());
            out[i + 14..i + 16].copy_from_slice(&density.to_be_bytes());
            out
        }
        None => {
            let mut out = BytesMut::with_capacity(data.len() + JFIF_SEGMENT_LEN);
            out.put_slice(&SOI);
            write_app0(&mut out, density);
            out.put_slice(&data[2..]);
            out.to_vec()
        }
    }
}

/// Offset of the first `FF E0 .. "JFIF\0"` segment, with room for the density fields.
fn find_jfif_app0(data: &[u8]) -> Option<usize> {
    (2..data.len().saturating_sub(15))
        .find(|&i| data[i..i + 2] == APP0 && &data[i + 4..i + 9] == JFIF_ID)
}

fn write_app0(buf: &mut BytesMut, density: u16) {
    buf.put_slice(&APP0);
    buf.put_u16(16);
    buf.put_slice(JFIF_ID);
    buf.put_u8(1); // major
    buf.put_u8(1); // minor
    buf.put_u8(1); // units: dpi
    buf.put_u16(density);
    buf.put_u16(density);
    buf.put_u8(0); // thumbnail w
    buf.put_u8(0); // thumbnail h
}

/// Density declared by the first JFIF segment, as `(units, x, y)`.
pub fn read_jfif_density(data: &[u8]) -> Option<(u8, u16, u16)> {
    let i = find_jfif_app0(data)?;
    Some((
        data[i + 11],
        u16::from_be_bytes([data[i + 12], data[i + 13]]),
        u16::from_be_bytes([data[i + 14], data[i + 15]]),
    ))
}
