//! PNG `pHYs` chunk patching.
//!
//! The stream is walked chunk by chunk from the signature onward; a chunk is
//! `length(4) | type(4) | data(length) | crc(4)`. Density is never located by
//! searching for the `pHYs` bytes, which can legitimately appear inside
//! compressed image data.

use bytes::{BufMut, BytesMut};

use super::{crc32, ppm_for_dpi};
use crate::PatchError;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

const PHYS_DATA_LEN: usize = 9;
/// Total size of a `pHYs` chunk including header and CRC.
pub const PHYS_CHUNK_LEN: usize = 12 + PHYS_DATA_LEN;

/// Location of one chunk inside the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub offset: usize,
    pub kind: [u8; 4],
    pub data_len: usize,
}

impl Chunk {
    pub fn data_start(&self) -> usize {
        self.offset + 8
    }

    pub fn end(&self) -> usize {
        self.offset + 12 + self.data_len
    }
}

/// Enumerate chunks up to and including `IEND`.
pub fn chunks(data: &[u8]) -> Result<Vec<Chunk>, PatchError> {
    if data.len() < PNG_SIGNATURE.len() || data[..8] != PNG_SIGNATURE {
        return Err(PatchError::NotPng);
    }

    let mut out = Vec::new();
    let mut offset = PNG_SIGNATURE.len();
    while offset < data.len() {
        if offset + 8 > data.len() {
            return Err(PatchError::Malformed {
                offset,
                reason: "truncated chunk header",
            });
        }
        let data_len = u32::from_be_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]) as usize;
        let kind = [
            data[offset + 4],
            data[offset + 5],
            data[offset + 6],
            data[offset + 7],
        ];
        let chunk = Chunk {
            offset,
            kind,
            data_len,
        };
        if chunk.end() > data.len() {
            return Err(PatchError::Malformed {
                offset,
                reason: "chunk extends past end of stream",
            });
        }
        out.push(chunk);
        if &kind == b"IEND" {
            break;
        }
        offset = chunk.end();
    }
    Ok(out)
}

/// Declare `dpi` in both axes via a `pHYs` chunk.
///
/// A well-formed `pHYs` is rewritten in place with a recomputed CRC. When
/// there is none, a fresh chunk is inserted directly after `IHDR`. A `pHYs`
/// with the wrong length is dropped and replaced.
pub fn inject_phys(data: &[u8], dpi: u32) -> Result<Vec<u8>, PatchError> {
    let chunks = chunks(data)?;
    let ihdr = chunks
        .first()
        .filter(|c| &c.kind == b"IHDR")
        .ok_or(PatchError::Malformed {
            offset: PNG_SIGNATURE.len(),
            reason: "first chunk is not IHDR",
        })?;
    let ppm = ppm_for_dpi(dpi);

    if let Some(phys) = chunks
        .iter()
        .find(|c| &c.kind == b"pHYs" && c.data_len == PHYS_DATA_LEN)
    {
        let mut out = data.to_vec();
        let start = phys.data_start();
        out[start..start + 4].copy_from_slice(&ppm.to_be_bytes());
        out[start + 4..start + 8].copy_from_slice(&ppm.to_be_bytes());
        out[start + 8] = 1;
        let crc = crc32(&out[phys.offset + 4..start + PHYS_DATA_LEN]);
        out[start + PHYS_DATA_LEN..phys.end()].copy_from_slice(&crc.to_be_bytes());
        return Ok(out);
    }

    let mut out = BytesMut::with_capacity(data.len() + PHYS_CHUNK_LEN);
    out.put_slice(&data[..ihdr.end()]);
    write_phys(&mut out, ppm);
    let mut cursor = ihdr.end();
    for stale in chunks.iter().filter(|c| &c.kind == b"pHYs") {
        out.put_slice(&data[cursor..stale.offset]);
        cursor = stale.end();
    }
    out.put_slice(&data[cursor..]);
    Ok(out.to_vec())
}

fn write_phys(buf: &mut BytesMut, ppm: u32) {
    let start = buf.len();
    buf.put_u32(PHYS_DATA_LEN as u32);
    buf.put_slice(b"pHYs");
    buf.put_u32(ppm);
    buf.put_u32(ppm);
    buf.put_u8(1); // unit: metre
    let crc = crc32(&buf[start + 4..]);
    buf.put_u32(crc);
}

/// Pixels-per-unit and unit byte of the first `pHYs` chunk.
pub fn read_phys(data: &[u8]) -> Option<(u32, u32, u8)> {
    let chunks = chunks(data).ok()?;
    let phys = chunks
        .iter()
        .find(|c| &c.kind == b"pHYs" && c.data_len == PHYS_DATA_LEN)?;
    let d = &data[phys.data_start()..phys.data_start() + PHYS_DATA_LEN];
    Some((
        u32::from_be_bytes([d[0], d[1], d[2], d[3]]),
        u32::from_be_bytes([d[4], d[5], d[6], d[7]]),
        d[8],
    ))
}
