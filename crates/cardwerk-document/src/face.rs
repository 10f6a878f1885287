// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Face image extraction from an ISO/IEC 19794-5 style face record.
//
// Layout (big-endian, no padding):
//
//   general header
//     format identifier       4
//     version                 4
//     record length           4   signed
//     representation count    2
//     certification flag      1
//     temporal sequence       2
//   representation
//     representation length   4   signed, includes itself
//     capture details        14
//     quality block count     1   Q
//     quality blocks        Q*5
//     landmark point count    2   L
//     facial information     15
//     landmark points       L*8
//     face type               1
//     image data type         1
//     other image info        9
//     image data length       4   signed, I
//     image data              I
//
// Every length is checked against the bytes actually remaining before
// anything is sliced or copied.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use cardwerk_core::error::{CardwerkError, Result};
use cardwerk_core::traits::BiometricContainer;
use cardwerk_core::types::{FACE_MODALITY, PNG_DATA_URI_PREFIX};
use tracing::{debug, instrument};

const HEADER_LEN: usize = 4 + 4 + 4 + 2 + 1 + 2;
const CAPTURE_DETAILS_LEN: usize = 14;
const QUALITY_BLOCK_LEN: usize = 5;
const FACIAL_INFORMATION_LEN: usize = 15;
const LANDMARK_POINT_LEN: usize = 8;
const OTHER_IMAGE_INFO_LEN: usize = 9;

fn parse_err(detail: impl Into<String>) -> CardwerkError {
    CardwerkError::BiometricParse(detail.into())
}

/// Bounds-checked big-endian cursor over a borrowed buffer.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(parse_err(format!(
                "{what}: need {len} bytes at offset {}, {} remain",
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn skip(&mut self, len: usize, what: &str) -> Result<()> {
        self.take(len, what).map(|_| ())
    }

    fn array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, what)?);
        Ok(out)
    }

    fn u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.array::<1>(what)?[0])
    }

    fn u16(&mut self, what: &str) -> Result<u16> {
        Ok(u16::from_be_bytes(self.array(what)?))
    }

    fn i32(&mut self, what: &str) -> Result<i32> {
        Ok(i32::from_be_bytes(self.array(what)?))
    }

    /// Read a signed length and reject negatives.
    fn length(&mut self, what: &str) -> Result<usize> {
        let raw = self.i32(what)?;
        usize::try_from(raw).map_err(|_| parse_err(format!("{what} is negative ({raw})")))
    }
}

/// Extract the embedded still image from a face record.
///
/// Returns exactly the declared image bytes, which may be empty. Any
/// truncation or inconsistent length is a `BiometricParse` error.
#[instrument(skip_all, fields(record_len = record.len()))]
pub fn extract_face_image(record: &[u8]) -> Result<Vec<u8>> {
    let mut header = Cursor::new(record);
    header.skip(4, "format identifier")?;
    header.skip(4, "version")?;

    let record_length = header.length("record length")?;
    if record_length > record.len() {
        return Err(parse_err(format!(
            "record length {record_length} exceeds buffer of {} bytes",
            record.len()
        )));
    }

    header.skip(2, "representation count")?;
    header.skip(1, "certification flag")?;
    header.skip(2, "temporal sequence")?;

    let representation_length = header.length("representation length")?;
    let body_len = representation_length
        .checked_sub(4)
        .ok_or_else(|| parse_err(format!("representation length {representation_length} < 4")))?;
    let body = header.take(body_len, "representation block")?;

    let mut rep = Cursor::new(body);
    rep.skip(CAPTURE_DETAILS_LEN, "capture details")?;

    let quality_blocks = usize::from(rep.u8("quality block count")?);
    rep.skip(quality_blocks * QUALITY_BLOCK_LEN, "quality blocks")?;

    let landmark_points = usize::from(rep.u16("landmark point count")?);
    rep.skip(FACIAL_INFORMATION_LEN, "facial information")?;
    rep.skip(landmark_points * LANDMARK_POINT_LEN, "landmark points")?;

    let face_type = rep.u8("face type")?;
    let image_data_type = rep.u8("image data type")?;
    rep.skip(OTHER_IMAGE_INFO_LEN, "other image information")?;

    let image_len = rep.length("image data length")?;
    let image = rep.take(image_len, "image data")?;

    debug!(face_type, image_data_type, image_len, "face image extracted");
    Ok(image.to_vec())
}

/// Encode a minimal face record (no quality blocks, no landmarks) around
/// `image`. Produces fixtures that `extract_face_image` accepts.
pub fn encode_face_record(image: &[u8]) -> Vec<u8> {
    let body_len = CAPTURE_DETAILS_LEN + 1 + 2 + FACIAL_INFORMATION_LEN + 1 + 1
        + OTHER_IMAGE_INFO_LEN
        + 4
        + image.len();
    let representation_length = body_len + 4;
    let record_length = HEADER_LEN + representation_length;

    let mut out = Vec::with_capacity(record_length);
    out.extend_from_slice(b"FAC\0");
    out.extend_from_slice(b"030\0");
    out.extend_from_slice(&(record_length as i32).to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out.push(0);
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(&(representation_length as i32).to_be_bytes());
    out.extend_from_slice(&[0; CAPTURE_DETAILS_LEN]);
    out.push(0);
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&[0; FACIAL_INFORMATION_LEN]);
    out.push(1);
    out.push(0);
    out.extend_from_slice(&[0; OTHER_IMAGE_INFO_LEN]);
    out.extend_from_slice(&(image.len() as i32).to_be_bytes());
    out.extend_from_slice(image);
    out
}

/// Look up the Face modality in a biometric container and extract its image.
///
/// `Ok(None)` when the container has no face record. A face record that
/// fails to parse is an error, never a missing photo.
#[instrument(skip_all, fields(container_len = container.len()))]
pub fn extract_applicant_face(
    biometrics: &dyn BiometricContainer,
    container: &str,
) -> Result<Option<Vec<u8>>> {
    match biometrics.extract_modality(container, FACE_MODALITY)? {
        Some(record) => extract_face_image(&record).map(Some),
        None => {
            debug!("no face modality in biometric container");
            Ok(None)
        }
    }
}

/// Render image bytes as a PNG data URI.
pub fn png_data_uri(image: &[u8]) -> String {
    format!("{PNG_DATA_URI_PREFIX}{}", STANDARD.encode(image))
}
