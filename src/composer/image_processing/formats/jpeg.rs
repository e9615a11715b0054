use image::{DynamicImage, ImageEncoder, RgbaImage, codecs::jpeg::JpegEncoder};
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

use crate::composer::ComposerError;

const ICC_IDENTIFIER: &[u8; 12] = b"ICC_PROFILE\0";

/// Extract the ICC profile from JPEG APP2 segments, joining multi-segment profiles
pub fn extract_icc_profile(data: &[u8]) -> Option<Vec<u8>> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }

    let mut chunks: Vec<(u8, &[u8])> = Vec::new();
    let mut pos = 2;

    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            break;
        }
        let marker = data[pos + 1];
        // Padding bytes between segments
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // Start of scan: headers are over
        if marker == 0xDA || marker == 0xD9 {
            break;
        }

        let segment_length = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if segment_length < 2 {
            break;
        }
        let segment_end = pos + 2 + segment_length;
        let Some(segment) = data.get(pos + 4..segment_end) else {
            break;
        };

        if marker == 0xE2 && segment.len() > 14 && segment.starts_with(ICC_IDENTIFIER) {
            // Identifier is followed by the chunk's sequence number and the chunk count
            chunks.push((segment[12], &segment[14..]));
        }

        pos = segment_end;
    }

    if chunks.is_empty() {
        return None;
    }

    chunks.sort_by_key(|(sequence, _)| *sequence);
    let profile: Vec<u8> = chunks.into_iter().flat_map(|(_, c)| c.iter().copied()).collect();
    debug!("Found ICC profile in JPEG: {} bytes", profile.len());
    Some(profile)
}

/// Save the composed view as JPEG, embedding the source ICC profile when present
pub fn save_with_profile(
    image: &RgbaImage,
    path: &Path,
    quality: u8,
    icc_profile: Option<&[u8]>,
) -> Result<(), ComposerError> {
    // JPEG doesn't support alpha channel, so convert to RGB
    let rgb_image = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let output = BufWriter::new(std::fs::File::create(path)?);
    let mut encoder = JpegEncoder::new_with_quality(output, quality);

    if let Some(profile_data) = icc_profile {
        match encoder.set_icc_profile(profile_data.to_vec()) {
            Ok(()) => debug!("JPEG written with ICC profile: {} bytes", profile_data.len()),
            Err(e) => debug!("JPEG encoder rejected ICC profile ({}), writing without it", e),
        }
    }

    encoder.write_image(
        &rgb_image,
        rgb_image.width(),
        rgb_image.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(())
}
