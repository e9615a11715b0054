use flate2::read::ZlibDecoder;
use image::{ImageEncoder, RgbaImage, codecs::png::PngEncoder};
use std::io::{BufWriter, Read};
use std::path::Path;
use tracing::debug;

use crate::composer::ComposerError;

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// Extract the ICC profile carried in a PNG `iCCP` chunk
pub fn extract_icc_profile(data: &[u8]) -> Option<Vec<u8>> {
    if data.len() < 8 || &data[0..8] != PNG_SIGNATURE {
        return None;
    }

    let mut pos = 8;
    while pos + 12 <= data.len() {
        let chunk_length =
            u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        let chunk_type = &data[pos + 4..pos + 8];
        let chunk_end = (pos + 8).checked_add(chunk_length)?;

        if chunk_type == b"iCCP" {
            let chunk_data = data.get(pos + 8..chunk_end)?;
            return decode_iccp(chunk_data);
        }
        if chunk_type == b"IEND" || chunk_type == b"IDAT" {
            // iCCP must precede image data
            break;
        }

        // length + type + data + CRC
        pos = chunk_end + 4;
    }

    None
}

/// iCCP layout: profile name, NUL, compression method (0 = zlib), compressed profile
fn decode_iccp(chunk_data: &[u8]) -> Option<Vec<u8>> {
    let null_pos = chunk_data.iter().position(|&b| b == 0)?;
    if null_pos + 2 > chunk_data.len() || chunk_data[null_pos + 1] != 0 {
        return None;
    }

    let mut decoder = ZlibDecoder::new(&chunk_data[null_pos + 2..]);
    let mut profile = Vec::new();
    decoder.read_to_end(&mut profile).ok()?;
    debug!("Found ICC profile in PNG: {} bytes", profile.len());
    Some(profile)
}

/// Save the composed view as PNG, embedding the source ICC profile when present
pub fn save_with_profile(
    image: &RgbaImage,
    path: &Path,
    icc_profile: Option<&[u8]>,
) -> Result<(), ComposerError> {
    let output = BufWriter::new(std::fs::File::create(path)?);
    let mut encoder = PngEncoder::new(output);

    if let Some(profile_data) = icc_profile {
        match encoder.set_icc_profile(profile_data.to_vec()) {
            Ok(()) => debug!("PNG written with ICC profile: {} bytes", profile_data.len()),
            Err(e) => debug!("PNG encoder rejected ICC profile ({}), writing without it", e),
        }
    }

    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(())
}
