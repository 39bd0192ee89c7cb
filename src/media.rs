//! Helpers for data URIs, narration audio and placeholder images.

use rand::Rng;

/// The placeholder shown when no video could be generated.
pub const PLACEHOLDER_IMAGE_BASE: &str = "https://picsum.photos/600/400";

/// Sample rate of the raw PCM returned by the speech model when its MIME
/// type does not say otherwise.
pub const DEFAULT_PCM_SAMPLE_RATE: u32 = 24_000;

/// Builds a `data:<mime>;base64,<payload>` URI.
pub fn data_uri(mime_type: &str, base64_payload: &str) -> String {
    format!("data:{mime_type};base64,{base64_payload}")
}

/// Splits a base64 data URI into its MIME type and payload.
///
/// Returns `None` unless the string has the `data:<mime>;base64,<payload>`
/// shape with a non-empty MIME type and payload.
pub fn parse_data_uri(uri: &str) -> Option<(&str, &str)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime_type, payload) = rest.split_once(";base64,")?;
    if mime_type.is_empty() || payload.is_empty() {
        return None;
    }
    Some((mime_type, payload))
}

/// A fresh placeholder image URL.
///
/// The random query value only defeats caching.
pub fn placeholder_image_url() -> String {
    let cache_buster: f64 = rand::thread_rng().gen();
    format!("{PLACEHOLDER_IMAGE_BASE}?random={cache_buster}")
}

/// Reads the `rate=` parameter of a PCM MIME type such as
/// `audio/L16;codec=pcm;rate=24000`.
pub fn pcm_sample_rate(mime_type: &str) -> Option<u32> {
    mime_type
        .split(';')
        .filter_map(|param| param.trim().split_once('='))
        .find(|(name, _)| name.eq_ignore_ascii_case("rate"))
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// Wraps little-endian PCM samples in a RIFF/WAVE container.
///
/// Returns `None` when the header fields would not fit their 32-bit slots.
pub fn pcm_to_wav(
    pcm: &[u8],
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
) -> Option<Vec<u8>> {
    let block_align = channels.checked_mul(bits_per_sample / 8)?;
    let byte_rate = sample_rate.checked_mul(u32::from(block_align))?;
    let data_len = u32::try_from(pcm.len()).ok()?;
    let riff_len = data_len.checked_add(36)?;

    let mut wav = Vec::with_capacity(44 + pcm.len());
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&riff_len.to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    // PCM format tag
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());

    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(pcm);
    Some(wav)
}
