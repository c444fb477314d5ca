// src/services/sniff.rs

//! Payload sniffing for the playability phase.
//!
//! A stream counts as "ready to play" once its first bytes match a known
//! container or codec signature. Nothing is decoded.
//!
//! Bare MPEG audio and ADTS streams have no magic number, only a frame sync
//! word. These are accepted only when the server did not label the body as
//! something else, and only once two chained frames are seen.

use crate::models::StreamFormat;

/// MPEG-TS packet size.
const TS_PACKET: usize = 188;

/// Shortest ADTS frame: the header alone.
const ADTS_HEADER: usize = 7;

/// How the server labelled the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    /// `audio/*`, `video/*`, `application/ogg`, ...
    Media,
    /// HLS or PLS playlists
    Playlist,
    /// HTML, JSON, images and other documents
    NonMedia,
    /// Missing header or `application/octet-stream`
    Unknown,
}

/// Classify a `Content-Type` header value.
pub fn classify_content_type(content_type: Option<&str>) -> ContentClass {
    let Some(raw) = content_type else {
        return ContentClass::Unknown;
    };
    let mime = raw
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "application/vnd.apple.mpegurl"
        | "application/x-mpegurl"
        | "audio/mpegurl"
        | "audio/x-mpegurl"
        | "audio/x-scpls"
        | "application/pls+xml" => ContentClass::Playlist,
        "application/ogg" | "application/x-ogg" | "application/aacp" | "video/mp2t" => {
            ContentClass::Media
        }
        "" | "application/octet-stream" | "binary/octet-stream" => ContentClass::Unknown,
        m if m.starts_with("audio/") || m.starts_with("video/") => ContentClass::Media,
        _ => ContentClass::NonMedia,
    }
}

/// Recognise the stream format from its leading bytes.
///
/// Returns `None` when the buffer is too short or matches nothing; callers
/// keep reading until their byte budget is exhausted.
pub fn sniff(bytes: &[u8], class: ContentClass) -> Option<StreamFormat> {
    if bytes.starts_with(b"ID3") {
        return Some(StreamFormat::Mp3);
    }
    if bytes.starts_with(b"OggS") {
        return Some(StreamFormat::Ogg);
    }
    if bytes.starts_with(b"fLaC") {
        return Some(StreamFormat::Flac);
    }
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WAVE" {
        return Some(StreamFormat::Wav);
    }
    if bytes.len() >= 8 && &bytes[4..8] == b"ftyp" {
        return Some(StreamFormat::Mp4);
    }
    if is_mpeg_ts(bytes) {
        return Some(StreamFormat::MpegTs);
    }
    match class {
        ContentClass::Media | ContentClass::Unknown => scan_frame_sync(bytes),
        ContentClass::Playlist | ContentClass::NonMedia => None,
    }
}

/// Whether the body is an M3U/HLS or PLS playlist rather than media.
pub fn is_playlist(bytes: &[u8]) -> bool {
    let head = strip_text_prefix(bytes);
    head.starts_with(b"#EXTM3U")
        || (head.len() >= 10 && head[..10].eq_ignore_ascii_case(b"[playlist]"))
}

/// Skip a UTF-8 BOM and leading whitespace.
fn strip_text_prefix(bytes: &[u8]) -> &[u8] {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

fn is_mpeg_ts(bytes: &[u8]) -> bool {
    bytes.len() > 2 * TS_PACKET
        && bytes[0] == 0x47
        && bytes[TS_PACKET] == 0x47
        && bytes[2 * TS_PACKET] == 0x47
}

/// Find a frame whose successor starts exactly one frame length later.
fn scan_frame_sync(bytes: &[u8]) -> Option<StreamFormat> {
    (0..bytes.len().saturating_sub(3)).find_map(|i| {
        if bytes[i] != 0xFF {
            return None;
        }
        let head = &bytes[i..];
        if let Some(frame) = AdtsHeader::parse(head) {
            let next = AdtsHeader::parse(bytes.get(i + frame.length..)?)?;
            return frame.continues_with(&next).then_some(StreamFormat::Aac);
        }
        let frame = MpegHeader::parse(head)?;
        let next = MpegHeader::parse(bytes.get(i + frame.length..)?)?;
        frame.continues_with(&next).then_some(StreamFormat::Mp3)
    })
}

/// Fields of an ADTS header needed to chain frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AdtsHeader {
    mpeg_id: u8,
    sampling_index: u8,
    length: usize,
}

impl AdtsHeader {
    /// 12-bit sync, layer 00, valid sampling index, 13-bit frame length.
    fn parse(h: &[u8]) -> Option<Self> {
        if h.len() < ADTS_HEADER || h[0] != 0xFF || h[1] & 0xF0 != 0xF0 {
            return None;
        }
        if (h[1] >> 1) & 0b11 != 0 {
            return None;
        }
        let sampling_index = (h[2] >> 2) & 0b1111;
        if sampling_index >= 13 {
            return None;
        }
        let length = (usize::from(h[3] & 0b11) << 11)
            | (usize::from(h[4]) << 3)
            | usize::from(h[5] >> 5);
        if length < ADTS_HEADER {
            return None;
        }
        Some(Self {
            mpeg_id: (h[1] >> 3) & 1,
            sampling_index,
            length,
        })
    }

    fn continues_with(&self, next: &Self) -> bool {
        self.mpeg_id == next.mpeg_id && self.sampling_index == next.sampling_index
    }
}

/// Fields of an MPEG audio frame header needed to chain frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MpegHeader {
    version: u8,
    layer: u8,
    sample_rate: u32,
    length: usize,
}

/// Bitrates in kbps by table row, indexed by the 4-bit bitrate field.
const BITRATES: [[u32; 15]; 5] = [
    // MPEG-1 Layer I
    [0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448],
    // MPEG-1 Layer II
    [0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384],
    // MPEG-1 Layer III
    [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320],
    // MPEG-2/2.5 Layer I
    [0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256],
    // MPEG-2/2.5 Layer II and III
    [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160],
];

impl MpegHeader {
    /// 11-bit sync, valid version, layer, bitrate and sample rate fields.
    fn parse(h: &[u8]) -> Option<Self> {
        if h.len() < 4 || h[0] != 0xFF || h[1] & 0xE0 != 0xE0 {
            return None;
        }
        let version = (h[1] >> 3) & 0b11;
        let layer = (h[1] >> 1) & 0b11;
        let bitrate_index = usize::from((h[2] >> 4) & 0b1111);
        let sample_rate_index = usize::from((h[2] >> 2) & 0b11);
        let padding = usize::from((h[2] >> 1) & 1);

        if version == 0b01 || layer == 0 || bitrate_index == 0 || bitrate_index == 0b1111 {
            return None;
        }
        let sample_rate = match version {
            0b11 => [44_100, 48_000, 32_000],
            0b10 => [22_050, 24_000, 16_000],
            _ => [11_025, 12_000, 8_000],
        }
        .get(sample_rate_index)
        .copied()?;

        let mpeg1 = version == 0b11;
        let row = match (mpeg1, layer) {
            (true, 0b11) => 0,
            (true, 0b10) => 1,
            (true, _) => 2,
            (false, 0b11) => 3,
            (false, _) => 4,
        };
        let bitrate = BITRATES[row][bitrate_index] as usize * 1000;
        let sample_rate_usize = sample_rate as usize;

        let length = match layer {
            // Layer I: 4-byte slots
            0b11 => (12 * bitrate / sample_rate_usize + padding) * 4,
            // Layer III outside MPEG-1 carries half the samples per frame
            0b01 if !mpeg1 => 72 * bitrate / sample_rate_usize + padding,
            _ => 144 * bitrate / sample_rate_usize + padding,
        };

        Some(Self {
            version,
            layer,
            sample_rate,
            length,
        })
    }

    fn continues_with(&self, next: &Self) -> bool {
        self.version == next.version
            && self.layer == next.layer
            && self.sample_rate == next.sample_rate
    }
}
