//! Text decoding, href resolution and image sniffing helpers.

use std::borrow::Cow;

/// Decode bytes to a string.
///
/// Tries UTF-8 first (a BOM is handled by encoding_rs), then the encoding
/// named by `hint_encoding`, then Windows-1252, which old ebooks commonly
/// use without declaring it.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Decode an HTML unit, honouring an `<?xml encoding="..."?>` or
/// `<meta charset="...">` declaration near the start of the file.
pub fn decode_markup(bytes: &[u8]) -> Cow<'_, str> {
    let hint = extract_xml_encoding(bytes).or_else(|| extract_meta_charset(bytes));
    decode_text(bytes, hint)
}

/// Extract the encoding from an XML declaration in the first 100 bytes.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(100)];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    quoted_value(&after_xml[enc_pos + 9..])
}

/// Extract `<meta charset="...">` from the first kilobyte.
fn extract_meta_charset(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];
    let pos = prefix
        .windows(8)
        .position(|w| w.eq_ignore_ascii_case(b"charset="))?;
    let after = &prefix[pos + 8..];
    quoted_value(after).or_else(|| {
        let end = after
            .iter()
            .position(|b| !(b.is_ascii_alphanumeric() || *b == b'-' || *b == b'_'))?;
        std::str::from_utf8(&after[..end]).ok()
    })
}

fn quoted_value(bytes: &[u8]) -> Option<&str> {
    let quote = *bytes.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let end = bytes[1..].iter().position(|&b| b == quote)? + 1;
    std::str::from_utf8(&bytes[1..end]).ok()
}

/// Resolve a link found in `base` (a unit href) to a resource href.
///
/// Fragments and queries are dropped and percent-escapes decoded. `..`
/// segments are applied against the directory of `base`; a leading `/` is
/// relative to the document root. Remote and `data:` URLs have no
/// resource href and give `None`.
///
/// ```
/// use docxflow::resolve_href;
///
/// assert_eq!(
///     resolve_href("text/ch1.html", "../images/logo%20big.png#x").as_deref(),
///     Some("images/logo big.png")
/// );
/// assert_eq!(resolve_href("ch1.html", "/img/a.png").as_deref(), Some("img/a.png"));
/// assert_eq!(resolve_href("ch1.html", "https://example.com/a.png"), None);
/// ```
pub fn resolve_href(base: &str, link: &str) -> Option<String> {
    if link.starts_with("data:") || link.contains("://") {
        return None;
    }

    let path = link.split(['#', '?']).next().unwrap_or_default();
    if path.is_empty() {
        return None;
    }
    let path = percent_encoding::percent_decode_str(path).decode_utf8_lossy();

    let mut stack: Vec<&str> = Vec::new();
    let relative = match path.strip_prefix('/') {
        Some(rooted) => rooted,
        None => {
            // Directory of the base href
            if let Some((dir, _file)) = base.rsplit_once('/') {
                stack.extend(dir.split('/').filter(|s| !s.is_empty() && *s != "."));
            }
            &path[..]
        }
    };

    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            s => stack.push(s),
        }
    }

    if stack.is_empty() {
        None
    } else {
        Some(stack.join("/"))
    }
}

/// Extract pixel dimensions from PNG, JPEG or GIF data.
pub fn extract_image_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 {
        return None;
    }

    // PNG: width/height in the IHDR chunk
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
        let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
        return Some((width, height));
    }

    if data.starts_with(&[0xFF, 0xD8]) {
        return extract_jpeg_dimensions(data);
    }

    // GIF: logical screen size, little-endian
    if data.starts_with(b"GIF") {
        let width = u16::from_le_bytes([data[6], data[7]]) as u32;
        let height = u16::from_le_bytes([data[8], data[9]]) as u32;
        return Some((width, height));
    }

    None
}

/// Walk JPEG segments up to the first SOF marker.
fn extract_jpeg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let mut i = 2;
    while i + 4 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];
        if matches!(
            marker,
            0xC0 | 0xC1
                | 0xC2
                | 0xC3
                | 0xC5
                | 0xC6
                | 0xC7
                | 0xC9
                | 0xCA
                | 0xCB
                | 0xCD
                | 0xCE
                | 0xCF
        ) && i + 9 < data.len()
        {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
            return Some((width, height));
        }

        let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + length;
    }
    None
}

/// Image formats found in source documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Jpeg,
    Png,
    Gif,
    Svg,
    WebP,
    Unknown,
}

impl MediaFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            MediaFormat::Jpeg => "image/jpeg",
            MediaFormat::Png => "image/png",
            MediaFormat::Gif => "image/gif",
            MediaFormat::Svg => "image/svg+xml",
            MediaFormat::WebP => "image/webp",
            MediaFormat::Unknown => "application/octet-stream",
        }
    }

    /// File extension used for the copy under `word/media`.
    pub fn extension(self) -> &'static str {
        match self {
            MediaFormat::Jpeg => "jpeg",
            MediaFormat::Png => "png",
            MediaFormat::Gif => "gif",
            MediaFormat::Svg => "svg",
            MediaFormat::WebP => "webp",
            MediaFormat::Unknown => "bin",
        }
    }

    /// Raster formats a word processor can display as a picture.
    pub fn is_embeddable(self) -> bool {
        matches!(self, MediaFormat::Jpeg | MediaFormat::Png | MediaFormat::Gif)
    }
}

/// Detect an image format from magic bytes, falling back to the extension.
pub fn detect_media_format(path: &str, data: &[u8]) -> MediaFormat {
    if data.starts_with(&[0xFF, 0xD8]) {
        return MediaFormat::Jpeg;
    }
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return MediaFormat::Png;
    }
    if data.starts_with(b"GIF8") {
        return MediaFormat::Gif;
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return MediaFormat::WebP;
    }

    let path_lower = path.to_ascii_lowercase();
    match path_lower.rsplit_once('.').map(|(_, ext)| ext) {
        Some("jpg" | "jpeg") => MediaFormat::Jpeg,
        Some("png") => MediaFormat::Png,
        Some("gif") => MediaFormat::Gif,
        Some("svg") => MediaFormat::Svg,
        Some("webp") => MediaFormat::WebP,
        _ => MediaFormat::Unknown,
    }
}
