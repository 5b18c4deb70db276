//! Logo input: turns an image file into an embeddable `data:` URI and back.
//!
//! The invoice only stores the URI string. Image content and size are not checked.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use url::Url;

use crate::error::LogoError;

static DATA_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^data:(?P<mime>[\w.+-]+/[\w.+-]+)(?:;[\w.+-]+=[\w.+-]+)*;base64,(?P<data>.*)$")
        .expect("data URI pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLogo {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DecodedLogo {
    /// File extension Typst uses to pick an image decoder.
    pub fn extension(&self) -> Result<&'static str, LogoError> {
        match self.mime.as_str() {
            "image/png" => Ok("png"),
            "image/jpeg" | "image/jpg" => Ok("jpg"),
            "image/gif" => Ok("gif"),
            "image/svg+xml" => Ok("svg"),
            "image/webp" => Ok("webp"),
            other => Err(LogoError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Paths dragged into a terminal arrive quoted, backslash-escaped or as `file://` URLs.
pub fn clean_dropped_path(raw: &str) -> PathBuf {
    let mut s = raw.trim();
    for quote in ['\'', '"'] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            s = &s[1..s.len() - 1];
        }
    }
    let file_url = Url::parse(s).ok().filter(|url| url.scheme() == "file");
    if let Some(path) = file_url.and_then(|url| url.to_file_path().ok()) {
        return path;
    }
    PathBuf::from(s.replace("\\ ", " "))
}

pub fn read_logo(path: &Path) -> Result<DecodedLogo, LogoError> {
    if !path.is_file() {
        return Err(LogoError::NotFound(path.to_path_buf()));
    }
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(LogoError::NotAnImage {
            path: path.to_path_buf(),
            mime: mime.essence_str().to_string(),
        });
    }
    Ok(DecodedLogo {
        mime: mime.essence_str().to_string(),
        bytes: fs::read(path)?,
    })
}

/// Read an image file into the `data:` URI stored on the invoice.
pub fn load_logo(path: &Path) -> Result<String, LogoError> {
    let logo = read_logo(path)?;
    Ok(to_data_uri(&logo.mime, &logo.bytes))
}

pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

pub fn decode_data_uri(uri: &str) -> Result<DecodedLogo, LogoError> {
    let caps = DATA_URI.captures(uri.trim()).ok_or(LogoError::MalformedDataUri)?;
    let bytes = STANDARD.decode(caps["data"].trim())?;
    Ok(DecodedLogo {
        mime: caps["mime"].to_ascii_lowercase(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("noblefit-logo-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_clean_dropped_path() {
        assert_eq!(clean_dropped_path("  '/tmp/my logo.png' "), PathBuf::from("/tmp/my logo.png"));
        assert_eq!(clean_dropped_path("\"/tmp/logo.png\""), PathBuf::from("/tmp/logo.png"));
        assert_eq!(clean_dropped_path("/tmp/my\\ logo.png"), PathBuf::from("/tmp/my logo.png"));
        assert_eq!(clean_dropped_path("file:///tmp/my%20logo.png"), PathBuf::from("/tmp/my logo.png"));
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_dropped_file_url_decodes_every_escape() {
        assert_eq!(
            clean_dropped_path("file:///tmp/my%20logo%20%28%C3%A9%29.png"),
            PathBuf::from("/tmp/my logo (é).png")
        );
        assert_eq!(
            clean_dropped_path("'file:///tmp/caf%C3%A9/logo%231.png'"),
            PathBuf::from("/tmp/café/logo#1.png")
        );
    }

    #[test]
    fn test_dropped_file_url_loads_non_ascii_logo() {
        let dir = scratch_dir().join("logo (é) dir");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("marca ñ.png");
        fs::write(&path, PNG_HEADER).unwrap();

        let dropped = Url::from_file_path(&path).unwrap().to_string();
        assert!(dropped.contains("%C3%A9"), "{dropped}");
        let cleaned = clean_dropped_path(&dropped);
        assert_eq!(cleaned, path);

        let uri = load_logo(&cleaned).unwrap();
        assert_eq!(decode_data_uri(&uri).unwrap().bytes, PNG_HEADER);
        fs::remove_dir_all(dir.parent().unwrap()).ok();
    }

    #[test]
    fn test_load_logo_round_trips_through_data_uri() {
        let dir = scratch_dir();
        let path = dir.join("logo.png");
        fs::write(&path, PNG_HEADER).unwrap();

        let uri = load_logo(&path).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));

        let decoded = decode_data_uri(&uri).unwrap();
        assert_eq!(decoded.mime, "image/png");
        assert_eq!(decoded.bytes, PNG_HEADER);
        assert_eq!(decoded.extension().unwrap(), "png");
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_load_logo_rejects_missing_and_non_images() {
        let dir = scratch_dir();
        assert!(matches!(load_logo(&dir.join("nope.png")), Err(LogoError::NotFound(_))));

        let notes = dir.join("notes.txt");
        fs::write(&notes, "hello").unwrap();
        assert!(matches!(load_logo(&notes), Err(LogoError::NotAnImage { .. })));
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_decode_data_uri_with_parameters() {
        let decoded = decode_data_uri("data:image/svg+xml;charset=utf-8;base64,PHN2Zy8+").unwrap();
        assert_eq!(decoded.mime, "image/svg+xml");
        assert_eq!(decoded.bytes, b"<svg/>");
        assert_eq!(decoded.extension().unwrap(), "svg");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_data_uri("https://example.com/logo.png"), Err(LogoError::MalformedDataUri)));
        assert!(matches!(decode_data_uri("data:image/png;base64,@@@"), Err(LogoError::Base64(_))));
    }

    #[test]
    fn test_unsupported_export_format() {
        let logo = DecodedLogo { mime: "image/tiff".to_string(), bytes: vec![] };
        assert!(matches!(logo.extension(), Err(LogoError::UnsupportedFormat(_))));
    }
}
