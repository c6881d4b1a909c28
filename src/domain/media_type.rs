use std::fmt;
use std::path::Path;

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// MIME type forwarded to the transcription collaborator alongside the video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType(String);

impl MediaType {
    /// Trusts the client's declared type when it names audio or video, otherwise
    /// guesses from the file extension.
    pub fn from_upload(declared: Option<&str>, filename: &str) -> Self {
        if let Some(declared) = declared {
            let declared = declared.trim().to_ascii_lowercase();
            if declared.starts_with("video/") || declared.starts_with("audio/") {
                return Self(declared);
            }
        }

        let guessed = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| Self::from_extension(&ext.to_ascii_lowercase()));

        Self(guessed.unwrap_or(FALLBACK_MEDIA_TYPE).to_string())
    }

    pub fn from_raw(media_type: impl Into<String>) -> Self {
        Self(media_type.into())
    }

    fn from_extension(ext: &str) -> Option<&'static str> {
        let mime = match ext {
            "mp4" | "m4v" => "video/mp4",
            "mov" => "video/quicktime",
            "webm" => "video/webm",
            "mkv" => "video/x-matroska",
            "avi" => "video/x-msvideo",
            "mpeg" | "mpg" => "video/mpeg",
            "3gp" => "video/3gpp",
            "wmv" => "video/x-ms-wmv",
            "flv" => "video/x-flv",
            "mp3" => "audio/mpeg",
            "wav" => "audio/wav",
            "m4a" => "audio/mp4",
            "ogg" => "audio/ogg",
            "flac" => "audio/flac",
            _ => return None,
        };
        Some(mime)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
