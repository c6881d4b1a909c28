const FENCE: &str = "```";
const TIMING_ARROW: &str = "-->";
const FORMAT_TAG: &str = "srt";

/// Pulls the subtitle payload out of a model reply that may be wrapped in a
/// markdown code fence.
///
/// Without a fence the trimmed reply is returned as is. With one, the reply is
/// split on the fence and the first segment containing `-->` wins; a leading
/// `srt` language tag on that segment is dropped. When no segment contains
/// `-->` the whole trimmed reply is kept. No SRT validation happens here.
pub fn extract_subtitle_document(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.contains(FENCE) {
        return trimmed.to_string();
    }

    match trimmed
        .split(FENCE)
        .find(|segment| segment.contains(TIMING_ARROW))
    {
        Some(segment) => {
            let segment = segment.trim();
            segment
                .strip_prefix(FORMAT_TAG)
                .map(str::trim)
                .unwrap_or(segment)
                .to_string()
        }
        None => trimmed.to_string(),
    }
}
