/// Instruction sent with every video. The reply is expected to be bare SRT
/// with the spoken line followed by its translation in each block.
pub fn build_subtitle_prompt(source_language: &str, target_language: &str) -> String {
    format!(
        "Analyze this video and generate subtitles.
For each spoken segment, provide:
1. Start and End timestamps (in HH:MM:SS,mmm format)
2. Original {source} text
3. {target} translation

Output the result ONLY as a valid SRT file content.
Each subtitle block should look like:
[Index]
[Start] --> [End]
[{source} Text]
[{target} Translation]",
        source = source_language,
        target = target_language,
    )
}
