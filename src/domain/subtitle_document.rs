use std::fmt;

use super::Timestamp;

const TIMING_SEPARATOR: &str = "-->";

/// One cue: index, timing, the spoken text and its translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleBlock {
    pub index: u32,
    pub start: Timestamp,
    pub end: Timestamp,
    pub original: String,
    pub translation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleDocument {
    pub blocks: Vec<SubtitleBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubtitleParseError {
    #[error("block {block}: invalid index line {line:?}")]
    InvalidIndex { block: usize, line: String },
    #[error("block {block}: missing timing line")]
    MissingTiming { block: usize },
    #[error("block {block}: invalid timing line {line:?}")]
    InvalidTiming { block: usize, line: String },
    #[error("block {block}: no subtitle text")]
    MissingText { block: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubtitleViolation {
    #[error("document has no subtitle blocks")]
    Empty,
    #[error("block {block}: expected index {expected}, found {found}")]
    NonContiguousIndex {
        block: usize,
        expected: u32,
        found: u32,
    },
    #[error("block {block}: start {start} is after end {end}")]
    InvertedTiming {
        block: usize,
        start: Timestamp,
        end: Timestamp,
    },
    #[error("block {block}: starts at {start} before the previous block ends at {previous_end}")]
    Overlap {
        block: usize,
        start: Timestamp,
        previous_end: Timestamp,
    },
    #[error("block {block}: missing translated text")]
    MissingTranslation { block: usize },
}

impl SubtitleDocument {
    /// Parses SRT text block by block. Shape problems inside a block are errors;
    /// ordering problems across blocks are left to [`SubtitleDocument::validate`].
    pub fn parse(text: &str) -> Result<Self, SubtitleParseError> {
        let text = text.trim_start_matches('\u{feff}');
        let mut blocks = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in text.lines().map(str::trim_end) {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    blocks.push(SubtitleBlock::parse(&current, blocks.len() + 1)?);
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            blocks.push(SubtitleBlock::parse(&current, blocks.len() + 1)?);
        }

        Ok(Self { blocks })
    }

    /// Returns the first violation of the document invariants: contiguous
    /// indices, `start <= end`, no overlap and monotonically increasing times.
    pub fn validate(&self) -> Result<(), SubtitleViolation> {
        if self.blocks.is_empty() {
            return Err(SubtitleViolation::Empty);
        }

        let mut previous_end: Option<Timestamp> = None;
        for (position, block) in self.blocks.iter().enumerate() {
            let number = position + 1;
            let expected = number as u32;
            if block.index != expected {
                return Err(SubtitleViolation::NonContiguousIndex {
                    block: number,
                    expected,
                    found: block.index,
                });
            }
            if block.start > block.end {
                return Err(SubtitleViolation::InvertedTiming {
                    block: number,
                    start: block.start,
                    end: block.end,
                });
            }
            if let Some(previous_end) = previous_end {
                if block.start < previous_end {
                    return Err(SubtitleViolation::Overlap {
                        block: number,
                        start: block.start,
                        previous_end,
                    });
                }
            }
            if block.translation.trim().is_empty() {
                return Err(SubtitleViolation::MissingTranslation { block: number });
            }
            previous_end = Some(block.end);
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl SubtitleBlock {
    fn parse(lines: &[&str], block: usize) -> Result<Self, SubtitleParseError> {
        let index_line = lines[0].trim();
        let index = index_line
            .parse::<u32>()
            .map_err(|_| SubtitleParseError::InvalidIndex {
                block,
                line: index_line.to_string(),
            })?;

        let timing_line = lines
            .get(1)
            .map(|l| l.trim())
            .ok_or(SubtitleParseError::MissingTiming { block })?;
        let invalid_timing = || SubtitleParseError::InvalidTiming {
            block,
            line: timing_line.to_string(),
        };
        let (start, end) = timing_line
            .split_once(TIMING_SEPARATOR)
            .ok_or_else(invalid_timing)?;
        let start = start.trim().parse().map_err(|_| invalid_timing())?;
        let end = end.trim().parse().map_err(|_| invalid_timing())?;

        let original = lines
            .get(2)
            .map(|l| l.trim().to_string())
            .ok_or(SubtitleParseError::MissingText { block })?;
        let translation = lines
            .get(3..)
            .unwrap_or_default()
            .iter()
            .map(|l| l.trim())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Self {
            index,
            start,
            end,
            original,
            translation,
        })
    }
}

impl fmt::Display for SubtitleDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, block) in self.blocks.iter().enumerate() {
            if position > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", block.index)?;
            writeln!(f, "{} {} {}", block.start, TIMING_SEPARATOR, block.end)?;
            writeln!(f, "{}", block.original)?;
            if !block.translation.is_empty() {
                writeln!(f, "{}", block.translation)?;
            }
        }
        Ok(())
    }
}
