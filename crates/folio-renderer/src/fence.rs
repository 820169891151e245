//! Code fence tracking for line-based parsing.
//!
//! Tracks whether we're inside a fenced code block so that directive markers
//! (`:::`) and headings inside code samples are never interpreted.

/// Fence transition produced by a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FenceMarker {
    /// Opening fence with its info-string language (lowercased, may be empty).
    Open { language: String },
    /// Closing fence for the currently open block.
    Close,
}

/// Tracks code fence state during line-by-line processing.
///
/// Code fences in `CommonMark` can use backticks or tildes (three or more).
/// The closing fence must use the same character and be at least as long
/// as the opening fence.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    /// Character used for the current fence (backtick or tilde).
    fence_char: Option<char>,
    /// Length of the opening fence (minimum length for closing).
    fence_len: usize,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Check if currently inside a fenced code block.
    pub(crate) fn in_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Update fence state based on a line.
    ///
    /// Returns the transition if the line opens or closes a fence.
    pub(crate) fn update(&mut self, line: &str) -> Option<FenceMarker> {
        let trimmed = line.trim_start();

        if let Some(fence_char) = self.fence_char {
            if is_closing_fence(trimmed, fence_char, self.fence_len) {
                self.fence_char = None;
                self.fence_len = 0;
                return Some(FenceMarker::Close);
            }
            return None;
        }

        let (ch, len) = detect_fence(trimmed)?;
        self.fence_char = Some(ch);
        self.fence_len = len;
        let language = trimmed[len..]
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        Some(FenceMarker::Open { language })
    }
}

/// Detect if a line starts a code fence.
///
/// Returns the fence character and length if found.
fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    // Backtick info strings may not contain backticks
    if count < 3 || (first == '`' && trimmed[count..].contains('`')) {
        return None;
    }
    Some((first, count))
}

/// Check if a line is a valid closing fence.
///
/// The closing fence must use the same character, be at least as long as
/// the opening fence, and carry nothing but whitespace after it.
fn is_closing_fence(trimmed: &str, expected_char: char, min_len: usize) -> bool {
    if !trimmed.starts_with(expected_char) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == expected_char).count();
    count >= min_len && trimmed[count..].chars().all(char::is_whitespace)
}
