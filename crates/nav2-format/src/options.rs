//! Decoder configuration.

use std::ops::RangeInclusive;

/// Header versions this decoder has been exercised against.
pub const SUPPORTED_VERSIONS: RangeInclusive<u32> = 1..=3;

/// Options controlling how strictly a `.nav2` buffer is decoded.
///
/// The defaults match trusted game data: an unknown version is only logged,
/// and linked lists are followed without revisit tracking.
///
/// ```
/// use nav2_format::DecodeOptions;
///
/// let options = DecodeOptions::new().strict_version(true).reject_revisits(true);
/// assert!(options.is_strict_version());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    strict_version: bool,
    supported_versions: RangeInclusive<u32>,
    reject_revisits: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            strict_version: false,
            supported_versions: SUPPORTED_VERSIONS,
            reject_revisits: false,
        }
    }
}

impl DecodeOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for input that may be corrupt or hostile.
    pub fn untrusted() -> Self {
        Self::default().reject_revisits(true)
    }

    /// Fail with `UnsupportedVersion` instead of logging a warning.
    pub fn strict_version(mut self, strict: bool) -> Self {
        self.strict_version = strict;
        self
    }

    /// Override the accepted header version range.
    pub fn supported_versions(mut self, versions: RangeInclusive<u32>) -> Self {
        self.supported_versions = versions;
        self
    }

    /// Fail when a linked record list visits the same record twice.
    pub fn reject_revisits(mut self, reject: bool) -> Self {
        self.reject_revisits = reject;
        self
    }

    pub fn is_strict_version(&self) -> bool {
        self.strict_version
    }

    pub fn versions(&self) -> &RangeInclusive<u32> {
        &self.supported_versions
    }

    pub fn rejects_revisits(&self) -> bool {
        self.reject_revisits
    }
}
