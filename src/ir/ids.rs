//! Newtype identifiers for generated images.

use std::fmt;

/// The identifier of one generated image, e.g. `log_007.png`.
///
/// Identifiers are file names relative to the session's image directory and
/// are what manifest files list, one per line.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageName(String);

impl ImageName {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The canonical name of the `index`-th generated image.
    pub fn for_index(index: usize) -> Self {
        Self(format!("log_{index:03}.png"))
    }

    /// The same stem with a different extension (no leading dot).
    pub fn with_extension(&self, extension: &str) -> Self {
        Self(format!("{}.{extension}", self.stem()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name without its extension (`log_007.png` -> `log_007`).
    pub fn stem(&self) -> &str {
        match self.0.rfind('.') {
            Some(dot) if dot > 0 => &self.0[..dot],
            _ => &self.0,
        }
    }

    /// The trailing run of ASCII digits in the stem, if any.
    ///
    /// `log_007.png` yields `Some(7)`; `cover.png` yields `None`.
    pub fn numeric_suffix(&self) -> Option<u64> {
        let stem = self.stem();
        let digits_start = stem
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(idx, _)| idx)?;
        stem[digits_start..].parse().ok()
    }

    /// Sort key that orders by numeric suffix first, then by name.
    ///
    /// Names without a numeric suffix sort after all numbered names.
    pub fn numeric_sort_key(&self) -> (bool, u64, &str) {
        match self.numeric_suffix() {
            Some(n) => (false, n, self.as_str()),
            None => (true, 0, self.as_str()),
        }
    }
}

impl fmt::Debug for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageName({})", self.0)
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ImageName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_index_is_zero_padded() {
        assert_eq!(ImageName::for_index(7).as_str(), "log_007.png");
        assert_eq!(ImageName::for_index(1234).as_str(), "log_1234.png");
    }

    #[test]
    fn numeric_suffix_parses_trailing_digits() {
        assert_eq!(ImageName::new("log_007.png").numeric_suffix(), Some(7));
        assert_eq!(ImageName::new("img12").numeric_suffix(), Some(12));
        assert_eq!(ImageName::new("cover.png").numeric_suffix(), None);
        assert_eq!(ImageName::new("3d_cover.png").numeric_suffix(), None);
    }

    #[test]
    fn numeric_sort_beats_lexicographic() {
        let mut names = vec![
            ImageName::new("log_10.png"),
            ImageName::new("zeta.png"),
            ImageName::new("log_9.png"),
        ];
        names.sort_by(|a, b| a.numeric_sort_key().cmp(&b.numeric_sort_key()));
        let sorted: Vec<&str> = names.iter().map(ImageName::as_str).collect();
        assert_eq!(sorted, vec!["log_9.png", "log_10.png", "zeta.png"]);
    }

    #[test]
    fn stem_strips_only_last_extension() {
        assert_eq!(ImageName::new("a.b.png").stem(), "a.b");
        assert_eq!(ImageName::new(".hidden").stem(), ".hidden");
    }

    #[test]
    fn with_extension_swaps_suffix() {
        assert_eq!(ImageName::for_index(3).with_extension("bmp").as_str(), "log_003.bmp");
    }
}
