use std::sync::Arc;

use crate::geom::Rect;

/// Generates a node's content from its laid-out Box.
pub type ContentFn = Arc<dyn Fn(&Rect) -> String + Send + Sync>;

/// Text displayed by a node.
///
/// Row wrapping slices content by *display index*. When the string holds any
/// multi-byte character, display indices count `char`s and are translated to
/// byte offsets before slicing; otherwise they are byte offsets. Translation
/// always lands on a `char` boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    /// The current string, if one has been set.
    value: Option<String>,
    /// True if `value` contains a multi-byte character.
    multibyte: bool,
}

impl Content {
    /// Construct content holding a string.
    pub fn new(value: impl Into<String>) -> Self {
        let mut c = Self::default();
        c.set_value(value);
        c
    }

    /// Replace the string and recompute the multi-byte flag.
    pub fn set_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.multibyte = value.len() != value.chars().count();
        self.value = Some(value);
    }

    /// The current string, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// True if there is no string or the string is empty.
    pub fn is_blank(&self) -> bool {
        self.value.as_deref().is_none_or(str::is_empty)
    }

    /// True if the string contains a multi-byte character.
    pub fn is_multibyte(&self) -> bool {
        self.multibyte
    }

    /// Length in display indices.
    pub fn display_len(&self) -> usize {
        let s = self.value.as_deref().unwrap_or_default();
        if self.multibyte {
            s.chars().count()
        } else {
            s.len()
        }
    }

    /// Translate a display index to a byte offset. Indices past the end are
    /// extrapolated one byte per index, so an exclusive end one past the last
    /// character maps to the string length.
    pub fn byte_index(&self, display: usize) -> usize {
        let s = self.value.as_deref().unwrap_or_default();
        if !self.multibyte {
            return display;
        }
        let mut count = 0;
        for (offset, _) in s.char_indices() {
            if count == display {
                return offset;
            }
            count += 1;
        }
        s.len() + (display - count)
    }

    /// The substring between two display indices. Translated offsets beyond
    /// the string are clamped to its end.
    pub fn display_substring(&self, a: usize, b: usize) -> &str {
        let s = self.value.as_deref().unwrap_or_default();
        let end = self.byte_index(b).min(s.len());
        let start = self.byte_index(a).min(end);
        &s[start..end]
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn ascii_uses_byte_offsets() {
        let c = Content::new("hello world");
        assert!(!c.is_multibyte());
        assert_eq!(c.display_len(), 11);
        assert_eq!(c.display_substring(0, 5), "hello");
        assert_eq!(c.display_substring(6, 11), "world");
        assert_eq!(c.byte_index(20), 20);
    }

    #[test]
    fn multibyte_uses_char_offsets() {
        let c = Content::new("a┌─┐b");
        assert!(c.is_multibyte());
        assert_eq!(c.display_len(), 5);
        assert_eq!(c.display_substring(0, 1), "a");
        assert_eq!(c.display_substring(1, 4), "┌─┐");
        assert_eq!(c.display_substring(4, 5), "b");
        assert_eq!(c.display_substring(3, 10), "┐b");
    }

    #[test]
    fn byte_index_extrapolates_past_end() {
        let c = Content::new("é");
        assert_eq!(c.byte_index(0), 0);
        assert_eq!(c.byte_index(1), 2);
        assert_eq!(c.byte_index(3), 4);
    }

    #[test]
    fn blank() {
        assert!(Content::default().is_blank());
        assert!(Content::new("").is_blank());
        assert!(!Content::new(" ").is_blank());
        assert_eq!(Content::default().display_len(), 0);
        assert_eq!(Content::default().display_substring(0, 4), "");
    }

    #[test]
    fn reset_clears_multibyte_flag() {
        let mut c = Content::new("╔═╗");
        assert!(c.is_multibyte());
        c.set_value("plain");
        assert!(!c.is_multibyte());
        assert_eq!(c.value(), Some("plain"));
    }

    fn mixed() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                Just('a'),
                Just('\n'),
                Just('é'),
                Just('─'),
                Just('😀'),
                any::<char>(),
            ],
            0..40,
        )
        .prop_map(|v| v.into_iter().collect())
    }

    proptest! {
        #[test]
        fn display_len_matches_char_count(s in mixed()) {
            let c = Content::new(s.clone());
            prop_assert_eq!(c.display_len(), s.chars().count());
        }

        #[test]
        fn substrings_never_split_chars(s in mixed(), a in 0usize..50, b in 0usize..50) {
            let c = Content::new(s.clone());
            let (a, b) = (a.min(b), a.max(b));
            let sub = c.display_substring(a, b);
            let expected: String = s.chars().skip(a).take(b - a).collect();
            prop_assert_eq!(sub, expected.as_str());
        }

        #[test]
        fn every_boundary_is_a_char_boundary(s in mixed()) {
            let c = Content::new(s.clone());
            for i in 0..=c.display_len() {
                prop_assert!(s.is_char_boundary(c.byte_index(i)));
            }
        }
    }
}
