//! Script groups used to classify strong characters.

use unicode_script::{Script, UnicodeScript};

use super::Direction;

/// Scripts written right-to-left.
pub const RTL_SCRIPTS: &[Script] = &[
    Script::Arabic,
    Script::Hebrew,
    Script::Syriac,
    Script::Thaana,
];

/// Scripts written left-to-right.
///
/// This is a closed allow-list: a script missing from both tables is
/// treated as direction-neutral.
pub const LTR_SCRIPTS: &[Script] = &[
    Script::Armenian,
    Script::Bengali,
    Script::Bopomofo,
    Script::Braille,
    Script::Buhid,
    Script::Canadian_Aboriginal,
    Script::Cherokee,
    Script::Cyrillic,
    Script::Devanagari,
    Script::Ethiopic,
    Script::Georgian,
    Script::Greek,
    Script::Gujarati,
    Script::Gurmukhi,
    Script::Han,
    Script::Hangul,
    Script::Hanunoo,
    Script::Hiragana,
    Script::Inherited,
    Script::Kannada,
    Script::Katakana,
    Script::Khmer,
    Script::Lao,
    Script::Latin,
    Script::Limbu,
    Script::Malayalam,
    Script::Mongolian,
    Script::Myanmar,
    Script::Ogham,
    Script::Oriya,
    Script::Runic,
    Script::Sinhala,
    Script::Tagalog,
    Script::Tagbanwa,
    Script::Tamil,
    Script::Telugu,
    Script::Thai,
    Script::Tibetan,
    Script::Yi,
];

/// The two script groups consulted by first-strong-character detection.
///
/// # Example
///
/// ```
/// use autodir::direction::{Direction, ScriptTable};
///
/// let table = ScriptTable::default();
/// assert_eq!(table.first_strong("123 שלום"), Some(Direction::Rtl));
/// assert_eq!(table.first_strong("123 !?"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTable {
    rtl: Vec<Script>,
    ltr: Vec<Script>,
}

impl ScriptTable {
    /// Build a table from explicit script groups.
    ///
    /// A script listed in both groups resolves as right-to-left.
    pub fn new(rtl: impl IntoIterator<Item = Script>, ltr: impl IntoIterator<Item = Script>) -> Self {
        Self {
            rtl: rtl.into_iter().collect(),
            ltr: ltr.into_iter().collect(),
        }
    }

    /// Right-to-left scripts of this table.
    pub fn rtl_scripts(&self) -> &[Script] {
        &self.rtl
    }

    /// Left-to-right scripts of this table.
    pub fn ltr_scripts(&self) -> &[Script] {
        &self.ltr
    }

    /// Add a script to the right-to-left group, removing it from the
    /// left-to-right group.
    #[must_use]
    pub fn with_rtl(mut self, script: Script) -> Self {
        self.ltr.retain(|s| *s != script);
        if !self.rtl.contains(&script) {
            self.rtl.push(script);
        }
        self
    }

    /// Drop a script from both groups, making it direction-neutral.
    #[must_use]
    pub fn without(mut self, script: Script) -> Self {
        self.rtl.retain(|s| *s != script);
        self.ltr.retain(|s| *s != script);
        self
    }

    /// Direction of a single character, if it is strong.
    pub fn classify(&self, ch: char) -> Option<Direction> {
        let script = ch.script();
        if self.rtl.contains(&script) {
            Some(Direction::Rtl)
        } else if self.ltr.contains(&script) {
            Some(Direction::Ltr)
        } else {
            None
        }
    }

    /// Direction of the first strong character in `text`.
    pub fn first_strong(&self, text: &str) -> Option<Direction> {
        text.chars().find_map(|ch| self.classify(ch))
    }
}

impl Default for ScriptTable {
    fn default() -> Self {
        Self::new(RTL_SCRIPTS.iter().copied(), LTR_SCRIPTS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_groups_are_disjoint() {
        for script in RTL_SCRIPTS {
            assert!(!LTR_SCRIPTS.contains(script), "{script:?} in both groups");
        }
    }

    #[test]
    fn test_classify_common_characters_are_neutral() {
        let table = ScriptTable::default();
        for ch in ['1', ' ', '-', '!', '(', '\u{2022}'] {
            assert_eq!(table.classify(ch), None, "{ch:?} should be neutral");
        }
    }

    #[test]
    fn test_classify_rtl_scripts() {
        let table = ScriptTable::default();
        assert_eq!(table.classify('ש'), Some(Direction::Rtl));
        assert_eq!(table.classify('س'), Some(Direction::Rtl));
        assert_eq!(table.classify('ܐ'), Some(Direction::Rtl)); // Syriac alaph
        assert_eq!(table.classify('ހ'), Some(Direction::Rtl)); // Thaana haa
    }

    #[test]
    fn test_classify_ltr_scripts() {
        let table = ScriptTable::default();
        assert_eq!(table.classify('a'), Some(Direction::Ltr));
        assert_eq!(table.classify('Ж'), Some(Direction::Ltr));
        assert_eq!(table.classify('漢'), Some(Direction::Ltr));
        assert_eq!(table.classify('ひ'), Some(Direction::Ltr));
        assert_eq!(table.classify('한'), Some(Direction::Ltr));
        assert_eq!(table.classify('क'), Some(Direction::Ltr));
    }

    #[test]
    fn test_script_outside_both_groups_is_neutral() {
        // Old Italic is not in either list.
        let table = ScriptTable::default();
        assert_eq!(table.classify('\u{10300}'), None);
    }

    #[test]
    fn test_without_makes_script_neutral() {
        let table = ScriptTable::default().without(Script::Syriac);
        assert_eq!(table.classify('ܐ'), None);
        assert_eq!(table.first_strong("ܐ abc"), Some(Direction::Ltr));
    }

    #[test]
    fn test_with_rtl_moves_script_between_groups() {
        let table = ScriptTable::default().with_rtl(Script::Greek);
        assert_eq!(table.classify('λ'), Some(Direction::Rtl));
        assert!(!table.ltr_scripts().contains(&Script::Greek));
    }
}
