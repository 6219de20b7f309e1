use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::CharFilter;

/// A char filter that strips accents and other diacritics.
///
/// The input is decomposed with NFKD and every combining mark is dropped, so
/// "Crème Brûlée" becomes "Creme Brulee" and the fullwidth "Ａ" becomes "A".
#[derive(Clone, Debug, Default)]
pub struct AccentFoldingCharFilter;

impl AccentFoldingCharFilter {
    pub fn new() -> Self {
        AccentFoldingCharFilter
    }
}

impl CharFilter for AccentFoldingCharFilter {
    fn filter(&self, input: &str) -> String {
        if input.is_ascii() {
            return input.to_string();
        }
        input.nfkd().filter(|c| !is_combining_mark(*c)).collect()
    }

    fn name(&self) -> &'static str {
        "accent_fold"
    }
}
