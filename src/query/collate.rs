//! Vietnamese-aware string ordering.

use std::cmp::Ordering;

const ALPHABET: &str = "aăâbcdđeêfghijklmnoôơpqrstuưvwxyz";

// Each row lists one base vowel followed by its tone forms in order:
// level, grave, hook above, tilde, acute, dot below.
const TONE_ROWS: [&str; 12] = [
    "aàảãáạ", "ăằẳẵắặ", "âầẩẫấậ", "eèẻẽéẹ", "êềểễếệ", "iìỉĩíị", "oòỏõóọ", "ôồổỗốộ",
    "ơờởỡớợ", "uùủũúụ", "ưừửữứự", "yỳỷỹýỵ",
];

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Primary {
    Symbol(u32),
    Digit(u32),
    Letter(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollationKey {
    primary: Vec<Primary>,
    tones: Vec<u8>,
    cases: Vec<u8>,
    raw: String,
}

fn split_tone(c: char) -> (char, u8) {
    for row in TONE_ROWS {
        if let Some(pos) = row.chars().position(|x| x == c) {
            let base = row.chars().next().unwrap_or(c);
            return (base, pos as u8);
        }
    }
    (c, 0)
}

fn primary_weight(base: char) -> Primary {
    if let Some(pos) = ALPHABET.chars().position(|x| x == base) {
        return Primary::Letter(pos as u32);
    }
    if base.is_ascii_digit() {
        return Primary::Digit(base as u32);
    }
    if base.is_alphanumeric() {
        // letters outside the Vietnamese alphabet go after it
        return Primary::Letter(1_000 + base as u32);
    }
    Primary::Symbol(base as u32)
}

// Combining marks as they appear in decomposed text.
fn combining_tone(c: char) -> Option<u8> {
    match c {
        '\u{300}' => Some(1),
        '\u{309}' => Some(2),
        '\u{303}' => Some(3),
        '\u{301}' => Some(4),
        '\u{323}' => Some(5),
        _ => None,
    }
}

fn combining_letter(base: char, mark: char) -> Option<char> {
    match (base, mark) {
        ('a', '\u{306}') => Some('ă'),
        ('a', '\u{302}') => Some('â'),
        ('e', '\u{302}') => Some('ê'),
        ('o', '\u{302}') => Some('ô'),
        ('o', '\u{31b}') => Some('ơ'),
        ('u', '\u{31b}') => Some('ư'),
        _ => None,
    }
}

struct Unit {
    base: char,
    tone: u8,
    upper: bool,
}

impl CollationKey {
    pub fn new(value: &str) -> Self {
        let mut units: Vec<Unit> = Vec::with_capacity(value.len());
        for c in value.chars() {
            if let Some(last) = units.last_mut() {
                if let Some(tone) = combining_tone(c).filter(|_| last.tone == 0) {
                    last.tone = tone;
                    continue;
                }
                if let Some(letter) = combining_letter(last.base, c) {
                    last.base = letter;
                    continue;
                }
            }
            let lower = c.to_lowercase().next().unwrap_or(c);
            let (base, tone) = split_tone(lower);
            units.push(Unit {
                base,
                tone,
                upper: c != lower,
            });
        }
        Self {
            primary: units.iter().map(|u| primary_weight(u.base)).collect(),
            tones: units.iter().map(|u| u.tone).collect(),
            cases: units.iter().map(|u| u8::from(u.upper)).collect(),
            raw: value.to_string(),
        }
    }
}

impl PartialOrd for CollationKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CollationKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.primary
            .cmp(&other.primary)
            .then_with(|| self.tones.cmp(&other.tones))
            .then_with(|| self.cases.cmp(&other.cases))
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compare(a: &str, b: &str) -> Ordering {
        CollationKey::new(a).cmp(&CollationKey::new(b))
    }

    fn sorted(words: &[&str]) -> Vec<String> {
        let mut out: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        out.sort_by(|a, b| compare(a, b));
        out
    }

    #[test]
    fn breve_and_circumflex_follow_plain_a() {
        assert_eq!(sorted(&["ân", "ăn", "an"]), vec!["an", "ăn", "ân"]);
    }

    #[test]
    fn d_stroke_sorts_after_d() {
        assert_eq!(sorted(&["đá", "dê", "e"]), vec!["dê", "đá", "e"]);
    }

    #[test]
    fn base_letters_outrank_tones() {
        // "ác" has a tone but its base letters come before "ba"
        assert_eq!(sorted(&["ba", "ác"]), vec!["ác", "ba"]);
    }

    #[test]
    fn tones_break_ties_in_vietnamese_order() {
        assert_eq!(
            sorted(&["mạ", "má", "mã", "mả", "mà", "ma"]),
            vec!["ma", "mà", "mả", "mã", "má", "mạ"]
        );
    }

    #[test]
    fn lowercase_before_uppercase() {
        assert_eq!(sorted(&["Áo", "áo"]), vec!["áo", "Áo"]);
        assert_eq!(compare("Áo", "áo"), Ordering::Greater);
    }

    #[test]
    fn symbols_before_digits_before_letters() {
        assert_eq!(sorted(&["a", "1", " "]), vec![" ", "1", "a"]);
    }

    #[test]
    fn decomposed_text_sorts_like_composed() {
        let composed = "\u{e1}o";
        let decomposed = "a\u{301}o";
        assert_eq!(sorted(&[decomposed, "ab"]), vec!["ab", decomposed]);
        assert_eq!(sorted(&[composed, "ab"]), vec!["ab", composed]);

        let a = CollationKey::new(composed);
        let b = CollationKey::new(decomposed);
        assert_eq!(a.primary, b.primary);
        assert_eq!(a.tones, b.tones);
    }

    #[test]
    fn decomposed_modifiers_fold_into_the_letter() {
        // "ệ" decomposes to e, dot below, circumflex
        let key = CollationKey::new("e\u{323}\u{302}");
        assert_eq!(key.primary, CollationKey::new("ê").primary);
        assert_eq!(key.tones, vec![5]);
        assert_eq!(
            sorted(&["o\u{31b}n", "o\u{302}n", "on"]),
            vec!["on", "o\u{302}n", "o\u{31b}n"]
        );
        assert_eq!(sorted(&["ê", "E\u{302}"]), vec!["ê", "E\u{302}"]);
    }

    #[test]
    fn shorter_prefix_first() {
        assert_eq!(compare("áo", "áo dài"), Ordering::Less);
    }
}
