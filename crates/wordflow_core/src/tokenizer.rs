//! crates/wordflow_core/src/tokenizer.rs
//!
//! Splits raw page text into the word tokens the reader plays back.
//!
//! Whitespace separates tokens, except that every CJK character becomes a
//! token of its own, since those scripts are not written with spaces.

/// Returns true if `c` belongs to one of the scripts tokenized per character:
/// CJK Unified Ideographs (and Extension A), Hiragana, Katakana and Hangul
/// Syllables.
pub fn is_cjk(c: char) -> bool {
    matches!(
        c as u32,
        0x4E00..=0x9FFF | 0x3400..=0x4DBF | 0x3040..=0x309F | 0x30A0..=0x30FF | 0xAC00..=0xD7AF
    )
}

/// Tokenizes `text` into an ordered list of words.
///
/// Never yields an empty token. The output depends only on the input, so
/// re-tokenizing the same text always produces the same indices.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if is_cjk(c) {
            flush(&mut current, &mut tokens);
            tokens.push(c.to_string());
        } else if c.is_whitespace() {
            flush(&mut current, &mut tokens);
        } else {
            current.push(c);
        }
    }
    flush(&mut current, &mut tokens);

    tokens
}

fn flush(current: &mut String, tokens: &mut Vec<String>) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \n\t ").is_empty());
    }

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(tokenize("hello world"), vec!["hello", "world"]);
        assert_eq!(
            tokenize("  leading\tand\n\ntrailing  "),
            vec!["leading", "and", "trailing"]
        );
    }

    #[test]
    fn cjk_characters_are_individual_tokens() {
        assert_eq!(tokenize("你好 world"), vec!["你", "好", "world"]);
        assert_eq!(tokenize("abc日本def"), vec!["abc", "日", "本", "def"]);
        assert_eq!(tokenize("ひらがなカタ"), vec!["ひ", "ら", "が", "な", "カ", "タ"]);
        assert_eq!(tokenize("한국어 text"), vec!["한", "국", "어", "text"]);
    }

    #[test]
    fn punctuation_stays_attached() {
        assert_eq!(
            tokenize("\"quoted\" back\\slash, end."),
            vec!["\"quoted\"", "back\\slash,", "end."]
        );
    }

    #[test]
    fn unicode_whitespace_separates_tokens() {
        // U+3000 is the ideographic space, U+00A0 a no-break space.
        assert_eq!(tokenize("a\u{3000}b\u{00A0}c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn never_emits_empty_tokens() {
        let inputs = ["", " ", "a  b", "中 文", "\n\nx\n", "日本語テキスト and more"];
        for input in inputs {
            assert!(tokenize(input).iter().all(|t| !t.is_empty()), "{input:?}");
        }
    }

    #[test]
    fn range_edges_are_cjk() {
        for c in ['\u{4E00}', '\u{9FFF}', '\u{3400}', '\u{4DBF}', '\u{3040}', '\u{30FF}', '\u{AC00}', '\u{D7AF}'] {
            assert!(is_cjk(c), "{c:?}");
        }
        for c in ['a', '\u{33FF}', '\u{D7B0}', '\u{3100}', '1'] {
            assert!(!is_cjk(c), "{c:?}");
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn tokens_are_never_empty_or_split_on_whitespace(text in any::<String>()) {
                for token in tokenize(&text) {
                    prop_assert!(!token.is_empty());
                    prop_assert!(!token.chars().any(char::is_whitespace));
                }
            }

            #[test]
            fn tokenizing_drops_only_whitespace(text in "[a-z 中文ハ한\t\n.,!]{0,64}") {
                let joined: String = tokenize(&text).concat();
                let expected: String = text.chars().filter(|c| !c.is_whitespace()).collect();
                prop_assert_eq!(joined, expected);
            }

            #[test]
            fn cjk_tokens_are_single_characters(text in "[a-z 中文ハ한]{0,64}") {
                for token in tokenize(&text) {
                    if token.chars().any(is_cjk) {
                        prop_assert_eq!(token.chars().count(), 1);
                    }
                }
            }
        }
    }
}
