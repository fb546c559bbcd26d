// Utility functions
use regex::Regex;
use std::sync::LazyLock;

static WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}\d_]+").expect("word pattern is valid")
});

/// Заменяет десятичный разделитель в дробном числе с точки на запятую.
pub fn replace_separator_to_comma(text: &str) -> String {
    text.replace('.', ",")
}

pub fn case_insensitive_contains(text: &str, needle: &str) -> bool {
    text.to_uppercase().contains(&needle.to_uppercase())
}

/// Слова строки: буквы, цифры и подчёркивания.
pub fn words(text: &str) -> Vec<&str> {
    WORDS.find_iter(text).map(|m| m.as_str()).collect()
}

/// Первая буква каждого слова заглавная, остальные строчные.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

/// Cuts `text` to at most `limit` characters.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_split_on_punctuation() {
        assert_eq!(words("Фильтр масляный, BMW-X5"), ["Фильтр", "масляный", "BMW", "X5"]);
    }

    #[test]
    fn title_case_handles_cyrillic() {
        assert_eq!(title_case("бескаркасная щётка"), "Бескаркасная Щётка");
        assert_eq!(title_case("ГИБРИДНАЯ"), "Гибридная");
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("щётка", 3), "щёт");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn comma_separator() {
        assert_eq!(replace_separator_to_comma("4.0"), "4,0");
        assert!(case_insensitive_contains("масло Castrol", "CASTROL"));
    }
}
