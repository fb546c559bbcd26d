// Keyword matching against the position's free text.
use crate::config::DescriptionSource;
use crate::model::Position;
use crate::utils::{case_insensitive_contains, words};

/// How a single-word keyword must appear in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordRule {
    /// Some word of the text equals the keyword.
    Whole,
    /// Some word of the text starts with the keyword.
    Prefix,
    /// Plain substring, no word check.
    Substring,
}

/// Text searched by the brand stage.
pub fn brand_text(pos: &Position, source: DescriptionSource) -> String {
    if source.uses_title_description() {
        format!("{} {}", pos.description, pos.title_description)
    } else {
        keyword_text(pos, source)
    }
}

/// Text searched by the description and truck stages.
pub fn keyword_text(pos: &Position, source: DescriptionSource) -> String {
    if source.uses_additional_description() && !pos.additional_description.is_empty() {
        format!("{} {}", pos.additional_description, pos.description)
    } else {
        pos.description.clone()
    }
}

/// Case-insensitive keyword match, refined by `rule` when the keyword is a single word.
pub fn keyword_matches(text: &str, keyword: &str, rule: WordRule) -> bool {
    if keyword.is_empty() || !case_insensitive_contains(text, keyword) {
        return false;
    }

    let keyword_words = words(keyword);
    if rule == WordRule::Substring || keyword_words.len() != 1 {
        return true;
    }

    let needle = keyword_words[0].to_uppercase();
    words(text).into_iter().any(|word| {
        let word = word.to_uppercase();
        match rule {
            WordRule::Whole => word == needle,
            _ => word.starts_with(&needle),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_word_rejects_partial_words() {
        assert!(keyword_matches("Фильтр для BMW X5", "bmw", WordRule::Whole));
        assert!(!keyword_matches("Фильтр BMWX5", "BMW", WordRule::Whole));
        assert!(keyword_matches("Фильтр BMWX5", "BMW", WordRule::Prefix));
        assert!(keyword_matches("Фильтр XBMW", "BMW", WordRule::Substring));
        assert!(!keyword_matches("Фильтр XBMW", "BMW", WordRule::Prefix));
    }

    #[test]
    fn multi_word_keywords_use_substring() {
        assert!(keyword_matches("Щётка стеклоочистителя задняя", "стеклоочистителя задняя", WordRule::Whole));
        assert!(!keyword_matches("anything", "", WordRule::Whole));
    }

    #[test]
    fn text_source_follows_policy() {
        let pos = Position {
            description: "desc".into(),
            additional_description: "extra".into(),
            title_description: "title".into(),
            ..Position::default()
        };
        assert_eq!(brand_text(&pos, DescriptionSource::Standard), "desc");
        assert_eq!(brand_text(&pos, DescriptionSource::Additional), "extra desc");
        assert_eq!(brand_text(&pos, DescriptionSource::ProductInfo), "desc title");
        assert_eq!(keyword_text(&pos, DescriptionSource::Directory), "desc");
        assert_eq!(keyword_text(&pos, DescriptionSource::AdditionalWithParams), "extra desc");
    }
}
