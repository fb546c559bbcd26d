// Offer title, description body, exclusion filter and final formatting.
use crate::config::{DescriptionSource, Localization, PipelineParams};
use crate::mapper::Param;
use crate::model::{FeedError, Position, PropValue, Properties};
use crate::utils::truncate_chars;
use regex::Regex;
use std::sync::LazyLock;

pub const TITLE_LIMIT: usize = 50;
pub const DESCRIPTION_LIMIT: usize = 7500;
const ELLIPSIS: &str = "...";

/// Служебные слова, которые не могут стоять в конце названия.
const FUNCTION_WORDS: [&str; 5] = ["и", "в", "к", "c", "с"];

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("blank lines pattern is valid"));
static CRLF_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n{2,}").expect("crlf pattern is valid"));

fn title_value(props: &Properties, name: &str) -> String {
    match props.get(name) {
        Some(PropValue::Number(n)) => format!("{:.2}", n),
        Some(value) => value.to_scalar_string().unwrap_or_default(),
        None => String::new(),
    }
}

/// Название по категории прайса (шины, диски, масла, прочее).
fn title_by_category(pos: &Position, base: &str, props: &Properties) -> String {
    let p = |name: &str| title_value(props, name);
    match pos.category.as_str() {
        "tires" => format!(
            "Шины {} {} {}/{}R{} {} {}",
            pos.brand,
            p("catalog_model"),
            p("width"),
            p("height"),
            p("diameter"),
            p("load_index"),
            p("speed_index")
        ),
        "disks" => format!(
            "Диск {}, {} {}x{}/{}x{}ET{} {}",
            pos.brand,
            p("catalog_model"),
            p("width"),
            p("diameter"),
            p("holes"),
            p("pcd"),
            p("et"),
            p("hub_diameter")
        ),
        "oils" => format!("{} {}", base, pos.brand),
        _ => format!("{} {} {}", base, pos.display_number(), pos.brand),
    }
}

fn replace_non_breaking_spaces(name: &str) -> String {
    name.replace("<0xa0>", " ")
        .replace('\u{a0}', " ")
        .replace("&nbsp;", " ")
}

/// Укорачивает название по словам до 50 символов.
fn trim_title_by_words(title: &str) -> String {
    let mut words: Vec<&str> = title
        .split(' ')
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .map(|word| truncate_chars(word, TITLE_LIMIT))
        .collect();

    while words.len() > 1 && words.join(" ").chars().count() > TITLE_LIMIT {
        words.pop();
    }
    while words.len() > 1 && words.last().is_some_and(|w| FUNCTION_WORDS.contains(w)) {
        words.pop();
    }
    words.join(" ")
}

/// Builds the `Title` of an offer.
pub fn build_title(
    pos: &Position,
    props: &Properties,
    localization: &Localization,
    source: DescriptionSource,
) -> String {
    let base = if source.uses_title_description() {
        pos.title_description.as_str()
    } else {
        pos.description.as_str()
    };

    let title = if pos.description_source == 0 {
        title_by_category(pos, base, props)
    } else {
        base.to_string()
    };

    let mut title = replace_non_breaking_spaces(&title);
    if pos.is_used() {
        title = format!("{} {}", localization.wearout_pre_owned, title);
    }

    if title.chars().count() > TITLE_LIMIT {
        title = trim_title_by_words(&title);
    }
    title
}

/// `<ul><li>Name: value.</li> ...</ul> `, empty without parameters.
pub fn product_detail(params: &[Param]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let items: Vec<String> = params
        .iter()
        .map(|p| format!("<li>{}: {}.</li>", p.name, p.content))
        .collect();
    format!("<ul>{}</ul> ", items.join(" "))
}

fn statement_type(condition: i32, localization: &Localization) -> &str {
    match condition {
        10 => &localization.statement_type_perfect,
        30 => &localization.statement_type_good,
        50 => &localization.statement_type_normal,
        70 => &localization.statement_type_broken,
        90 => &localization.statement_type_repair_kit,
        _ => "",
    }
}

fn additional_or_description(pos: &Position) -> &str {
    if pos.additional_description.is_empty() {
        &pos.description
    } else {
        &pos.additional_description
    }
}

/// Header, condition clause and the body selected by the description source.
pub fn build_body(
    pos: &Position,
    detail: &str,
    source: DescriptionSource,
    localization: &Localization,
    remove_statement_type: bool,
) -> String {
    let mut text = format!("Бренд: {}, артикул: {}, ", pos.brand, pos.display_number());

    if pos.is_used() {
        if remove_statement_type {
            text.push_str(&localization.wearout_pre_owned);
            text.push(' ');
        } else {
            text.push_str(&format!(
                "{}. {} - {}, ",
                localization.wearout_pre_owned,
                localization.list_th_bu_statement,
                statement_type(pos.condition, localization)
            ));
        }
    }

    match source {
        DescriptionSource::Additional => {
            text.push_str(additional_or_description(pos));
            text.push_str(". <br/>");
        }
        DescriptionSource::AdditionalWithParams => {
            text.push_str(additional_or_description(pos));
            text.push_str(". <br/>");
            text.push_str(detail);
        }
        DescriptionSource::ParamsOnly => {
            if !pos.additional_description.is_empty() {
                text.push_str(&pos.additional_description);
                text.push_str(". <br/>");
            }
            text.push_str(detail);
        }
        DescriptionSource::ProductInfo => {
            text.push_str(&pos.description);
            text.push_str(". <br/>");
        }
        DescriptionSource::Standard | DescriptionSource::Directory => {
            text.push_str(&pos.description);
            text.push_str(". <br/>");
            text.push_str(detail);
        }
    }
    text
}

/// Appends the sales conditions, normalizes line breaks and enforces the length limit.
pub fn finalize(description: &str, sales_conditions: &str) -> String {
    let text = format!("{}{}", description, sales_conditions);
    let text = BLANK_LINES.replace_all(&text, "\n");
    let text = CRLF_RUNS.replace_all(&text, "\r\n");
    let text = text.replace("\r\n", "\n").replace('\n', "<br/>");

    if text.chars().count() > DESCRIPTION_LIMIT {
        let keep = DESCRIPTION_LIMIT - ELLIPSIS.len();
        return format!("{}{}", truncate_chars(&text, keep), ELLIPSIS);
    }
    text
}

/// Include/exclude rules applied to the built description.
#[derive(Debug, Clone, Default)]
pub struct DescriptionFilter {
    included_patterns: Vec<Regex>,
    excluded_patterns: Vec<Regex>,
    included: Vec<String>,
    excluded: Vec<String>,
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, FeedError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| FeedError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}

impl DescriptionFilter {
    pub fn new(params: &PipelineParams) -> Result<Self, FeedError> {
        Ok(Self {
            included_patterns: compile(&params.included_description_patterns)?,
            excluded_patterns: compile(&params.excluded_description_patterns)?,
            included: lowercase_all(&params.included_descriptions),
            excluded: lowercase_all(&params.excluded_descriptions),
        })
    }

    /// True when the offer must be dropped.
    ///
    /// Exclusion signals always win: a required match never re-admits a
    /// description that an exclusion rule already dropped.
    pub fn excludes(&self, description: &str) -> bool {
        let mut exclude = !self.included_patterns.is_empty()
            && !self.included_patterns.iter().any(|re| re.is_match(description));

        if self.excluded_patterns.iter().any(|re| re.is_match(description)) {
            exclude = true;
        }

        let lowered = description.to_lowercase();
        if self.excluded.iter().any(|needle| lowered.contains(needle.as_str())) {
            return true;
        }

        if !self.included.is_empty() && !self.included.iter().any(|needle| lowered.contains(needle.as_str())) {
            exclude = true;
        }
        exclude
    }
}
