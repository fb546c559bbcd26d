use crate::reference::TireModel;

/// Strips everything but latin/cyrillic letters and digits, upper-cased.
fn fold_model_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || is_cyrillic(*c))
        .collect::<String>()
        .to_uppercase()
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
}

/// Maps a catalog tire model to the marketplace model name.
/// Unknown models are returned unchanged.
pub fn normalize_tire_model(model: &str, models: &[TireModel]) -> String {
    if model.is_empty() {
        return String::new();
    }

    let folded = fold_model_name(model);
    for candidate in models {
        if candidate.manual && candidate.abcp_name.to_uppercase() == folded {
            return candidate.avito_name.clone();
        }
        if candidate.avito_name_fix == folded {
            return candidate.avito_name.clone();
        }
    }

    model.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models() -> Vec<TireModel> {
        vec![
            TireModel {
                avito_name: "Hakkapeliitta 10".into(),
                avito_name_fix: "HAKKAPELIITTA10".into(),
                ..TireModel::default()
            },
            TireModel {
                avito_name: "Nordman 7".into(),
                avito_name_fix: "NORDMAN7".into(),
                abcp_name: "nordman-7 suv".into(),
                manual: true,
            },
        ]
    }

    #[test]
    fn matches_folded_name() {
        assert_eq!(normalize_tire_model("Hakkapeliitta-10", &models()), "Hakkapeliitta 10");
    }

    #[test]
    fn manual_override_compares_catalog_name() {
        assert_eq!(normalize_tire_model("NORDMAN-7 SUV", &models()), "NORDMAN-7 SUV");
        let mut manual = models();
        manual[1].abcp_name = "nordman7suv".into();
        assert_eq!(normalize_tire_model("Nordman 7 SUV", &manual), "Nordman 7");
    }

    #[test]
    fn unknown_and_empty_models() {
        assert_eq!(normalize_tire_model("Ice Zero", &models()), "Ice Zero");
        assert_eq!(normalize_tire_model("", &models()), "");
    }
}
