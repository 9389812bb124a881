use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocaleEntry {
    pub code: String,
    pub name: String,
    pub flag: String,
    pub title: String,
    pub description: String,
}

/// Ordered locale table. Order drives both the hreflang block and the
/// selector menu, so it is kept exactly as declared.
#[derive(Debug, Clone)]
pub struct LocaleTable {
    entries: Vec<LocaleEntry>,
    default_code: String,
}

#[derive(Debug, Error)]
pub enum LocaleTableError {
    #[error("locale table is empty")]
    Empty,
    #[error("duplicate locale code `{0}`")]
    Duplicate(String),
    #[error("invalid locale code `{0}` (expected lowercase letters, digits or '-')")]
    InvalidCode(String),
    #[error("locale code `{0}` is reserved")]
    ReservedCode(String),
    #[error("default locale `{0}` is not in the table")]
    UnknownDefault(String),
    #[error("invalid locale file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize)]
struct LocaleFile {
    default: Option<String>,
    #[serde(default)]
    locale: Vec<LocaleEntry>,
}

/// Codes with a fixed meaning in hreflang links.
const RESERVED_CODES: &[&str] = &["x-default"];

const BUILTIN: &[(&str, &str, &str, &str, &str)] = &[
    (
        "en",
        "English",
        "🇬🇧",
        "Live Silver, Gold & Metal Prices",
        "Live precious metal prices - Silver, Gold, Platinum, Palladium. Real-time spot prices, charts, and Shanghai silver premium.",
    ),
    (
        "zh",
        "中文",
        "🇨🇳",
        "实时银价、金价和金属价格",
        "实时贵金属价格 - 白银、黄金、铂金、钯金。实时现货价格、图表和上海白银溢价。",
    ),
    (
        "hi",
        "हिंदी",
        "🇮🇳",
        "लाइव चांदी, सोना और धातु की कीमतें",
        "लाइव कीमती धातु की कीमतें - चांदी, सोना, प्लैटिनम, पैलेडियम। रीयल-टाइम स्पॉट कीमतें, चार्ट और शंघाई चांदी प्रीमियम।",
    ),
    (
        "ms",
        "Bahasa Melayu",
        "🇲🇾",
        "Harga Perak, Emas & Logam Langsung",
        "Harga logam berharga langsung - Perak, Emas, Platinum, Palladium. Harga spot masa nyata, carta dan premium perak Shanghai.",
    ),
    (
        "de",
        "Deutsch",
        "🇩🇪",
        "Live Silber-, Gold- & Metallpreise",
        "Live Edelmetallpreise - Silber, Gold, Platin, Palladium. Echtzeit-Spotpreise, Charts und Shanghai-Silberprämie.",
    ),
    (
        "es",
        "Español",
        "🇪🇸",
        "Precios de Plata, Oro y Metales en Vivo",
        "Precios de metales preciosos en vivo - Plata, Oro, Platino, Paladio. Precios spot en tiempo real, gráficos y prima de plata de Shanghái.",
    ),
    (
        "it",
        "Italiano",
        "🇮🇹",
        "Prezzi Argento, Oro e Metalli in Tempo Reale",
        "Prezzi metalli preziosi in tempo reale - Argento, Oro, Platino, Palladio. Prezzi spot, grafici e premio argento Shanghai.",
    ),
    (
        "fr",
        "Français",
        "🇫🇷",
        "Prix de l'Argent, de l'Or et des Métaux en Direct",
        "Prix des métaux précieux en direct - Argent, Or, Platine, Palladium. Prix spot en temps réel, graphiques et prime argent Shanghai.",
    ),
    (
        "pt",
        "Português",
        "🇧🇷",
        "Preços de Prata, Ouro e Metais ao Vivo",
        "Preços de metais preciosos ao vivo - Prata, Ouro, Platina, Paládio. Preços spot em tempo real, gráficos e prêmio de prata de Xangai.",
    ),
    (
        "tr",
        "Türkçe",
        "🇹🇷",
        "Canlı Gümüş, Altın ve Metal Fiyatları",
        "Canlı değerli metal fiyatları - Gümüş, Altın, Platin, Paladyum. Gerçek zamanlı spot fiyatlar, grafikler ve Şanghay gümüş primi.",
    ),
    (
        "ja",
        "日本語",
        "🇯🇵",
        "ライブ銀・金・金属価格",
        "ライブ貴金属価格 - 銀、金、プラチナ、パラジウム。リアルタイムスポット価格、チャート、上海シルバープレミアム。",
    ),
    (
        "ru",
        "Русский",
        "🇷🇺",
        "Цены на серебро, золото и металлы в реальном времени",
        "Цены на драгоценные металлы в реальном времени - серебро, золото, платина, палладий. Спотовые цены, графики и шанхайская премия на серебро.",
    ),
];

impl LocaleTable {
    pub fn new(entries: Vec<LocaleEntry>, default_code: &str) -> Result<Self, LocaleTableError> {
        if entries.is_empty() {
            return Err(LocaleTableError::Empty);
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if !is_valid_code(&entry.code) {
                return Err(LocaleTableError::InvalidCode(entry.code.clone()));
            }
            if RESERVED_CODES.contains(&entry.code.as_str()) {
                return Err(LocaleTableError::ReservedCode(entry.code.clone()));
            }
            if !seen.insert(entry.code.as_str()) {
                return Err(LocaleTableError::Duplicate(entry.code.clone()));
            }
        }

        if !seen.contains(default_code) {
            return Err(LocaleTableError::UnknownDefault(default_code.to_string()));
        }

        Ok(Self {
            entries,
            default_code: default_code.to_string(),
        })
    }

    /// The table the site ships with; English is served from the root.
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(code, name, flag, title, description)| LocaleEntry {
                code: (*code).to_string(),
                name: (*name).to_string(),
                flag: (*flag).to_string(),
                title: (*title).to_string(),
                description: (*description).to_string(),
            })
            .collect();
        Self {
            entries,
            default_code: "en".to_string(),
        }
    }

    pub fn from_toml_str(input: &str) -> Result<Self, LocaleTableError> {
        let file: LocaleFile = toml::from_str(input)?;
        let default_code = match file.default {
            Some(code) => code,
            None => file
                .locale
                .first()
                .map(|entry| entry.code.clone())
                .ok_or(LocaleTableError::Empty)?,
        };
        Self::new(file.locale, &default_code)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read locale file {}", path.display()))?;
        let table = Self::from_toml_str(&raw)
            .with_context(|| format!("failed to load locale file {}", path.display()))?;
        Ok(table)
    }

    pub fn entries(&self) -> &[LocaleEntry] {
        &self.entries
    }

    pub fn get(&self, code: &str) -> Option<&LocaleEntry> {
        self.entries.iter().find(|entry| entry.code == code)
    }

    pub fn default_code(&self) -> &str {
        &self.default_code
    }

    pub fn is_default(&self, code: &str) -> bool {
        self.default_code == code
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Root-relative page path for a locale: `/` or `/{code}/`.
    pub fn page_path(&self, code: &str) -> String {
        if self.is_default(code) {
            "/".to_string()
        } else {
            format!("/{code}/")
        }
    }
}

fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && !code.starts_with('-')
        && code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str) -> LocaleEntry {
        LocaleEntry {
            code: code.into(),
            name: code.to_uppercase(),
            flag: "🏳".into(),
            title: format!("{code} title"),
            description: format!("{code} description"),
        }
    }

    #[test]
    fn builtin_table_order_and_default() {
        let table = LocaleTable::builtin();
        let codes: Vec<_> = table.entries().iter().map(|e| e.code.as_str()).collect();
        assert_eq!(
            codes,
            ["en", "zh", "hi", "ms", "de", "es", "it", "fr", "pt", "tr", "ja", "ru"]
        );
        assert_eq!(table.default_code(), "en");
        assert_eq!(table.get("ja").unwrap().name, "日本語");
    }

    #[test]
    fn builtin_table_passes_validation() {
        let table = LocaleTable::builtin();
        let rebuilt = LocaleTable::new(table.entries().to_vec(), table.default_code());
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn page_paths() {
        let table = LocaleTable::builtin();
        assert_eq!(table.page_path("en"), "/");
        assert_eq!(table.page_path("pt"), "/pt/");
    }

    #[test]
    fn rejects_bad_tables() {
        assert!(matches!(
            LocaleTable::new(Vec::new(), "en"),
            Err(LocaleTableError::Empty)
        ));
        assert!(matches!(
            LocaleTable::new(vec![entry("en"), entry("en")], "en"),
            Err(LocaleTableError::Duplicate(code)) if code == "en"
        ));
        assert!(matches!(
            LocaleTable::new(vec![entry("en"), entry("../x")], "en"),
            Err(LocaleTableError::InvalidCode(_))
        ));
        assert!(matches!(
            LocaleTable::new(vec![entry("en"), entry("x-default")], "en"),
            Err(LocaleTableError::ReservedCode(code)) if code == "x-default"
        ));
        assert!(matches!(
            LocaleTable::new(vec![entry("en")], "fr"),
            Err(LocaleTableError::UnknownDefault(code)) if code == "fr"
        ));
    }

    #[test]
    fn toml_keeps_declared_order() {
        let input = r#"
            default = "de"

            [[locale]]
            code = "fr"
            name = "Français"
            flag = "🇫🇷"
            title = "Prix"
            description = "Prix des métaux"

            [[locale]]
            code = "de"
            name = "Deutsch"
            flag = "🇩🇪"
            title = "Preise"
            description = "Edelmetallpreise"
        "#;
        let table = LocaleTable::from_toml_str(input).unwrap();
        let codes: Vec<_> = table.entries().iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, ["fr", "de"]);
        assert_eq!(table.default_code(), "de");
    }

    #[test]
    fn toml_default_falls_back_to_first_entry() {
        let input = r#"
            [[locale]]
            code = "pt-br"
            name = "Português"
            flag = "🇧🇷"
            title = "Preços"
            description = "Preços de metais"
        "#;
        let table = LocaleTable::from_toml_str(input).unwrap();
        assert_eq!(table.default_code(), "pt-br");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn toml_rejects_x_default_locale() {
        let input = r#"
            [[locale]]
            code = "en"
            name = "English"
            flag = "🇬🇧"
            title = "Prices"
            description = "Metal prices"

            [[locale]]
            code = "x-default"
            name = "Default"
            flag = "🏳"
            title = "Prices"
            description = "Metal prices"
        "#;
        assert!(matches!(
            LocaleTable::from_toml_str(input),
            Err(LocaleTableError::ReservedCode(_))
        ));
    }

    #[test]
    fn toml_errors() {
        assert!(matches!(
            LocaleTable::from_toml_str("default = \"en\""),
            Err(LocaleTableError::Empty)
        ));
        assert!(matches!(
            LocaleTable::from_toml_str("[[locale]]\ncode = \"en\""),
            Err(LocaleTableError::Parse(_))
        ));
    }
}
