//! Thèmes et langues disponibles
//!
//! Les listes sont embarquées dans le binaire (`resources/themes.txt`,
//! `resources/locales.txt`) et peuvent être remplacées par des fichiers du
//! même nom dans un répertoire de ressources. Elles sont lues une seule fois.

use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::OnceLock,
};
use tracing::{debug, error, warn};

pub const THEMES_FILE: &str = "themes.txt";
pub const LOCALES_FILE: &str = "locales.txt";

const EMBEDDED_THEMES: &str = include_str!("../resources/themes.txt");
const EMBEDDED_LOCALES: &str = include_str!("../resources/locales.txt");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: String,
    pub name: String,
    pub parent: Option<String>,
}

impl Theme {
    fn fallback() -> Self {
        Self {
            id: "default".to_string(),
            name: "PMOMusic default".to_string(),
            parent: None,
        }
    }
}

/// Langue, pays et variante, au format `fr_FR_POSIX`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Locale {
    pub language: String,
    pub country: String,
    pub variant: String,
}

impl Locale {
    pub fn new(
        language: impl Into<String>,
        country: impl Into<String>,
        variant: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            country: country.into(),
            variant: variant.into(),
        }
    }

    pub fn english() -> Self {
        Self::new("en", "", "")
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.language)?;
        if !self.country.is_empty() || !self.variant.is_empty() {
            write!(f, "_{}", self.country)?;
        }
        if !self.variant.is_empty() {
            write!(f, "_{}", self.variant)?;
        }
        Ok(())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('_').collect();
        let language = parts[0];
        if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(format!("invalid language in locale '{}'", s));
        }
        if parts.len() > 3 {
            return Err(format!("too many parts in locale '{}'", s));
        }
        Ok(Self::new(
            language,
            parts.get(1).copied().unwrap_or_default(),
            parts.get(2).copied().unwrap_or_default(),
        ))
    }
}

/// Découpe une ligne sur les blancs, les guillemets doubles groupant un élément
pub fn split_quoted(line: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    items.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if pending {
        items.push(current);
    }
    items
}

fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Une ligne `id nom [parent]` par thème ; les lignes invalides sont ignorées
pub fn parse_themes(text: &str) -> Vec<Theme> {
    content_lines(text)
        .filter_map(|line| {
            let mut items = split_quoted(line).into_iter();
            match (items.next(), items.next(), items.next(), items.next()) {
                (Some(id), Some(name), parent, None) => Some(Theme { id, name, parent }),
                _ => {
                    warn!(line = line, "Failed to parse theme");
                    None
                }
            }
        })
        .collect()
}

/// Une ligne `langue[_PAYS[_VARIANTE]]` par langue ; les lignes invalides sont ignorées
pub fn parse_locales(text: &str) -> Vec<Locale> {
    content_lines(text)
        .filter_map(|line| match line.parse::<Locale>() {
            Ok(locale) => Some(locale),
            Err(e) => {
                warn!(line = line, error = %e, "Failed to parse locale");
                None
            }
        })
        .collect()
}

/// Listes de thèmes et de langues, chargées à la première demande
#[derive(Debug, Default)]
pub struct StaticResources {
    dir: Option<PathBuf>,
    themes: OnceLock<Vec<Theme>>,
    locales: OnceLock<Vec<Locale>>,
}

impl StaticResources {
    /// Ressources embarquées
    pub fn embedded() -> Self {
        Self::default()
    }

    /// Ressources lues dans `dir`
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Self::default()
        }
    }

    fn read(&self, file_name: &str, embedded: &'static str) -> std::io::Result<String> {
        match &self.dir {
            Some(dir) => read_resource(dir, file_name),
            None => Ok(embedded.to_string()),
        }
    }

    pub fn themes(&self) -> &[Theme] {
        self.themes.get_or_init(|| match self.read(THEMES_FILE, EMBEDDED_THEMES) {
            Ok(text) => parse_themes(&text),
            Err(e) => {
                error!(error = %e, "Failed to resolve list of themes");
                vec![Theme::fallback()]
            }
        })
    }

    pub fn locales(&self) -> &[Locale] {
        self.locales
            .get_or_init(|| match self.read(LOCALES_FILE, EMBEDDED_LOCALES) {
                Ok(text) => parse_locales(&text),
                Err(e) => {
                    error!(error = %e, "Failed to resolve list of locales");
                    vec![Locale::english()]
                }
            })
    }
}

fn read_resource(dir: &Path, file_name: &str) -> std::io::Result<String> {
    let path = dir.join(file_name);
    debug!(file = %path.display(), "Reading resource file");
    fs::read_to_string(path)
}
