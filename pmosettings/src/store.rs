//! Stockage clé/valeur persistant des paramètres
//!
//! [`PropertyStore`] est la frontière avec le stockage durable. Deux
//! implémentations sont fournies :
//!
//! - [`PropertiesFile`] : fichier texte plat `clé=valeur`, une entrée par ligne
//! - [`MemoryStore`] : stockage éphémère, pour les tests et les outils

use crate::error::{Result, SettingsError};
use chrono::Utc;
use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::{debug, info};

/// Stockage durable de propriétés indexées par une clé texte.
///
/// Les écritures (`set`, `clear`) ne touchent que l'état en mémoire ;
/// seul `save` les rend durables.
pub trait PropertyStore: Send + Sync {
    /// Valeur brute associée à `key`, si elle existe.
    fn get(&self, key: &str) -> Option<String>;

    /// Associe `value` à `key`.
    fn set(&self, key: &str, value: String);

    /// Supprime `key`. Sans effet si la clé est absente.
    fn clear(&self, key: &str);

    /// Liste des clés présentes, triées.
    fn keys(&self) -> Vec<String>;

    /// Recharge l'état depuis le support durable.
    fn load(&self) -> Result<()>;

    /// Écrit l'état courant sur le support durable.
    fn save(&self) -> Result<()>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

type Entries = BTreeMap<String, String>;

// Un écrivain qui panique ne rend pas le stockage inutilisable
fn read(data: &RwLock<Entries>) -> RwLockReadGuard<'_, Entries> {
    data.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(data: &RwLock<Entries>) -> RwLockWriteGuard<'_, Entries> {
    data.write().unwrap_or_else(PoisonError::into_inner)
}

/// Stockage en mémoire, sans persistance
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Entries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PropertyStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        read(&self.data).get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        write(&self.data).insert(key.to_string(), value);
    }

    fn clear(&self, key: &str) {
        write(&self.data).remove(key);
    }

    fn keys(&self) -> Vec<String> {
        read(&self.data).keys().cloned().collect()
    }

    fn load(&self) -> Result<()> {
        Ok(())
    }

    fn save(&self) -> Result<()> {
        Ok(())
    }
}

/// Fichier de propriétés `clé=valeur`
///
/// Format :
/// - une entrée par ligne, triées par clé
/// - les lignes vides et celles commençant par `#` ou `!` sont ignorées
/// - `\\`, `\n`, `\r` et `\t` sont échappés ; dans les clés, `=`, `:` et
///   l'espace le sont aussi ; dans les valeurs, seul un espace initial l'est
///
/// L'écriture passe par un fichier temporaire renommé, pour ne jamais
/// laisser un fichier tronqué.
#[derive(Debug)]
pub struct PropertiesFile {
    path: PathBuf,
    data: RwLock<Entries>,
    save_lock: Mutex<()>,
}

impl PropertiesFile {
    /// Crée un stockage vide associé à `path`, sans lire le fichier
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: RwLock::default(),
            save_lock: Mutex::new(()),
        }
    }

    /// Crée le stockage et charge le fichier s'il existe
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn render(data: &Entries) -> String {
        let mut out = String::new();
        out.push_str("# PMOMusic settings\n");
        out.push_str(&format!("# Saved {}\n", Utc::now().to_rfc3339()));
        for (key, value) in data {
            out.push_str(&escape(key, true));
            out.push('=');
            out.push_str(&escape(value, false));
            out.push('\n');
        }
        out
    }
}

impl PropertyStore for PropertiesFile {
    fn get(&self, key: &str) -> Option<String> {
        read(&self.data).get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        write(&self.data).insert(key.to_string(), value);
    }

    fn clear(&self, key: &str) {
        write(&self.data).remove(key);
    }

    fn keys(&self) -> Vec<String> {
        read(&self.data).keys().cloned().collect()
    }

    fn load(&self) -> Result<()> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(file = %self.path.display(), "Property file not found, starting empty");
                String::new()
            }
            Err(e) => return Err(SettingsError::io(&self.path, e)),
        };

        let parsed: BTreeMap<String, String> = text.lines().filter_map(parse_line).collect();
        debug!(file = %self.path.display(), entries = parsed.len(), "Loaded property file");
        *write(&self.data) = parsed;
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let _guard = self.save_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let content = Self::render(&read(&self.data));

        let tmp = self.path.with_extension("properties.tmp");
        fs::write(&tmp, content).map_err(|e| SettingsError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| SettingsError::io(&self.path, e))?;
        debug!(file = %self.path.display(), "Saved property file");
        Ok(())
    }
}

fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '=' | ':' if is_key => {
                out.push('\\');
                out.push(c);
            }
            '#' | '!' if is_key && i == 0 => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Découpe une ligne sur le premier `=` non échappé.
///
/// Une ligne sans `=` donne une clé de valeur vide.
fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim_start();
    if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
        return None;
    }

    let mut escaped = false;
    let mut split = None;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' {
            split = Some(i);
            break;
        }
    }

    let (raw_key, raw_value) = match split {
        Some(i) => (line[..i].trim_end(), line[i + 1..].trim_start()),
        None => (line.trim_end(), ""),
    };
    Some((unescape(raw_key), unescape(raw_value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_basic_and_lenient() {
        assert_eq!(
            parse_line("Port=8080"),
            Some(("Port".to_string(), "8080".to_string()))
        );
        assert_eq!(
            parse_line("  Theme = dark"),
            Some(("Theme".to_string(), "dark".to_string()))
        );
        assert_eq!(parse_line("Flag"), Some(("Flag".to_string(), String::new())));
        assert_eq!(parse_line("# comment"), None);
        assert_eq!(parse_line("! comment"), None);
        assert_eq!(parse_line("   "), None);
    }

    #[test]
    fn test_value_keeps_inner_equals() {
        assert_eq!(
            parse_line("LdapSearchFilter=(sAMAccountName={0})=x"),
            Some((
                "LdapSearchFilter".to_string(),
                "(sAMAccountName={0})=x".to_string()
            ))
        );
    }

    #[test]
    fn test_escape_unescape_special_characters() {
        for (text, is_key) in [
            ("a=b:c d", true),
            ("#hash", true),
            ("line1\nline2\r\n\ttab", false),
            (" leading space", false),
            ("back\\slash", false),
            ("accentué é à ç", false),
        ] {
            assert_eq!(unescape(&escape(text, is_key)), text);
        }
    }

    #[test]
    fn test_file_save_and_load() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("pmomusic.properties");

        let store = PropertiesFile::new(&path);
        store.set("WelcomeMessage2", "__Welcome__\n\\\\ \\\\\nbye".to_string());
        store.set("UrlRedirectCustomUrl", " http://x.com/".to_string());
        store.set("Port", "4040".to_string());
        store.save().unwrap();

        let reloaded = PropertiesFile::open(&path).unwrap();
        assert_eq!(reloaded.keys(), store.keys());
        for key in store.keys() {
            assert_eq!(reloaded.get(&key), store.get(&key), "key {}", key);
        }
        assert!(!temp.path().join("pmomusic.properties.tmp").exists());
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let temp = tempfile::tempdir().unwrap();
        let store = PropertiesFile::open(temp.path().join("absent.properties")).unwrap();
        assert!(store.keys().is_empty());
        assert_eq!(store.get("Theme"), None);
    }

    #[test]
    fn test_store_survives_poisoned_lock() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.set("Port", "4040".to_string());

        let s = std::sync::Arc::clone(&store);
        let result = std::thread::spawn(move || {
            let _guard = s.data.write().unwrap();
            panic!("writer failed");
        })
        .join();
        assert!(result.is_err());
        assert!(store.data.is_poisoned());

        assert_eq!(store.get("Port").as_deref(), Some("4040"));
        store.set("Port", "8080".to_string());
        assert_eq!(store.keys(), vec!["Port"]);
        assert_eq!(store.get("Port").as_deref(), Some("8080"));
    }

    #[test]
    fn test_memory_store_clear_and_contains() {
        let store = MemoryStore::new();
        store.set("Theme", "dark".to_string());
        assert!(store.contains("Theme"));
        store.clear("Theme");
        assert!(!store.contains("Theme"));
        store.clear("Theme");
    }
}
