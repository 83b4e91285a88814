//! Adresse publique du serveur
//!
//! Deux modes de redirection :
//!
//! - `Normal` : sous-domaine de `pmomusic.org` (`http://<nom>.pmomusic.org`)
//! - `Custom` : URL fournie par l'administrateur
//!
//! [`rewrite_remote_url`] transforme une URL locale (vue depuis le réseau
//! local) en URL joignable de l'extérieur.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use url::Url;

/// Domaine des sous-domaines de redirection
pub const REDIRECT_DOMAIN: &str = "pmomusic.org";

/// URL personnalisée par défaut (sans hôte)
pub const DEFAULT_CUSTOM_URL: &str = "http://";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UrlRedirectType {
    #[default]
    Normal,
    Custom,
}

impl UrlRedirectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for UrlRedirectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrlRedirectType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NORMAL" => Ok(Self::Normal),
            "CUSTOM" => Ok(Self::Custom),
            other => Err(format!("unknown redirect type '{}'", other)),
        }
    }
}

/// Paramètres de redirection, lus en une fois
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectionConfig {
    pub enabled: bool,
    pub mode: UrlRedirectType,
    /// Nom du sous-domaine en mode `Normal`
    pub subdomain: String,
    pub custom_url: Option<String>,
    /// Chemin de contexte web, sans `/`
    pub context_path: String,
}

/// URL de base publique
///
/// En mode `Custom`, une URL vide vaut [`DEFAULT_CUSTOM_URL`]. L'adresse
/// locale n'entre jamais dans le résultat.
pub fn resolve(config: &RedirectionConfig) -> String {
    match config.mode {
        UrlRedirectType::Normal => format!("http://{}.{}", config.subdomain, REDIRECT_DOMAIN),
        UrlRedirectType::Custom => {
            let custom = config
                .custom_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .unwrap_or(DEFAULT_CUSTOM_URL);
            strip_trailing_slash(custom).to_string()
        }
    }
}

// Ne retire jamais les `/` du séparateur `scheme://`
fn strip_trailing_slash(url: &str) -> &str {
    if url.ends_with("://") {
        url
    } else {
        url.strip_suffix('/').unwrap_or(url)
    }
}

/// Réécrit une URL locale pour un accès distant
///
/// Redirection désactivée : l'URL est rendue telle quelle. Sinon le schéma,
/// l'hôte et le port viennent de [`resolve`] ; en mode `Normal` le chemin de
/// contexte est retiré, en mode `Custom` le chemin de l'URL personnalisée
/// est préfixé. La requête et le fragment sont conservés. Une URL
/// personnalisée sans hôte (`http://`) donne une erreur.
pub fn rewrite_remote_url(local_url: &str, config: &RedirectionConfig) -> Result<String> {
    if !config.enabled {
        return Ok(local_url.to_string());
    }

    let local = Url::parse(local_url)?;
    let mut remote = Url::parse(&resolve(config))?;

    let path = match config.mode {
        UrlRedirectType::Normal => strip_context_path(local.path(), &config.context_path),
        UrlRedirectType::Custom => {
            format!("{}{}", remote.path().trim_end_matches('/'), local.path())
        }
    };

    remote.set_path(&path);
    remote.set_query(local.query());
    remote.set_fragment(local.fragment());
    Ok(remote.into())
}

fn strip_context_path(path: &str, context_path: &str) -> String {
    let context = context_path.trim_matches('/');
    if context.is_empty() {
        return path.to_string();
    }
    let prefix = format!("/{}", context);
    match path.strip_prefix(&prefix) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.to_string(),
        _ => path.to_string(),
    }
}
