//! Stations de radio Internet

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternetRadio {
    pub id: i32,
    pub name: String,
    pub stream_url: String,
    pub homepage_url: Option<String>,
    pub enabled: bool,
    pub changed: DateTime<Utc>,
}

/// Accès persistant aux radios, fourni par l'hôte
pub trait InternetRadioDao: Send + Sync {
    fn all_internet_radios(&self) -> anyhow::Result<Vec<InternetRadio>>;

    fn create_internet_radio(&self, radio: &InternetRadio) -> anyhow::Result<()>;

    fn update_internet_radio(&self, radio: &InternetRadio) -> anyhow::Result<()>;

    fn delete_internet_radio(&self, id: i32) -> anyhow::Result<()>;
}

/// Garde les stations activées, ou toutes si `include_all`
pub fn filter_enabled(radios: Vec<InternetRadio>, include_all: bool) -> Vec<InternetRadio> {
    radios
        .into_iter()
        .filter(|r| include_all || r.enabled)
        .collect()
}
