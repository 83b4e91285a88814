//! Accès typé aux propriétés brutes
//!
//! [`TypedSettings`] lit et écrit les valeurs d'un [`PropertyStore`] à travers
//! leur [`SettingDef`] : conversion de type, valeur par défaut, codec.
//! Une valeur absente prend sa valeur par défaut ; une valeur illisible
//! aussi, avec un avertissement dans les logs.

use crate::schema::{Codec, DefaultValue, SettingDef, SettingType};
use crate::secret::{encode_secret, read_secret};
use crate::store::PropertyStore;
use std::{fmt::Display, str::FromStr, sync::Arc};
use tracing::warn;

/// Lecture/écriture typée des paramètres
#[derive(Clone)]
pub struct TypedSettings {
    store: Arc<dyn PropertyStore>,
}

impl TypedSettings {
    pub fn new(store: Arc<dyn PropertyStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn PropertyStore> {
        &self.store
    }

    fn parse_or<T>(&self, def: &SettingDef, default: T) -> T
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.store.get(def.key) {
            None => default,
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => v,
                Err(e) => {
                    warn!(key = def.key, value = %raw, error = %e, "Unparsable setting, using default");
                    default
                }
            },
        }
    }

    pub fn get_int(&self, def: &SettingDef) -> i32 {
        debug_assert_eq!(def.setting_type(), SettingType::Int, "{}", def.key);
        let default = match def.default {
            DefaultValue::Int(v) => v,
            _ => 0,
        };
        self.parse_or(def, default)
    }

    pub fn get_long(&self, def: &SettingDef) -> i64 {
        debug_assert_eq!(def.setting_type(), SettingType::Long, "{}", def.key);
        let default = match def.default {
            DefaultValue::Long(v) => v,
            _ => 0,
        };
        self.parse_or(def, default)
    }

    /// Entier long sans valeur par défaut
    pub fn get_optional_long(&self, def: &SettingDef) -> Option<i64> {
        debug_assert_eq!(def.setting_type(), SettingType::Long, "{}", def.key);
        let raw = self.store.get(def.key)?;
        match raw.trim().parse::<i64>() {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key = def.key, value = %raw, error = %e, "Unparsable setting, ignoring it");
                None
            }
        }
    }

    pub fn get_bool(&self, def: &SettingDef) -> bool {
        debug_assert_eq!(def.setting_type(), SettingType::Bool, "{}", def.key);
        let default = match def.default {
            DefaultValue::Bool(v) => v,
            _ => false,
        };
        match self.store.get(def.key) {
            None => default,
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                warn!(key = def.key, value = %raw, "Unparsable boolean setting, using default");
                default
            }),
        }
    }

    /// Chaîne, décodée si le paramètre est un secret
    pub fn get_string(&self, def: &SettingDef) -> Option<String> {
        debug_assert_eq!(def.setting_type(), SettingType::Str, "{}", def.key);
        match self.store.get(def.key) {
            Some(raw) => match def.codec {
                Codec::Plain => Some(raw),
                Codec::Hex => Some(read_secret(def.key, &raw)),
            },
            None => def.default_text(),
        }
    }

    /// Chaîne débarrassée des blancs, `None` si elle est vide
    pub fn get_trimmed_string(&self, def: &SettingDef) -> Option<String> {
        self.get_string(def)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    pub fn set_int(&self, def: &SettingDef, value: i32) {
        self.store.set(def.key, value.to_string());
    }

    pub fn set_long(&self, def: &SettingDef, value: i64) {
        self.store.set(def.key, value.to_string());
    }

    /// `None` supprime la clé
    pub fn set_optional_long(&self, def: &SettingDef, value: Option<i64>) {
        match value {
            Some(v) => self.set_long(def, v),
            None => self.clear(def),
        }
    }

    pub fn set_bool(&self, def: &SettingDef, value: bool) {
        self.store.set(def.key, value.to_string());
    }

    /// Écrit une chaîne, encodée si le paramètre est un secret.
    /// `None` supprime la clé : la lecture suivante rendra la valeur par défaut.
    pub fn set_string(&self, def: &SettingDef, value: Option<&str>) {
        match value {
            None => self.clear(def),
            Some(v) => {
                let stored = match def.codec {
                    Codec::Plain => v.to_string(),
                    Codec::Hex => encode_secret(v),
                };
                self.store.set(def.key, stored);
            }
        }
    }

    pub fn clear(&self, def: &SettingDef) {
        self.store.clear(def.key);
    }
}

/// Booléen textuel, insensible à la casse
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
