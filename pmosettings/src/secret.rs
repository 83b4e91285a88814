//! Encodage des secrets dans le fichier de propriétés
//!
//! Les mots de passe (LDAP, SMTP) sont stockés sous forme hexadécimale de
//! leurs octets UTF-8. Ce n'est **pas** un chiffrement : l'encodage évite
//! seulement qu'un mot de passe soit lisible d'un coup d'œil dans le
//! fichier. Quiconque peut lire le fichier peut retrouver le secret.

use thiserror::Error;
use tracing::warn;

/// Échec de décodage d'une valeur stockée
#[derive(Error, Debug)]
pub enum SecretDecodeError {
    #[error("not a valid hex string: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("decoded bytes are not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode un secret en hexadécimal minuscule
pub fn encode_secret(plain: &str) -> String {
    hex::encode(plain.as_bytes())
}

/// Décode un secret encodé par [`encode_secret`]
///
/// Les majuscules sont acceptées.
pub fn decode_secret(encoded: &str) -> Result<String, SecretDecodeError> {
    let bytes = hex::decode(encoded)?;
    Ok(String::from_utf8(bytes)?)
}

/// Décode une valeur stockée, ou la renvoie telle quelle si elle n'est pas décodable
///
/// Un fichier édité à la main peut contenir le mot de passe en clair :
/// on le garde plutôt que de perdre la valeur.
pub fn read_secret(key: &str, stored: &str) -> String {
    match decode_secret(stored) {
        Ok(plain) => plain,
        Err(e) => {
            warn!(key = key, error = %e, "Failed to decode stored secret, using raw value");
            stored.to_string()
        }
    }
}
