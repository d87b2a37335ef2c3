//! Chiffrement des secrets stockés dans `config.yaml`
//!
//! Les mots de passe et signatures sont écrits sous la forme
//! `encrypted:BASE64(nonce || ciphertext)`, chiffrés en AES-256-GCM avec une
//! clé dérivée de l'identifiant matériel de la machine. Un fichier copié sur
//! une autre machine n'est donc plus déchiffrable.
//!
//! Une valeur sans le préfixe est lue telle quelle : un secret saisi en clair
//! à la main reste utilisable.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use anyhow::{Result, anyhow};
use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};

/// Préfixe des valeurs chiffrées
pub const ENCRYPTED_PREFIX: &str = "encrypted:";

const NONCE_LEN: usize = 12;
const KEY_SALT: &[u8] = b"dhlbusiness-config-secret-v1";
const NONCE_SALT: &[u8] = b"dhlbusiness-secret-nonce-v1";

#[cfg(target_os = "linux")]
fn machine_id() -> Result<String> {
    ["/etc/machine-id", "/var/lib/dbus/machine-id"]
        .iter()
        .filter_map(|path| std::fs::read_to_string(path).ok())
        .map(|id| id.trim().to_string())
        .find(|id| !id.is_empty())
        .ok_or_else(|| anyhow!("Failed to read machine-id"))
}

#[cfg(target_os = "macos")]
fn machine_id() -> Result<String> {
    let output = std::process::Command::new("ioreg")
        .args(["-d2", "-c", "IOPlatformExpertDevice"])
        .output()?;
    // "IOPlatformUUID" = "XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX"
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .find(|line| line.contains("IOPlatformUUID"))
        .and_then(|line| line.split('"').nth(3))
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Failed to extract IOPlatformUUID from ioreg"))
}

#[cfg(target_os = "windows")]
fn machine_id() -> Result<String> {
    let output = std::process::Command::new("wmic")
        .args(["csproduct", "get", "UUID"])
        .output()?;
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .nth(1)
        .map(|line| line.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| anyhow!("Failed to extract UUID from wmic"))
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
fn machine_id() -> Result<String> {
    Err(anyhow!("Unsupported platform for machine id extraction"))
}

fn cipher() -> Result<Aes256Gcm> {
    let key = Sha256::new()
        .chain_update(machine_id()?.as_bytes())
        .chain_update(KEY_SALT)
        .finalize();
    Aes256Gcm::new_from_slice(&key).map_err(|e| anyhow!("Failed to create cipher: {}", e))
}

/// Chiffre `secret` et renvoie `encrypted:...`
///
/// Le nonce est dérivé du secret : chiffrer deux fois la même valeur donne
/// le même texte, et `config.yaml` ne change pas tant que le secret ne
/// change pas.
pub fn encrypt_secret(secret: &str) -> Result<String> {
    let digest = Sha256::new()
        .chain_update(secret.as_bytes())
        .chain_update(NONCE_SALT)
        .finalize();
    let nonce_bytes = &digest[..NONCE_LEN];

    let ciphertext = cipher()?
        .encrypt(Nonce::from_slice(nonce_bytes), secret.as_bytes())
        .map_err(|e| anyhow!("Encryption failed: {}", e))?;

    let mut sealed = nonce_bytes.to_vec();
    sealed.extend_from_slice(&ciphertext);
    Ok(format!("{ENCRYPTED_PREFIX}{}", STANDARD.encode(sealed)))
}

/// Déchiffre une valeur `encrypted:...`
pub fn decrypt_secret(value: &str) -> Result<String> {
    let encoded = value
        .strip_prefix(ENCRYPTED_PREFIX)
        .ok_or_else(|| anyhow!("Invalid encrypted value (missing prefix)"))?;
    let sealed = STANDARD
        .decode(encoded.trim())
        .map_err(|e| anyhow!("Invalid base64: {}", e))?;
    if sealed.len() <= NONCE_LEN {
        return Err(anyhow!("Invalid ciphertext (too short)"));
    }

    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
    let plaintext = cipher()?
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|e| anyhow!("Decryption failed (wrong machine or corrupted data): {}", e))?;
    String::from_utf8(plaintext).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
}

pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(ENCRYPTED_PREFIX)
}

/// Valeur en clair, que `value` soit chiffrée ou non
pub fn get_secret(value: &str) -> Result<String> {
    if is_encrypted(value) {
        decrypt_secret(value)
    } else {
        Ok(value.to_string())
    }
}

/// Forme à écrire dans le fichier
///
/// Une valeur vide reste vide (« non configuré ») et une valeur déjà
/// chiffrée n'est pas chiffrée une seconde fois.
pub fn seal_secret(value: &str) -> Result<String> {
    if value.is_empty() || is_encrypted(value) {
        Ok(value.to_string())
    } else {
        encrypt_secret(value)
    }
}
