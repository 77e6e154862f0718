use std::fmt;

use serde::Serialize;

/// Canonical form hashed into a [`CacheKey`]. Field order here is the
/// serialized order, so reordering these fields invalidates every stored key.
#[derive(Serialize)]
struct KeyMaterial<'a> {
    text: &'a str,
    #[serde(rename = "voiceId")]
    voice_id: &'a str,
}

/// MD5 digest of a (text, voice) pair, as 32 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the stored audio object for this key.
    pub fn object_name(&self) -> String {
        format!("{}.mp3", self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn derive_key(text: &str, voice_id: &str) -> CacheKey {
    let material = KeyMaterial { text, voice_id };
    let canonical =
        serde_json::to_vec(&material).expect("string-only key material always serializes");
    CacheKey(format!("{:x}", md5::compute(canonical)))
}
