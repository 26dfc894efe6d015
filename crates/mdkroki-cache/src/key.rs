//! Cache key computation.

use std::fmt;

use sha2::{Digest, Sha256};

/// Content-based cache key for a rendered diagram.
///
/// Combines a SHA-256 hash of every parameter that affects the rendered
/// output with the output file extension, which also names the on-disk
/// entry (`{hash}.{extension}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    hash: String,
    extension: String,
}

impl Fingerprint {
    /// Compute the fingerprint of a diagram.
    ///
    /// Options are sorted by key before hashing, so the result does not
    /// depend on the order in which they were collected.
    ///
    /// # Hash Format
    ///
    /// SHA-256 over the diagram type, extension, source, option count and
    /// each sorted key and value. Every field is written as its byte length
    /// (`u64`, little endian) followed by its bytes, so no choice of field
    /// contents can make two different inputs hash the same stream.
    #[must_use]
    pub fn compute<I, K, V>(diagram_type: &str, extension: &str, source: &str, options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut pairs: Vec<(String, String)> = options
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_owned()))
            .collect();
        pairs.sort();

        let mut hasher = Sha256::new();
        update_field(&mut hasher, diagram_type.as_bytes());
        update_field(&mut hasher, extension.as_bytes());
        update_field(&mut hasher, source.as_bytes());
        hasher.update((pairs.len() as u64).to_le_bytes());
        for (key, value) in &pairs {
            update_field(&mut hasher, key.as_bytes());
            update_field(&mut hasher, value.as_bytes());
        }

        Self {
            hash: hex::encode(hasher.finalize()),
            extension: extension.to_owned(),
        }
    }

    /// Hex-encoded hash (64 characters).
    #[must_use]
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Output file extension.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Short hash prefix for log messages.
    #[must_use]
    pub fn short(&self) -> &str {
        &self.hash[..16]
    }

    /// On-disk file name: `{hash}.{extension}`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.hash, self.extension)
    }
}

/// Length-prefixed field.
fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};

    fn no_options() -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let key1 = Fingerprint::compute("plantuml", "svg", "A -> B", no_options());
        let key2 = Fingerprint::compute("plantuml", "svg", "A -> B", no_options());
        let key3 = Fingerprint::compute("plantuml", "svg", "C -> D", no_options());

        // Same inputs produce same hash
        assert_eq!(key1, key2);
        // Different source produces different hash
        assert_ne!(key1.hash(), key3.hash());
    }

    #[test]
    fn test_fingerprint_format() {
        let key = Fingerprint::compute("mermaid", "svg", "graph TD; A-->B;", no_options());

        assert_eq!(key.hash().len(), 64, "SHA-256 hash should be 64 hex characters");
        assert!(
            key.hash().chars().all(|c| c.is_ascii_hexdigit()),
            "Hash should contain only hex digits"
        );
        assert_eq!(key.file_name(), format!("{}.svg", key.hash()));
        assert_eq!(key.short(), &key.hash()[..16]);
        assert_eq!(key.to_string(), key.hash());
    }

    #[test]
    fn test_fingerprint_option_order_invariant() {
        let forward = Fingerprint::compute("vega", "png", "{}", [("a", "1"), ("b", "2")]);
        let reverse = Fingerprint::compute("vega", "png", "{}", [("b", "2"), ("a", "1")]);
        assert_eq!(forward, reverse);

        let btree = BTreeMap::from([("b".to_owned(), "2".to_owned()), ("a".to_owned(), "1".to_owned())]);
        let hash: HashMap<_, _> = btree.clone().into_iter().collect();
        assert_eq!(Fingerprint::compute("vega", "png", "{}", &btree), forward);
        assert_eq!(Fingerprint::compute("vega", "png", "{}", &hash), forward);
    }

    #[test]
    fn test_fingerprint_every_component_matters() {
        let base = Fingerprint::compute("plantuml", "svg", "src", [("theme", "dark")]);

        assert_ne!(base, Fingerprint::compute("c4plantuml", "svg", "src", [("theme", "dark")]));
        assert_ne!(base, Fingerprint::compute("plantuml", "png", "src", [("theme", "dark")]));
        assert_ne!(base, Fingerprint::compute("plantuml", "svg", "src2", [("theme", "dark")]));
        assert_ne!(base, Fingerprint::compute("plantuml", "svg", "src", [("theme", "light")]));
        assert_ne!(base, Fingerprint::compute("plantuml", "svg", "src", no_options()));
    }

    #[test]
    fn test_fingerprint_option_separators_do_not_collide() {
        let packed = Fingerprint::compute("vega", "svg", "{}", [("a", "1,b=2")]);
        let split = Fingerprint::compute("vega", "svg", "{}", [("a", "1"), ("b", "2")]);
        assert_ne!(packed, split);

        let key_eq = Fingerprint::compute("vega", "svg", "{}", [("a=b", "c")]);
        let value_eq = Fingerprint::compute("vega", "svg", "{}", [("a", "b=c")]);
        assert_ne!(key_eq, value_eq);
    }

    #[test]
    fn test_fingerprint_source_and_options_do_not_collide() {
        let in_source = Fingerprint::compute("mermaid", "svg", "x:a=1", no_options());
        let in_option = Fingerprint::compute("mermaid", "svg", "x", [("a", "1:")]);
        assert_ne!(in_source, in_option);

        let type_colon = Fingerprint::compute("a:b", "svg", "x", no_options());
        let extension_colon = Fingerprint::compute("a", "b:svg", "x", no_options());
        assert_ne!(type_colon, extension_colon);
    }

    #[test]
    fn test_fingerprint_known_value() {
        // Fixed across runs and platforms
        let key = Fingerprint::compute("mermaid", "svg", "x", [("theme", "dark")]);
        let mut hasher = Sha256::new();
        for field in [&b"mermaid"[..], b"svg", b"x"] {
            hasher.update((field.len() as u64).to_le_bytes());
            hasher.update(field);
        }
        hasher.update(1u64.to_le_bytes());
        for field in [&b"theme"[..], b"dark"] {
            hasher.update((field.len() as u64).to_le_bytes());
            hasher.update(field);
        }
        assert_eq!(key.hash(), hex::encode(hasher.finalize()));
    }
}
