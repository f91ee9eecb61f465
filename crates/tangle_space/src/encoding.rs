//! Canonical JSON encoding of a space.
//!
//! The document carries two top-level keys: `alphabet` (the
//! variable-name universe) and `insts` (id to `{id, seq, deps, cmds}`,
//! commands as statement strings). Both maps are sorted, so encoding is
//! canonical: decoding a document this module produced and re-encoding
//! it yields the identical byte string.

use tangle_core::CoreResult;

use crate::space::Space;

impl Space {
    /// Encode to the canonical pretty-JSON document
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocument` if encoding fails.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from a JSON document
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocument` if the text is not a well-formed space
    /// document, including any malformed command statement inside it.
    pub fn from_json(text: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
