/// Alias for `Result<T, ContentError>`.
pub type CoreResult<T> = Result<T, ContentError>;

/// Fatal content errors. Any of these aborts the content load.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The content file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path that failed to load.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not valid JSON or does not have the bundle shape.
    #[error("malformed content: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is an `{"error": ...}` document produced by a failed build.
    #[error("content build failed: {0}")]
    Build(String),

    /// The bundle has no `config` (or `_config`) section.
    #[error("missing required config section")]
    MissingConfig,

    /// A step entry has no string `id`.
    #[error("step #{index} has no id")]
    MissingStepId {
        /// Position of the entry in the `steps` array.
        index: usize,
    },

    /// A step or inline patch entry does not match the expected shape.
    #[error("invalid entry '{id}': {source}")]
    InvalidEntry {
        /// Id of the offending entry.
        id: String,
        /// Deserialization error.
        source: serde_json::Error,
    },

    /// A patch has neither a `target` nor an id suffix to derive one from.
    #[error("patch '{patch}' has no target")]
    PatchWithoutTarget {
        /// Id of the patch.
        patch: String,
    },

    /// A patch targets another patch.
    #[error("patch '{patch}' targets another patch '{target}'")]
    PatchTargetsPatch {
        /// Id of the offending patch.
        patch: String,
        /// The patch it targets.
        target: String,
    },
}

impl ContentError {
    /// The structured `{"error": "..."}` document UIs render in place of a bundle.
    pub fn error_document(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_document_carries_message() {
        let doc = ContentError::MissingConfig.error_document();
        assert_eq!(doc["error"], "missing required config section");
    }

    #[test]
    fn patch_error_display() {
        let e = ContentError::PatchTargetsPatch {
            patch: "patch:a".to_string(),
            target: "patch:b".to_string(),
        };
        assert_eq!(e.to_string(), "patch 'patch:a' targets another patch 'patch:b'");
    }
}
