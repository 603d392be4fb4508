//! Conversion error taxonomy
//!
//! Every variant aborts the conversion of one project document. Batch
//! drivers report it and move on to the next file.

use std::fmt;

/// Why a single project document could not be compiled
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Malformed JSON, missing required fields, wrong-length vectors or
    /// non-numeric coordinates
    #[error("invalid project document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A group lists a child identifier that is neither a group nor an element
    #[error("group '{group}' references unknown child '{child}'")]
    UnresolvedChild { group: String, child: String },

    /// A node is listed as a child by more than one group
    #[error("'{child}' is claimed by both group '{first}' and group '{second}'")]
    DuplicateParent {
        child: String,
        first: String,
        second: String,
    },

    /// A group is its own ancestor
    #[error("group '{group}' is its own ancestor")]
    CyclicGroup { group: String },

    /// An element belongs to no group and loose elements are rejected
    #[error("element '{element}' is not part of any group")]
    LooseElement { element: String },

    /// A cube or locator lacks a corner it needs for export
    #[error("element '{element}' has no '{field}' corner")]
    MissingCorner { element: String, field: &'static str },

    /// A textured face has no UV rectangle
    #[error("face '{face}' of element '{element}' has no uv rectangle")]
    MissingFaceUv { element: String, face: &'static str },
}

impl ConvertError {
    /// Broad category, used for reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) => ErrorKind::Schema,
            Self::UnresolvedChild { .. }
            | Self::DuplicateParent { .. }
            | Self::CyclicGroup { .. }
            | Self::LooseElement { .. } => ErrorKind::Reference,
            Self::MissingCorner { .. } | Self::MissingFaceUv { .. } => ErrorKind::Shape,
        }
    }
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Schema,
    Reference,
    Shape,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Schema => "schema",
            ErrorKind::Reference => "reference",
            ErrorKind::Shape => "shape",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let err = ConvertError::UnresolvedChild {
            group: "body".into(),
            child: "abc".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Reference);
        assert_eq!(err.to_string(), "group 'body' references unknown child 'abc'");

        let err = ConvertError::MissingCorner {
            element: "leg".into(),
            field: "to",
        };
        assert_eq!(err.kind(), ErrorKind::Shape);

        let err: ConvertError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert_eq!(err.kind().to_string(), "schema");
    }
}
