//! Error types at the rendering-surface and asset boundaries.
//!
//! None of these reach the controller's caller: the controller matches every
//! result, logs failures and degrades.

use std::fmt;

/// Which surface call failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SurfaceErrorKind {
    AnnotationManager,
    CameraRead,
    CameraWrite,
    Ornament,
    Subscribe,
    CreateAnnotation,
    DeleteAnnotations,
}

impl fmt::Display for SurfaceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AnnotationManager => "annotation manager",
            Self::CameraRead => "camera read",
            Self::CameraWrite => "camera write",
            Self::Ornament => "ornament",
            Self::Subscribe => "gesture subscribe",
            Self::CreateAnnotation => "create annotation",
            Self::DeleteAnnotations => "delete annotations",
        };
        f.write_str(s)
    }
}

/// Error returned by a [`MapSurface`](crate::MapSurface) or
/// [`PointAnnotations`](crate::PointAnnotations) call.
#[derive(Debug)]
pub struct SurfaceError {
    pub kind: SurfaceErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.kind, self.message)
    }
}

impl std::error::Error for SurfaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl SurfaceError {
    pub fn new(kind: SurfaceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: SurfaceErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Error loading a bundled asset.
#[derive(Debug)]
pub struct AssetError {
    pub path: String,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset {}: {}", self.path, self.message)
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl AssetError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        path: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// A [`GlobeConfig`](crate::GlobeConfig) value the controller cannot run with.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl ConfigError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}
