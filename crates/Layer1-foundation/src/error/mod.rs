//! Error types for regild
//!
//! 모든 에러를 중앙에서 관리

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// regild 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 저장소 관련
    // ========================================================================
    #[error("Storage error: {0}")]
    Storage(String),

    // ========================================================================
    // 확장 메타데이터 관련
    // ========================================================================
    #[error("Invalid metadata in {path}: {message}")]
    InvalidMetadata { path: PathBuf, message: String },

    #[error("Entry file of extension '{id}' not found: {path}")]
    MissingEntryFile { id: String, path: PathBuf },

    /// 디렉토리에 메타데이터 파일이 없음 (확장이 아님)
    #[error("No extension descriptor in {0}")]
    NoDescriptor(PathBuf),

    // ========================================================================
    // 확장 실행 관련
    // ========================================================================
    #[error("Extension '{id}' failed during {phase}: {message}")]
    ExtensionRuntime {
        id: String,
        phase: String,
        message: String,
    },

    #[error("Malformed settings in extension '{id}': {message}")]
    MalformedSettings { id: String, message: String },

    // ========================================================================
    // 권한 관련
    // ========================================================================
    #[error("Permission denied for extension '{id}': {permission}")]
    PermissionDenied { id: String, permission: String },

    // ========================================================================
    // 파일 감시 관련
    // ========================================================================
    #[error("Watch error: {0}")]
    Watch(String),

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 에러가 아닌 "확장 없음"을 의미하는지 확인
    pub fn is_absence(&self) -> bool {
        matches!(self, Error::NoDescriptor(_))
    }

    /// 확장 코드 내부에서 발생한 에러인지 확인
    pub fn is_extension_fault(&self) -> bool {
        matches!(
            self,
            Error::ExtensionRuntime { .. } | Error::MalformedSettings { .. }
        )
    }

    /// 메타데이터 에러 생성 헬퍼
    pub fn invalid_metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::InvalidMetadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// 확장 런타임 에러 생성 헬퍼
    pub fn extension_runtime(
        id: impl Into<String>,
        phase: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::ExtensionRuntime {
            id: id.into(),
            phase: phase.into(),
            message: message.into(),
        }
    }

    /// 설정 에러 생성 헬퍼
    pub fn malformed_settings(id: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedSettings {
            id: id.into(),
            message: message.into(),
        }
    }
}
