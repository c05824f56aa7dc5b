//! Extension Descriptor - 확장 메타데이터 로더
//!
//! 확장 디렉토리의 `metadata.json`을 읽어 [`ExtensionDescriptor`]를 만든다.
//! 레지스트리를 건드리지 않는 순수한 읽기 단계다.

use lazy_static::lazy_static;
use regex::Regex;
use regild_foundation::{AddonPermission, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// 확장 디렉토리마다 하나씩 있는 메타데이터 파일
pub const DESCRIPTOR_FILE: &str = "metadata.json";

/// 테마 설정 파일 (호스트가 쓰므로 감시에서 제외)
pub const SETTINGS_FILE: &str = "settings.json";

/// 애드온 개인 데이터 파일 (감시에서 제외)
pub const DATA_FILE: &str = "data.json";

lazy_static! {
    /// 확장 id와 테마 설정 프로퍼티 id가 따르는 식별자 패턴
    pub static ref ID_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid id pattern");
}

/// 식별자 패턴 검사
pub fn is_valid_id(id: &str) -> bool {
    ID_PATTERN.is_match(id)
}

// ============================================================================
// ExtensionKind
// ============================================================================

/// 확장 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionKind {
    /// 코드를 실행하는 확장
    Addon,
    /// CSS만 가진 확장
    Theme,
}

impl std::fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Addon => write!(f, "addon"),
            Self::Theme => write!(f, "theme"),
        }
    }
}

// ============================================================================
// Raw metadata (파일 형식)
// ============================================================================

/// `files` 필드: 문자열 하나 또는 배열
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum FilesField {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    id: String,
    #[serde(default)]
    name: Option<String>,
    files: FilesField,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    permissions: Vec<String>,
}

// ============================================================================
// ExtensionDescriptor
// ============================================================================

/// 확장 하나의 선언적 정보
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionDescriptor {
    /// 레지스트리/권한/감시 전반의 조인 키
    pub id: String,
    pub name: String,
    pub kind: ExtensionKind,
    /// 확장 디렉토리 (절대 경로)
    pub directory: PathBuf,
    /// 확장 루트 아래의 디렉토리 이름 (감시 신호의 키)
    pub dir_name: String,
    /// 확장 디렉토리 안으로 해석된 엔트리 파일들
    pub entry_files: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// 메타데이터가 요청한 권한 (자동으로 부여되지 않음)
    pub requested_permissions: AddonPermission,
}

impl ExtensionDescriptor {
    /// 첫 번째 엔트리 파일 (애드온은 항상 하나)
    pub fn entry_file(&self) -> Option<&Path> {
        self.entry_files.first().map(PathBuf::as_path)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.directory.join(SETTINGS_FILE)
    }
}

// ============================================================================
// DescriptorLoader
// ============================================================================

/// 메타데이터 로더
pub struct DescriptorLoader;

impl DescriptorLoader {
    /// 디렉토리에서 디스크립터를 읽는다
    ///
    /// - 메타데이터 파일이 없으면 [`Error::NoDescriptor`] (확장이 아님)
    /// - 파싱 실패나 잘못된 id는 [`Error::InvalidMetadata`]
    /// - 엔트리 파일이 없거나 디렉토리 밖을 가리키면 [`Error::MissingEntryFile`] / [`Error::InvalidMetadata`]
    pub fn load(directory: &Path, kind: ExtensionKind) -> Result<ExtensionDescriptor> {
        let metadata_path = directory.join(DESCRIPTOR_FILE);
        if !metadata_path.is_file() {
            return Err(Error::NoDescriptor(directory.to_path_buf()));
        }

        let content = std::fs::read_to_string(&metadata_path)
            .map_err(|e| Error::invalid_metadata(&metadata_path, e.to_string()))?;
        let raw: RawMetadata = serde_json::from_str(&content)
            .map_err(|e| Error::invalid_metadata(&metadata_path, e.to_string()))?;

        if !is_valid_id(&raw.id) {
            return Err(Error::invalid_metadata(
                &metadata_path,
                format!("id '{}' must match {}", raw.id, ID_PATTERN.as_str()),
            ));
        }

        let files = Self::normalize_files(raw.files, kind, &raw.id);
        if files.is_empty() {
            return Err(Error::invalid_metadata(
                &metadata_path,
                "'files' must name at least one entry file",
            ));
        }

        let root = directory
            .canonicalize()
            .map_err(|e| Error::invalid_metadata(&metadata_path, e.to_string()))?;
        let entry_files = files
            .iter()
            .map(|file| Self::resolve_entry(&root, &raw.id, file))
            .collect::<Result<Vec<_>>>()?;

        let requested_permissions = raw.permissions.iter().fold(
            AddonPermission::NONE,
            |mask, name| match AddonPermission::from_name(name) {
                Some(flag) => mask | flag,
                None => {
                    warn!(extension = %raw.id, "Unknown permission '{}' in metadata", name);
                    mask
                }
            },
        );

        // 심볼릭 링크면 링크 이름이 감시 신호의 키가 된다
        let dir_name = directory
            .file_name()
            .or_else(|| root.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(ExtensionDescriptor {
            name: raw.name.unwrap_or_else(|| raw.id.clone()),
            id: raw.id,
            kind,
            directory: root,
            dir_name,
            entry_files,
            version: raw.version,
            description: raw.description,
            author: raw.author,
            requested_permissions,
        })
    }

    /// 배열 형식 `files`는 애드온에서 첫 항목만 사용
    fn normalize_files(files: FilesField, kind: ExtensionKind, id: &str) -> Vec<String> {
        match (files, kind) {
            (FilesField::One(file), _) => vec![file],
            (FilesField::Many(mut files), ExtensionKind::Addon) => {
                if files.len() > 1 {
                    warn!(
                        extension = id,
                        "An array of files for addons is deprecated; using the first item only"
                    );
                }
                files.truncate(1);
                files
            }
            (FilesField::Many(files), ExtensionKind::Theme) => files,
        }
    }

    /// 엔트리 파일 경로 해석
    ///
    /// 확장 디렉토리 안의 절대 경로는 허용, 디렉토리 밖으로 나가면 거부한다.
    fn resolve_entry(root: &Path, id: &str, file: &str) -> Result<PathBuf> {
        let joined = root.join(file);
        let resolved = joined.canonicalize().map_err(|_| Error::MissingEntryFile {
            id: id.to_string(),
            path: joined.clone(),
        })?;

        if !resolved.starts_with(root) {
            return Err(Error::invalid_metadata(
                root.join(DESCRIPTOR_FILE),
                format!("entry file '{}' is outside the extension directory", file),
            ));
        }
        if !resolved.is_file() {
            return Err(Error::MissingEntryFile {
                id: id.to_string(),
                path: resolved,
            });
        }
        Ok(resolved)
    }
}
