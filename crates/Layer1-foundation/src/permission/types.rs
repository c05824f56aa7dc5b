//! 권한 플래그 (비트마스크)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// 확장 하나에 부여된 권한 비트마스크
///
/// 각 비트는 독립적인 capability다. 알 수 없는 비트도 그대로 보존한다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddonPermission(u32);

impl AddonPermission {
    pub const NONE: Self = Self(0);
    /// 렌더링된 UI 요소 읽기
    pub const USE_ELEMENTS: Self = Self(1);
    /// 렌더링된 UI 요소 수정
    pub const MODIFY_ELEMENTS: Self = Self(1 << 1);
    /// 다른 확장의 선언된 설정 읽기/수정
    pub const MODIFY_CONFIG: Self = Self(1 << 2);
    /// 확장 진단 컨텍스트 수신
    pub const EXTRA_INFO: Self = Self(1 << 3);
    /// 확장 레지스트리 API 사용
    pub const USE_API: Self = Self(1 << 4);
    /// 호스트 외부로 이벤트 발행
    pub const USE_EXTERNAL_API: Self = Self(1 << 5);

    pub const ALL: Self = Self(0b11_1111);

    /// (이름, 플래그, 설명) 목록
    const FLAGS: [(&'static str, Self, &'static str); 6] = [
        ("use_elements", Self::USE_ELEMENTS, "Read rendered UI elements"),
        ("modify_elements", Self::MODIFY_ELEMENTS, "Modify rendered UI elements"),
        ("modify_config", Self::MODIFY_CONFIG, "Read and modify other extensions' configuration"),
        ("extra_info", Self::EXTRA_INFO, "Receive extended diagnostic context"),
        ("use_api", Self::USE_API, "Use the extension registry API"),
        ("use_external_api", Self::USE_EXTERNAL_API, "Emit events outside the host"),
    ];

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// 모든 비트 포함 여부
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// 한 비트라도 겹치는지 (`mask & flag != 0`)
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// 이름으로 단일 플래그 조회 (`use_api`, `UseApi` 모두 허용)
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(|c| c.to_lowercase())
            .collect();
        Self::FLAGS
            .iter()
            .find(|(n, _, _)| n.replace('_', "") == normalized)
            .map(|(_, flag, _)| *flag)
    }

    /// 설정된 플래그 이름들
    pub fn names(self) -> Vec<&'static str> {
        Self::FLAGS
            .iter()
            .filter(|(_, flag, _)| self.contains(*flag))
            .map(|(name, _, _)| *name)
            .collect()
    }

    /// 단일 플래그 설명
    pub fn description(self) -> Option<&'static str> {
        Self::FLAGS
            .iter()
            .find(|(_, flag, _)| *flag == self)
            .map(|(_, _, desc)| *desc)
    }
}

impl BitOr for AddonPermission {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AddonPermission {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for AddonPermission {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl From<u32> for AddonPermission {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl fmt::Display for AddonPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        if names.is_empty() {
            write!(f, "none ({})", self.0)
        } else {
            write!(f, "{} ({})", names.join(" | "), self.0)
        }
    }
}
