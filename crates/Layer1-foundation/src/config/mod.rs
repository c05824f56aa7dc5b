//! Config - 호스트 설정 관리
//!
//! - `host.rs` - HostConfig (확장 디렉토리, 디바운스, 활성화 목록)

mod host;

pub use host::{HostConfig, DEFAULT_DEBOUNCE_MS, HOST_CONFIG_FILE};
