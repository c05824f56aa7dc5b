//! Storage module for regild
//!
//! - `json`: JSON 파일 저장소 (권한, 호스트 설정, 테마 설정, 애드온 데이터)

mod json;

pub use json::JsonStore;
