//! Theme Settings - 테마 스타일 변수
//!
//! `settings.json` 형식:
//!
//! ```json
//! { "accent": { "type": "color", "value": "#ff0000", "name": "Accent colour" } }
//! ```
//!
//! 테마는 컴파일되지 않으므로 잘못된 설정은 거부하지 않고 보정한다.

use crate::extension::descriptor::is_valid_id;
use regild_foundation::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

// ============================================================================
// SettingType
// ============================================================================

/// 허용된 설정 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingType {
    Url,
    Size,
    Color,
    Number,
    Percent,
    Untyped,
}

impl SettingType {
    /// 허용 목록에 없으면 None
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "url" => Some(Self::Url),
            "size" => Some(Self::Size),
            "color" => Some(Self::Color),
            "number" => Some(Self::Number),
            "percent" => Some(Self::Percent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            Self::Url => Some("url"),
            Self::Size => Some("size"),
            Self::Color => Some("color"),
            Self::Number => Some("number"),
            Self::Percent => Some("percent"),
            Self::Untyped => None,
        }
    }
}

// ============================================================================
// SettingValue
// ============================================================================

/// 허용된 값 형태: 문자열, 불리언, 숫자, 없음
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    String(String),
    Boolean(bool),
    Number(serde_json::Number),
    Absent,
}

impl SettingValue {
    /// 허용되지 않은 형태는 문자열로 보정. 반환값의 bool은 보정 여부.
    pub fn coerce(value: Option<&Value>) -> (Self, bool) {
        match value {
            None | Some(Value::Null) => (Self::Absent, false),
            Some(Value::String(s)) => (Self::String(s.clone()), false),
            Some(Value::Bool(b)) => (Self::Boolean(*b), false),
            Some(Value::Number(n)) => (Self::Number(n.clone()), false),
            Some(other) => (Self::String(other.to_string()), true),
        }
    }

    /// CSS 값 표현 (Absent는 None)
    pub fn css(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Boolean(b) => Some(b.to_string()),
            Self::Number(n) => Some(n.to_string()),
            Self::Absent => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Absent => Value::Null,
        }
    }
}

// ============================================================================
// ThemeSettings
// ============================================================================

/// 설정 프로퍼티 하나
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeSetting {
    pub id: String,
    /// 표시 이름 (없으면 id)
    pub name: String,
    pub setting_type: SettingType,
    pub value: SettingValue,
}

/// 테마 하나의 검증된 설정
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeSettings {
    properties: Vec<ThemeSetting>,
}

impl ThemeSettings {
    /// `settings.json` 내용 파싱
    ///
    /// 최상위가 객체가 아니면 [`Error::MalformedSettings`].
    /// 개별 프로퍼티 문제는 경고 후 건너뛰거나 보정한다.
    pub fn parse(theme_id: &str, json: &Value) -> Result<Self> {
        let object = json.as_object().ok_or_else(|| {
            Error::malformed_settings(theme_id, "expected settings to be an object")
        })?;

        let mut properties = Vec::with_capacity(object.len());
        for (prop_id, prop) in object {
            if !is_valid_id(prop_id) {
                warn!(
                    extension = theme_id,
                    "Incorrect syntax for settings property '{}'; skipping", prop_id
                );
                continue;
            }
            let Some(prop) = prop.as_object() else {
                warn!(
                    extension = theme_id,
                    "Settings property '{}' must be an object; skipping", prop_id
                );
                continue;
            };

            let setting_type = match prop.get("type") {
                None | Some(Value::Null) => SettingType::Untyped,
                Some(Value::String(tag)) => SettingType::parse(tag).unwrap_or_else(|| {
                    warn!(extension = theme_id, "Unknown settings property type '{}'", tag);
                    SettingType::Untyped
                }),
                Some(other) => {
                    warn!(extension = theme_id, "Unknown settings property type {}", other);
                    SettingType::Untyped
                }
            };

            let (value, coerced) = SettingValue::coerce(prop.get("value"));
            if coerced {
                warn!(
                    extension = theme_id,
                    "Settings property '{}' has an unsupported value shape; using its string form",
                    prop_id
                );
            }

            let name = prop
                .get("name")
                .or_else(|| prop.get("displayName"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| prop_id.clone());

            properties.push(ThemeSetting {
                id: prop_id.clone(),
                name,
                setting_type,
                value,
            });
        }

        Ok(Self { properties })
    }

    pub fn properties(&self) -> &[ThemeSetting] {
        &self.properties
    }

    pub fn get(&self, id: &str) -> Option<&ThemeSetting> {
        self.properties.iter().find(|p| p.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// 값 변경. 반환값: 알 수 없는 프로퍼티 id 목록
    pub fn assign(&mut self, values: &Map<String, Value>) -> Vec<String> {
        let mut unknown = Vec::new();
        for (id, value) in values {
            match self.properties.iter_mut().find(|p| &p.id == id) {
                Some(prop) => prop.value = SettingValue::coerce(Some(value)).0,
                None => unknown.push(id.clone()),
            }
        }
        unknown
    }

    /// CSS 변수 블록: `#app{--a:b;--u:url(x)}`
    pub fn to_css(&self) -> String {
        let declarations: Vec<String> = self
            .properties
            .iter()
            .filter_map(|prop| {
                let value = prop.value.css()?;
                Some(match prop.setting_type {
                    SettingType::Url => format!("--{}:url({})", prop.id, value),
                    _ => format!("--{}:{}", prop.id, value),
                })
            })
            .collect();
        format!("#app{{{}}}", declarations.join(";"))
    }

    /// `settings.json`으로 쓸 JSON
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for prop in &self.properties {
            let mut entry = Map::new();
            if let Some(tag) = prop.setting_type.as_str() {
                entry.insert("type".into(), Value::String(tag.into()));
            }
            if prop.value != SettingValue::Absent {
                entry.insert("value".into(), prop.value.to_json());
            }
            entry.insert("name".into(), Value::String(prop.name.clone()));
            object.insert(prop.id.clone(), Value::Object(entry));
        }
        Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_color_variable() {
        let json = json!({ "accent": { "type": "color", "value": "#ff0000" } });
        let settings = ThemeSettings::parse("dark", &json).unwrap();
        assert!(settings.to_css().contains("--accent:#ff0000"));
        assert_eq!(settings.get("accent").unwrap().name, "accent");
    }

    #[test]
    fn test_invalid_property_id_skipped() {
        let settings = ThemeSettings::parse(
            "dark",
            &json!({
                "1bad id": { "type": "color", "value": "red" },
                "ok": { "value": 3 }
            }),
        )
        .unwrap();

        assert_eq!(settings.properties().len(), 1);
        assert_eq!(settings.to_css(), "#app{--ok:3}");
    }

    #[test]
    fn test_unknown_type_degrades_to_untyped() {
        let json = json!({ "bg": { "type": "gradient", "value": "x" } });
        let settings = ThemeSettings::parse("t", &json).unwrap();
        assert_eq!(settings.get("bg").unwrap().setting_type, SettingType::Untyped);
    }

    #[test]
    fn test_unsupported_value_coerced_to_string() {
        let settings =
            ThemeSettings::parse("t", &json!({ "list": { "value": [1, 2] } })).unwrap();
        assert_eq!(
            settings.get("list").unwrap().value,
            SettingValue::String("[1,2]".into())
        );
    }

    #[test]
    fn test_url_and_absent_rendering() {
        let settings = ThemeSettings::parse(
            "t",
            &json!({
                "bg": { "type": "url", "value": "https://example.com/bg.png" },
                "unset": { "type": "size" },
                "wide": { "type": "percent", "value": true }
            }),
        )
        .unwrap();

        assert_eq!(
            settings.to_css(),
            "#app{--bg:url(https://example.com/bg.png);--wide:true}"
        );
    }

    #[test]
    fn test_top_level_must_be_object() {
        let err = ThemeSettings::parse("t", &json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::MalformedSettings { .. }));
    }

    #[test]
    fn test_assign_and_serialize() {
        let mut settings = ThemeSettings::parse(
            "t",
            &json!({ "accent": { "type": "color", "value": "red", "displayName": "Accent" } }),
        )
        .unwrap();

        let mut values = Map::new();
        values.insert("accent".into(), json!("blue"));
        values.insert("missing".into(), json!(1));
        assert_eq!(settings.assign(&values), vec!["missing".to_string()]);

        let written = settings.to_json();
        assert_eq!(written["accent"]["value"], "blue");
        assert_eq!(written["accent"]["name"], "Accent");

        let reparsed = ThemeSettings::parse("t", &written).unwrap();
        assert_eq!(reparsed, settings);
    }
}
