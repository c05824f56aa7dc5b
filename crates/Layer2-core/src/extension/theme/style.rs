//! Style Tree - 호스트의 활성 스타일 트리
//!
//! 테마 하나는 id로 범위가 정해진 스타일 블록 하나로 붙고 떨어진다.

use parking_lot::RwLock;
use std::path::PathBuf;

/// 스타일 블록 요소 id 접두사
pub const THEME_BLOCK_PREFIX: &str = "regild-theme-";

/// 변수 요소 id 접두사
pub const VARIABLES_PREFIX: &str = "regild-variables-";

/// CSS 파일 하나의 내용
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    pub path: PathBuf,
    pub css: String,
}

/// 테마 하나의 스타일 블록
#[derive(Debug, Clone, PartialEq)]
pub struct StyleBlock {
    pub theme_id: String,
    /// 설정 변수 (`#app{...}`)
    pub variables: Option<String>,
    /// 선언 순서대로의 CSS
    pub sheets: Vec<StyleSheet>,
}

impl StyleBlock {
    pub fn new(theme_id: impl Into<String>) -> Self {
        Self {
            theme_id: theme_id.into(),
            variables: None,
            sheets: Vec::new(),
        }
    }

    pub fn element_id(&self) -> String {
        format!("{}{}", THEME_BLOCK_PREFIX, self.theme_id)
    }

    /// 하나로 이어붙인 스타일 내용
    pub fn render(&self) -> String {
        let mut out = format!("/* {} */\n", self.element_id());
        if let Some(variables) = &self.variables {
            out.push_str(&format!("/* {}{} */\n", VARIABLES_PREFIX, self.theme_id));
            out.push_str(variables);
            out.push('\n');
        }
        for sheet in &self.sheets {
            out.push_str(&sheet.css);
            if !sheet.css.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }
}

/// 스타일 블록을 붙이고 떼는 호스트 표면
pub trait StyleHost: Send + Sync {
    /// 같은 테마의 기존 블록은 교체
    fn attach(&self, block: StyleBlock);

    /// 반환값: 블록이 있었는지
    fn detach(&self, theme_id: &str) -> bool;
}

/// 메모리 안의 스타일 트리 (붙인 순서 유지)
#[derive(Default)]
pub struct StyleTree {
    blocks: RwLock<Vec<StyleBlock>>,
}

impl StyleTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, theme_id: &str) -> bool {
        self.blocks.read().iter().any(|b| b.theme_id == theme_id)
    }

    pub fn get(&self, theme_id: &str) -> Option<StyleBlock> {
        self.blocks
            .read()
            .iter()
            .find(|b| b.theme_id == theme_id)
            .cloned()
    }

    pub fn blocks(&self) -> Vec<StyleBlock> {
        self.blocks.read().clone()
    }

    /// 전체 트리 렌더링
    pub fn render(&self) -> String {
        self.blocks
            .read()
            .iter()
            .map(StyleBlock::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl StyleHost for StyleTree {
    fn attach(&self, block: StyleBlock) {
        let mut blocks = self.blocks.write();
        match blocks.iter_mut().find(|b| b.theme_id == block.theme_id) {
            Some(existing) => *existing = block,
            None => blocks.push(block),
        }
    }

    fn detach(&self, theme_id: &str) -> bool {
        let mut blocks = self.blocks.write();
        let before = blocks.len();
        blocks.retain(|b| b.theme_id != theme_id);
        blocks.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: &str, css: &str) -> StyleBlock {
        StyleBlock {
            theme_id: id.to_string(),
            variables: None,
            sheets: vec![StyleSheet {
                path: PathBuf::from(format!("/themes/{}/main.css", id)),
                css: css.to_string(),
            }],
        }
    }

    #[test]
    fn test_attach_replaces_same_theme() {
        let tree = StyleTree::new();
        tree.attach(block("dark", "body{color:red}"));
        tree.attach(block("dark", "body{color:blue}"));

        assert_eq!(tree.blocks().len(), 1);
        assert!(tree.render().contains("color:blue"));
    }

    #[test]
    fn test_detach() {
        let tree = StyleTree::new();
        tree.attach(block("dark", "a{}"));
        assert!(tree.detach("dark"));
        assert!(!tree.detach("dark"));
        assert!(tree.render().is_empty());
    }

    #[test]
    fn test_render_block() {
        let mut b = block("dark", "a{}");
        b.variables = Some("#app{--x:1}".into());
        let out = b.render();

        assert!(out.starts_with("/* regild-theme-dark */"));
        assert!(out.contains("#app{--x:1}\na{}"));
    }
}
