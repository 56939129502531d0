//! 网格展开：稀疏/稠密线上形态 → 稠密字符串矩阵 + 列编辑器映射。

use crate::model::{DenseGrid, Grid, SparseGrid};
use serde_json::Value;

/// 列编辑器类型：决定编辑模式下该列使用的输入控件。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    None,
    String,
    Int,
    Bool,
    MelderType,
}

impl EditKind {
    /// 关键字解析（大小写不敏感）；无法识别的关键字落回 `default`。
    pub fn parse(keyword: &str, default: EditKind) -> EditKind {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "none" => EditKind::None,
            "string" => EditKind::String,
            "int" => EditKind::Int,
            "bool" => EditKind::Bool,
            "meldertype" => EditKind::MelderType,
            _ => default,
        }
    }
}

/// 多态单元格值 → 规范显示字符串。
///
/// Null/缺失 → ""，整数精确十进制，布尔 "true"/"false"，字符串原样；
/// 其余类型兜底为 JSON 文本。
pub fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.to_string()
            }
        }
        Some(other) => other.to_string(),
    }
}

impl Grid {
    pub fn row_count(&self) -> usize {
        match self {
            Grid::Dense(g) => g.row_count,
            Grid::Sparse(g) => g.row_count,
        }
    }

    pub fn col_count(&self) -> usize {
        match self {
            Grid::Dense(g) => g.col_count,
            Grid::Sparse(g) => g.col_count,
        }
    }

    /// 季度列起始列号；仅稠密格式携带。
    pub fn q_start_col(&self) -> Option<usize> {
        match self {
            Grid::Dense(g) => g.q_start_col,
            Grid::Sparse(_) => None,
        }
    }

    /// 展开为恰好 `rowCount × colCount` 的字符串矩阵，空缺补空串。
    pub fn to_dense_strings(&self) -> Vec<Vec<String>> {
        match self {
            Grid::Dense(g) => g.to_dense_strings(),
            Grid::Sparse(g) => g.to_dense_strings(),
        }
    }

    /// 每列的编辑器类型，长度恰好为 `colCount`。
    ///
    /// 显式声明的列取其声明值（无法识别的关键字落回 `default`），
    /// 未声明的列取 `default`；解析失败或越界的列键直接丢弃。
    pub fn resolved_editors(&self, default: EditKind) -> Vec<EditKind> {
        let (col_count, declared) = match self {
            Grid::Dense(g) => (g.col_count, &g.columns_editable),
            Grid::Sparse(g) => (g.col_count, &g.columns_editable),
        };
        let mut editors = vec![default; col_count];
        for (key, keyword) in declared {
            if let Ok(idx) = key.trim().parse::<usize>() {
                if idx < col_count {
                    editors[idx] = EditKind::parse(keyword, default);
                }
            }
        }
        editors
    }
}

impl SparseGrid {
    /// 稀疏 → 稠密：越界坐标静默丢弃（防御性解码，服务端多发的
    /// 游离单元格不得导致客户端崩溃）。
    pub fn to_dense_strings(&self) -> Vec<Vec<String>> {
        let mut rows = vec![vec![String::new(); self.col_count]; self.row_count];
        for cell in &self.cells {
            let (Ok(r), Ok(c)) = (usize::try_from(cell.r), usize::try_from(cell.c)) else {
                continue;
            };
            if r >= self.row_count || c >= self.col_count {
                continue;
            }
            rows[r][c] = render_value(cell.v.as_ref());
        }
        rows
    }
}

impl DenseGrid {
    /// 声明尺寸优先：超出的行/列截断，不足的补空串。
    pub fn to_dense_strings(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.row_count);
        for r in 0..self.row_count {
            let body_row = self.body.get(r);
            let mut row = Vec::with_capacity(self.col_count);
            for c in 0..self.col_count {
                let cell = body_row.and_then(|cells| cells.get(c));
                row.push(render_value(cell.and_then(|cell| cell.v.as_ref())));
            }
            rows.push(row);
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_value_kinds() {
        assert_eq!(render_value(None), "");
        assert_eq!(render_value(Some(&Value::Null)), "");
        assert_eq!(render_value(Some(&json!("AM"))), "AM");
        assert_eq!(render_value(Some(&json!(true))), "true");
        assert_eq!(render_value(Some(&json!(false))), "false");
        assert_eq!(render_value(Some(&json!(42))), "42");
        assert_eq!(render_value(Some(&json!(-7))), "-7");
        assert_eq!(render_value(Some(&json!(2.5))), "2.5");
    }

    #[test]
    fn render_value_fallback_is_json_text() {
        assert_eq!(render_value(Some(&json!(["a", 1]))), r#"["a",1]"#);
    }

    #[test]
    fn edit_kind_parse_is_case_insensitive() {
        assert_eq!(EditKind::parse("NONE", EditKind::String), EditKind::None);
        assert_eq!(EditKind::parse("MelderType", EditKind::String), EditKind::MelderType);
        assert_eq!(EditKind::parse("Int", EditKind::String), EditKind::Int);
        // 未识别关键字 → 调用方默认值
        assert_eq!(EditKind::parse("combobox", EditKind::Bool), EditKind::Bool);
    }
}
