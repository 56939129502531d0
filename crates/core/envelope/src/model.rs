//! 信封数据模型（两代线上格式共用）。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 信封元数据：协议类型、周期类型、合同号与客户名。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    /// 协议类型，如 "BMA"、"EMA"。
    #[serde(rename = "pType", alias = "PType")]
    pub p_type: String,
    /// 维护周期类型，如 "1J"、"2Q"、"4Q"。
    #[serde(rename = "wType", alias = "WType")]
    pub w_type: String,
    /// 合同号（新格式在 Meta 上；旧格式在 Protokoll.VN）。
    #[serde(rename = "VNnr", default, skip_serializing_if = "Option::is_none")]
    pub vn_nr: Option<String>,
    /// 客户名（新格式在 Meta 上；旧格式在 Protokoll.Kdn）。
    #[serde(rename = "Kunde", default, skip_serializing_if = "Option::is_none")]
    pub kunde: Option<String>,
    #[serde(rename = "schemaVersion", default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    #[serde(rename = "generatedAt", default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

/// 表头合并范围：`(r0, c0)` 到 `(r1, c1)`，含可选标签。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadSpan {
    pub r0: usize,
    pub c0: usize,
    pub r1: usize,
    pub c1: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// 多行表头：标签矩阵 + 可选合并范围列表。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Head {
    pub rows: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spans: Option<Vec<HeadSpan>>,
}

/// 稀疏单元格：坐标 + 多态值。
///
/// 坐标用有符号类型接收，越界（含负数）的单元格在展开时丢弃而不是报错。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparseCell {
    pub r: i64,
    pub c: i64,
    /// 观测/显示值：String/Number/Bool/Null。
    #[serde(default)]
    pub v: Option<Value>,
    /// 自由文本类型提示（仅旧格式语义，勿与稠密格式的目标值混用）。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

/// 稠密格式的行内单元格。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyCell {
    /// 观测/显示值：String/Number/Bool/Null。
    #[serde(default)]
    pub v: Option<Value>,
    /// 季度列的目标/应检值（仅新格式语义）。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<Value>,
}

/// 稀疏网格：`rowCount`/`colCount` 显式声明，单元格按坐标列出。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparseGrid {
    #[serde(rename = "rowCount")]
    pub row_count: usize,
    #[serde(rename = "colCount")]
    pub col_count: usize,
    /// 键为字符串化列号（0 基），值为编辑器类型关键字。
    #[serde(rename = "columnsEditable", default)]
    pub columns_editable: BTreeMap<String, String>,
    pub cells: Vec<SparseCell>,
}

/// 稠密网格：按行排列的单元格二维数组。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseGrid {
    #[serde(rename = "rowCount")]
    pub row_count: usize,
    #[serde(rename = "colCount")]
    pub col_count: usize,
    #[serde(rename = "columnsEditable", default)]
    pub columns_editable: BTreeMap<String, String>,
    pub body: Vec<Vec<BodyCell>>,
    /// 季度/周期列的起始列号（0 基）。
    #[serde(rename = "qStartCol", default, skip_serializing_if = "Option::is_none")]
    pub q_start_col: Option<usize>,
}

/// 网格线上形态：按 `body`/`cells` 字段存在性区分两代格式。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Grid {
    Dense(DenseGrid),
    Sparse(SparseGrid),
}

/// 一张可渲染的表：表头 + 网格 + 表级可编辑标记。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tabelle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Head>,
    pub grid: Grid,
    /// 非元数据单元格是否可编辑；仅新格式携带，缺省为 false。
    #[serde(rename = "itemsEditable", default)]
    pub items_editable: bool,
}

/// 一处受维护的站点/建筑（Anlage）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anlage {
    #[serde(alias = "Name")]
    pub name: String,
    /// 主表（探测器/报警设备检查表）；缺失的 Anlage 在映射时被丢弃。
    #[serde(alias = "Melder", default, skip_serializing_if = "Option::is_none")]
    pub melder: Option<Tabelle>,
    /// 可选的硬件检查表。
    #[serde(alias = "Hardware", default, skip_serializing_if = "Option::is_none")]
    pub hardware: Option<Tabelle>,
}

/// 服务端编辑者署名（新格式携带）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditedBy {
    pub name: String,
    pub ts: String,
}

/// 协议主体：探测器类型列表 + Anlage 列表。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Protokoll {
    /// 编辑器下拉用的探测器类型标签（有序）。
    #[serde(rename = "melderTypes", alias = "MelderTypes", default)]
    pub melder_types: Vec<String>,
    /// 解码成功后绝不为 null；空列表合法（渲染为空表）。
    #[serde(alias = "Anlagen", default)]
    pub anlagen: Vec<Anlage>,
    /// 合同号（旧格式位置）。
    #[serde(rename = "VN", default, skip_serializing_if = "Option::is_none")]
    pub vn: Option<String>,
    /// 客户名（旧格式位置）。
    #[serde(rename = "Kdn", default, skip_serializing_if = "Option::is_none")]
    pub kdn: Option<String>,
    #[serde(rename = "editedBy", default, skip_serializing_if = "Option::is_none")]
    pub edited_by: Option<EditedBy>,
}

/// 顶层传输信封。解码后不可变。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtokollEnvelope {
    #[serde(alias = "Meta")]
    pub meta: Meta,
    #[serde(alias = "Protokoll")]
    pub protokoll: Protokoll,
}

impl ProtokollEnvelope {
    /// 合同号：优先 Meta.VNnr，回退 Protokoll.VN。
    pub fn vertragsnummer(&self) -> Option<&str> {
        self.meta
            .vn_nr
            .as_deref()
            .or(self.protokoll.vn.as_deref())
    }

    /// 客户名：优先 Meta.Kunde，回退 Protokoll.Kdn。
    pub fn kunde(&self) -> Option<&str> {
        self.meta
            .kunde
            .as_deref()
            .or(self.protokoll.kdn.as_deref())
    }
}
