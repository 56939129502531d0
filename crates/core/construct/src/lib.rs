//! UI 投影：解码后的信封 → 渲染器直接可用的构件。
//!
//! 构件每次加载时重新推导、随视图销毁而丢弃，自身不持久化、
//! 不持有独立状态；核心层对任何 UI 状态（编辑模式、当前季度）
//! 一无所知。

use envelope::{EditKind, HeadSpan, ProtokollEnvelope, Tabelle};
use tracing::warn;

/// 一张展开完成的 UI 表。
#[derive(Debug, Clone)]
pub struct UiTable {
    /// 表头标签矩阵（照搬传输结构）。
    pub header: Vec<Vec<String>>,
    /// 表头合并范围（照搬传输结构）。
    pub spans: Option<Vec<HeadSpan>>,
    /// 稠密字符串行（网格已展开）。
    pub rows: Vec<Vec<String>>,
    /// 每列的编辑器类型，长度等于列数。
    pub editors: Vec<EditKind>,
    /// 季度列起始列号（仅新格式携带）。
    pub q_start_col: Option<usize>,
    /// 整表可编辑标记。
    pub items_editable: bool,
}

impl UiTable {
    fn from_tabelle(tabelle: &Tabelle, default_kind: EditKind) -> Self {
        Self {
            header: tabelle
                .head
                .as_ref()
                .map(|head| head.rows.clone())
                .unwrap_or_default(),
            spans: tabelle.head.as_ref().and_then(|head| head.spans.clone()),
            rows: tabelle.grid.to_dense_strings(),
            editors: tabelle.grid.resolved_editors(default_kind),
            q_start_col: tabelle.grid.q_start_col(),
            items_editable: tabelle.items_editable,
        }
    }
}

/// 一处 Anlage 的 UI 投影：主表必有，硬件表可选。
#[derive(Debug, Clone)]
pub struct UiAnlage {
    pub name: String,
    pub melder: UiTable,
    pub hardware: Option<UiTable>,
}

/// 整个协议的 UI 投影。
#[derive(Debug, Clone)]
pub struct ProtokollConstruct {
    pub p_type: String,
    pub w_type: String,
    pub vn: String,
    pub kunde: String,
    /// 编辑器下拉用的探测器类型标签。
    pub melder_types: Vec<String>,
    pub anlagen: Vec<UiAnlage>,
    /// 因缺少主表被丢弃的 Anlage 数量（保留既有行为，但必须可观测）。
    pub dropped_anlagen: usize,
}

/// 信封 → 构件。
///
/// 主表的列编辑器默认 `MelderType`，硬件表默认 `String`。
/// 没有主表的 Anlage 被丢弃而不是报错；每次丢弃都会记日志，
/// 总数记录在 `dropped_anlagen` 供调用方上报。
pub fn to_construct(env: &ProtokollEnvelope) -> ProtokollConstruct {
    let mut anlagen = Vec::new();
    let mut dropped = 0usize;

    for anlage in &env.protokoll.anlagen {
        let Some(melder) = &anlage.melder else {
            dropped += 1;
            warn!(anlage = %anlage.name, "anlage without melder table dropped from construct");
            continue;
        };

        anlagen.push(UiAnlage {
            name: anlage.name.clone(),
            melder: UiTable::from_tabelle(melder, EditKind::MelderType),
            hardware: anlage
                .hardware
                .as_ref()
                .map(|hw| UiTable::from_tabelle(hw, EditKind::String)),
        });
    }

    ProtokollConstruct {
        p_type: env.meta.p_type.clone(),
        w_type: env.meta.w_type.clone(),
        vn: env.vertragsnummer().unwrap_or_default().to_string(),
        kunde: env.kunde().unwrap_or_default().to_string(),
        melder_types: env.protokoll.melder_types.clone(),
        anlagen,
        dropped_anlagen: dropped,
    }
}
