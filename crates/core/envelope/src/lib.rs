//! 协议传输信封：线上数据模型、JSON 编解码与网格展开。
//!
//! 服务端先后存在两代线上格式，两代都必须能解码：
//!
//! - 旧格式（稀疏）：`grid.cells` 为带 `(r, c)` 坐标的稀疏单元格列表，
//!   `columnsEditable` 以字符串化列号为键，合同号在 `Protokoll.VN`。
//! - 新格式（稠密）：`grid.body` 为按行排列的单元格二维数组，携带
//!   `qStartCol` 与表级 `itemsEditable`，合同号在 `Meta.VNnr`。
//!
//! 两种 Grid 形态保持为独立变体（按 `body`/`cells` 字段存在性选择），
//! 仅在展开为稠密字符串矩阵时汇合；Meta/Protokoll 的拼写差异通过
//! serde alias 归一到同一个信封类型。

pub mod codec;
pub mod grid;
pub mod model;

pub use codec::{DecodeError, decode, encode};
pub use grid::{EditKind, render_value};
pub use model::{
    Anlage, BodyCell, DenseGrid, EditedBy, Grid, Head, HeadSpan, Meta, Protokoll,
    ProtokollEnvelope, SparseCell, SparseGrid, Tabelle,
};
