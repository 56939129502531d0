//! 信封 JSON 编解码与解码错误类型。

use crate::model::ProtokollEnvelope;

/// 解码错误：结构非法或必填元数据缺失。
///
/// 解码失败绝不产出部分对象；调用方应保留原始载荷以便排查
/// 服务端 schema 漂移。
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// 明文 JSON → 信封。未知字段忽略（跨服务端版本容忍）。
pub fn decode(text: &str) -> Result<ProtokollEnvelope, DecodeError> {
    let env: ProtokollEnvelope = serde_json::from_str(text)?;
    // 合同号两代格式位置不同，但至少要有一处
    if env.vertragsnummer().is_none() {
        return Err(DecodeError::MissingField("VN"));
    }
    Ok(env)
}

/// 信封 → 明文 JSON（现行拼写）。
pub fn encode(env: &ProtokollEnvelope) -> Result<String, DecodeError> {
    Ok(serde_json::to_string(env)?)
}
