//! 本地协议缓存：按合同号落盘的明文 JSON，一键一文件。
//!
//! 合同号先经 [`safe_name`] 净化为安全文件名。解码失败的载荷也要
//! 缓存（调用方先存后解码），以便排查服务端 schema 漂移。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// 存储层错误：封装底层文件系统错误。
#[derive(Debug)]
pub struct StorageError {
    message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// 文件名净化：`[A-Za-z0-9._-]` 之外的字符一律替换为下划线。
pub fn safe_name(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// 按合同号缓存协议 JSON 的文件存储。
pub struct ProtokollStore {
    dir: PathBuf,
}

impl ProtokollStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", safe_name(key)))
    }

    /// 写入（覆盖）一份协议 JSON。
    pub fn save(&self, key: &str, json: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        fs::write(&path, json)?;
        debug!(key = %key, path = %path.display(), bytes = json.len(), "protokoll cached");
        Ok(())
    }

    /// 读取一份协议 JSON；不存在时返回 None。
    pub fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(json) => Ok(Some(json)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// 已缓存的键列表（按名称排序）。
    pub fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut keys: Vec<String> = self
            .read_cache_dir()?
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// 删除一份缓存；返回是否确实存在。
    pub fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// 清空缓存目录；返回删除的条目数。
    pub fn clear(&self) -> Result<usize, StorageError> {
        let mut removed = 0usize;
        for (key, _) in self.read_cache_dir()? {
            if self.delete(&key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// 按修改时间取最近缓存的 `(键, JSON)`。
    pub fn load_most_recent(&self) -> Result<Option<(String, String)>, StorageError> {
        let mut newest: Option<(String, SystemTime)> = None;
        for (key, path) in self.read_cache_dir()? {
            let modified = fs::metadata(&path)?.modified()?;
            let newer = match &newest {
                Some((_, best)) => modified > *best,
                None => true,
            };
            if newer {
                newest = Some((key, modified));
            }
        }
        let Some((key, _)) = newest else {
            return Ok(None);
        };
        Ok(self.load(&key)?.map(|json| (key, json)))
    }

    /// 缓存目录里的 `(键, 路径)` 列表；目录不存在视为空。
    fn read_cache_dir(&self) -> Result<Vec<(String, PathBuf)>, StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut out = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(key) = name.strip_suffix(".json") else {
                continue;
            };
            out.push((key.to_string(), path));
        }
        Ok(out)
    }
}
