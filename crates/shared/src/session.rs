//! 会话持久化端口
//!
//! 以键值形式保存 JSON 快照（当前用户、购物车、订单缓存），让会话状态在进程重启后可以恢复。
//! 业务计算本身不依赖此端口，持久化以装饰器方式包裹在外层。
//!
//! - [`MemorySessionStore`]：进程内存储，适合测试和一次性运行
//! - [`FileSessionStore`]：每个键一个 `<key>.json` 文件
//!
//! 损坏的快照会被丢弃并视为不存在。

use std::path::{Path, PathBuf};

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, SharedError};

/// 会话快照存储
pub trait SessionStore: Send + Sync {
    /// 读取快照，不存在时返回 None
    fn load(&self, key: &str) -> Result<Option<Value>>;

    /// 写入快照，覆盖旧值
    fn save(&self, key: &str, value: Value) -> Result<()>;

    /// 删除快照，不存在时不报错
    fn remove(&self, key: &str) -> Result<()>;
}

/// 读取并反序列化为具体类型
///
/// 结构不匹配的快照按损坏处理：删除后返回 None
pub fn load_typed<T: DeserializeOwned>(store: &dyn SessionStore, key: &str) -> Result<Option<T>> {
    let Some(value) = store.load(key)? else {
        return Ok(None);
    };

    match serde_json::from_value(value) {
        Ok(typed) => Ok(Some(typed)),
        Err(e) => {
            warn!(key = %key, error = %e, "会话快照结构不匹配，已丢弃");
            store.remove(key)?;
            Ok(None)
        }
    }
}

/// 序列化并写入
pub fn save_typed<T: Serialize>(store: &dyn SessionStore, key: &str, value: &T) -> Result<()> {
    store.save(key, serde_json::to_value(value)?)
}

/// 键只允许字母、数字、`-`、`_`、`.` 和 `@`，且不能以 `.` 开头
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
    if valid {
        Ok(())
    } else {
        Err(SharedError::InvalidKey(key.to_string()))
    }
}

/// 进程内会话存储
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: DashMap<String, Value>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        validate_key(key)?;
        Ok(self.entries.get(key).map(|v| v.clone()))
    }

    fn save(&self, key: &str, value: Value) -> Result<()> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.entries.remove(key);
        Ok(())
    }
}

/// 文件会话存储
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    directory: PathBuf,
}

impl FileSessionStore {
    /// 创建存储，目录不存在时自动创建
    pub fn new(directory: impl AsRef<Path>) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.directory.join(format!("{}.json", key)))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "会话快照已损坏，已删除");
                self.remove(key)?;
                Ok(None)
            }
        }
    }

    fn save(&self, key: &str, value: Value) -> Result<()> {
        let path = self.path_for(key)?;
        // 先写临时文件再重命名，避免中途崩溃留下半个快照
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&value)?)?;
        std::fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), "会话快照已保存");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Snapshot {
        items: Vec<i64>,
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("bakery-session-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemorySessionStore::new();
        assert!(store.load("cart").unwrap().is_none());

        store.save("cart", json!({"items": [1, 2]})).unwrap();
        assert_eq!(store.load("cart").unwrap(), Some(json!({"items": [1, 2]})));

        store.remove("cart").unwrap();
        assert!(store.load("cart").unwrap().is_none());
        // 重复删除不报错
        store.remove("cart").unwrap();
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let store = MemorySessionStore::new();
        assert!(matches!(
            store.save("../escape", json!(1)),
            Err(SharedError::InvalidKey(_))
        ));
        assert!(store.load("").is_err());
        assert!(store.load("user@duoc.cl").is_ok());
    }

    #[test]
    fn test_typed_helpers_discard_mismatched_snapshot() {
        let store = MemorySessionStore::new();
        save_typed(&store, "cart", &Snapshot { items: vec![7] }).unwrap();
        let loaded: Option<Snapshot> = load_typed(&store, "cart").unwrap();
        assert_eq!(loaded, Some(Snapshot { items: vec![7] }));

        store.save("cart", json!({"items": "oops"})).unwrap();
        let loaded: Option<Snapshot> = load_typed(&store, "cart").unwrap();
        assert!(loaded.is_none());
        assert!(store.load("cart").unwrap().is_none());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = temp_dir();
        let store = FileSessionStore::new(&dir).unwrap();

        save_typed(&store, "orders_1", &Snapshot { items: vec![1, 2, 3] }).unwrap();
        assert!(dir.join("orders_1.json").exists());

        // 新实例读取同一目录
        let reopened = FileSessionStore::new(&dir).unwrap();
        let loaded: Option<Snapshot> = load_typed(&reopened, "orders_1").unwrap();
        assert_eq!(loaded, Some(Snapshot { items: vec![1, 2, 3] }));

        reopened.remove("orders_1").unwrap();
        assert!(!dir.join("orders_1.json").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_file_store_discards_corrupt_snapshot() {
        let dir = temp_dir();
        let store = FileSessionStore::new(&dir).unwrap();
        std::fs::write(dir.join("cart.json"), "{ not json").unwrap();

        assert!(store.load("cart").unwrap().is_none());
        assert!(!dir.join("cart.json").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
