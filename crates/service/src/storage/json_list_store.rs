use std::{marker::PhantomData, path::{Path, PathBuf}, sync::Arc};
use tokio::{fs, sync::Mutex};

use crate::errors::ServiceError;

/// Generic JSON file-backed list store.
///
/// The file holds a single JSON array. Every operation re-reads the file,
/// mutates the list and writes it back, so edits made to the file by hand are
/// picked up on the next request. Operations on one store are serialized by
/// an async mutex, and writes land in a sibling temp file that is renamed
/// over the target.
pub struct JsonListStore<T> {
    lock: Mutex<()>,
    file_path: PathBuf,
    _item: PhantomData<fn() -> T>,
}

impl<T> JsonListStore<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Initialize the store from a path. Creates the file with an empty array if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(ServiceError::storage)?;
            }
        }
        if fs::metadata(&file_path).await.is_err() {
            write_atomic(&file_path, b"[]").await?;
        }
        Ok(Arc::new(Self { lock: Mutex::new(()), file_path, _item: PhantomData }))
    }

    async fn load(&self) -> Result<Vec<T>, ServiceError> {
        let bytes = fs::read(&self.file_path).await.map_err(ServiceError::storage)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| ServiceError::Storage(format!("{}: {e}", self.file_path.display())))
    }

    async fn save(&self, items: &[T]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(items).map_err(ServiceError::storage)?;
        write_atomic(&self.file_path, &data).await
    }

    /// All items in file order.
    pub async fn list(&self) -> Result<Vec<T>, ServiceError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// First item matching the predicate.
    pub async fn find<P>(&self, pred: P) -> Result<Option<T>, ServiceError>
    where
        P: Fn(&T) -> bool,
    {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_iter().find(|item| pred(item)))
    }

    /// Read the list, apply `f`, and persist only when `f` reports a change.
    ///
    /// `f` returns `(changed, output)`; the output is handed back to the caller.
    pub async fn update_list<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<(bool, R), ServiceError>,
    {
        let _guard = self.lock.lock().await;
        let mut items = self.load().await?;
        let (changed, out) = f(&mut items)?;
        if changed {
            self.save(&items).await?;
        }
        Ok(out)
    }
}

async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), ServiceError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_string());
    let tmp = path.with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()));
    fs::write(&tmp, data).await.map_err(ServiceError::storage)?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(ServiceError::storage(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_path() -> PathBuf {
        std::env::temp_dir().join(format!("json_list_store_{}", uuid::Uuid::new_v4())).join("items.json")
    }

    #[tokio::test]
    async fn creates_missing_file_as_empty_array() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        let store = JsonListStore::<String>::new(&path).await?;
        assert!(store.list().await?.is_empty());
        assert_eq!(tokio::fs::read_to_string(&path).await?, "[]");
        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_list_persists_and_preserves_order() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        let store = JsonListStore::<String>::new(&path).await?;
        for s in ["a", "b", "c"] {
            store.update_list(|items| { items.push(s.to_string()); Ok((true, ())) }).await?;
        }
        let removed = store
            .update_list(|items| {
                let before = items.len();
                items.retain(|i| i != "b");
                Ok((items.len() != before, before))
            })
            .await?;
        assert_eq!(removed, 3);

        let reloaded = JsonListStore::<String>::new(&path).await?;
        assert_eq!(reloaded.list().await?, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(reloaded.find(|s| s == "c").await?.as_deref(), Some("c"));
        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn picks_up_external_edits() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        let store = JsonListStore::<u32>::new(&path).await?;
        tokio::fs::write(&path, "[1, 2, 3]").await?;
        assert_eq!(store.list().await?, vec![1, 2, 3]);
        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error_not_a_reset() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        let store = JsonListStore::<u32>::new(&path).await?;
        tokio::fs::write(&path, "{not json").await?;
        assert!(matches!(store.list().await, Err(ServiceError::Storage(_))));
        assert_eq!(tokio::fs::read_to_string(&path).await?, "{not json");
        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_writers_do_not_lose_updates() -> Result<(), anyhow::Error> {
        let path = tmp_path();
        let store = JsonListStore::<u32>::new(&path).await?;
        let mut handles = Vec::new();
        for i in 0..32u32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.update_list(|items| { items.push(i); Ok((true, ())) }).await
            }));
        }
        for h in handles {
            h.await??;
        }
        let mut items = store.list().await?;
        items.sort_unstable();
        assert_eq!(items, (0..32).collect::<Vec<_>>());
        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }
}
