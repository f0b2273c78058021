// src/db/snapshot.rs
//
// Estado de um agregado em memória, opcionalmente espelhado em um arquivo
// JSON. Cada `write` é uma transação lógica: aplica a mutação em uma cópia,
// persiste a cópia e só então a publica. Se a mutação ou a gravação falham,
// o estado anterior permanece intacto.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

use crate::common::error::StorageError;

/// Backend escolhido uma única vez na configuração.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    JsonFile { dir: PathBuf },
}

impl StorageBackend {
    fn file_for(&self, name: &str) -> Option<PathBuf> {
        match self {
            StorageBackend::Memory => None,
            StorageBackend::JsonFile { dir } => Some(dir.join(format!("{name}.json"))),
        }
    }
}

pub struct Snapshot<S> {
    state: Mutex<S>,
    file: Option<PathBuf>,
}

impl<S> Snapshot<S>
where
    S: Serialize + DeserializeOwned + Clone + Send,
{
    /// Lê o snapshot persistido, se houver.
    pub async fn restore(backend: &StorageBackend, name: &str) -> Result<Option<S>, StorageError> {
        let Some(path) = backend.file_for(name) else {
            return Ok(None);
        };

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn with_state(
        backend: &StorageBackend,
        name: &str,
        state: S,
    ) -> Result<Self, StorageError> {
        let file = backend.file_for(name);
        if let Some(dir) = file.as_deref().and_then(Path::parent) {
            tokio::fs::create_dir_all(dir).await?;
        }

        Ok(Self {
            state: Mutex::new(state),
            file,
        })
    }

    pub async fn open(backend: &StorageBackend, name: &str) -> Result<Self, StorageError>
    where
        S: Default,
    {
        let state = Self::restore(backend, name).await?.unwrap_or_default();
        Self::with_state(backend, name, state).await
    }

    pub async fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }

    /// Mantém o agregado travado enquanto `op` roda, se `check` aprovar o
    /// estado atual. Escritas concorrentes esperam `op` terminar.
    pub async fn read_while<T, E, Fut>(
        &self,
        check: impl FnOnce(&S) -> Result<(), E>,
        op: Fut,
    ) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let state = self.state.lock().await;
        check(&state)?;
        let result = op.await;
        drop(state);
        result
    }

    pub async fn write<R, E>(&self, f: impl FnOnce(&mut S) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StorageError>,
    {
        let mut state = self.state.lock().await;
        let mut draft = state.clone();
        let result = f(&mut draft)?;

        if let Some(path) = &self.file {
            persist(path, &draft).await?;
        }

        *state = draft;
        Ok(result)
    }
}

async fn persist<S: Serialize>(path: &Path, state: &S) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u64,
    }

    #[derive(Debug)]
    enum TestError {
        Rejected,
        Storage,
    }

    impl From<StorageError> for TestError {
        fn from(_: StorageError) -> Self {
            TestError::Storage
        }
    }

    #[tokio::test]
    async fn failed_mutation_leaves_state_untouched() {
        let store: Snapshot<Counter> = Snapshot::open(&StorageBackend::Memory, "counter").await.unwrap();

        store
            .write(|s| {
                s.value = 1;
                Ok::<_, TestError>(())
            })
            .await
            .unwrap();

        let result = store
            .write(|s| {
                s.value = 99;
                Err::<(), _>(TestError::Rejected)
            })
            .await;

        assert!(matches!(result, Err(TestError::Rejected)));
        assert_eq!(store.read(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn json_backend_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let backend = StorageBackend::JsonFile {
            dir: dir.path().join("nested"),
        };

        let store: Snapshot<Counter> = Snapshot::open(&backend, "counter").await.unwrap();
        store
            .write(|s| {
                s.value = 7;
                Ok::<_, TestError>(())
            })
            .await
            .unwrap();
        drop(store);

        let reopened: Snapshot<Counter> = Snapshot::open(&backend, "counter").await.unwrap();
        assert_eq!(reopened.read(|s| s.clone()).await, Counter { value: 7 });
        assert!(!dir.path().join("nested/counter.json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupted_snapshot_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("counter.json"), b"{ not json").unwrap();
        let backend = StorageBackend::JsonFile {
            dir: dir.path().to_path_buf(),
        };

        let result = Snapshot::<Counter>::open(&backend, "counter").await;
        assert!(matches!(result, Err(StorageError::Json(_))));
    }
}
