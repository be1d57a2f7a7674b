use async_trait::async_trait;
use pinhole_core::blob::{BlobBackend, BlobLocation, BlobObject, Generation, Result, WriteOptions};
use pinhole_core::BlobError;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// Filesystem implementation of the [`BlobBackend`] trait.
///
/// Each bucket is a directory under `root` and each object a file below it;
/// object names may contain `/` to address nested files. Writes land in a
/// temporary sibling file that is then renamed over the target, so readers
/// never observe a partially written object.
///
/// The generation of an object is the xxh64 hash of its content. A write
/// holds an exclusive advisory lock on a `.{name}.lock` sibling from the
/// precondition check until the rename, so conditional writes stay atomic
/// across backend instances and processes sharing the same root.
#[derive(Debug)]
pub struct FsBlobBackend {
    root: PathBuf,
    create_buckets: bool,
    write_lock: Mutex<()>,
    tmp_counter: AtomicU64,
}

impl FsBlobBackend {
    /// Creates a backend rooted at `root`. Buckets must already exist as
    /// directories.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            create_buckets: false,
            write_lock: Mutex::new(()),
            tmp_counter: AtomicU64::new(0),
        }
    }

    /// Creates missing bucket directories on first write.
    pub fn create_buckets(mut self, create: bool) -> Self {
        self.create_buckets = create;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, location: &BlobLocation) -> Result<PathBuf> {
        let bucket = location.bucket();
        if !is_plain_segment(bucket) {
            return Err(BlobError::Operation(format!("invalid bucket name '{bucket}'")));
        }
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, location: &BlobLocation) -> Result<PathBuf> {
        let object = Path::new(location.object());
        let relative = object
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if location.object().is_empty() || !relative {
            return Err(BlobError::Operation(format!(
                "invalid object name '{}'",
                location.object()
            )));
        }
        Ok(self.bucket_dir(location)?.join(object))
    }

    async fn ensure_bucket(&self, location: &BlobLocation, create: bool) -> Result<()> {
        let dir = self.bucket_dir(location)?;
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(BlobError::BucketNotFound(location.bucket().to_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if create {
                    tokio::fs::create_dir_all(&dir).await?;
                    debug!(bucket = location.bucket(), dir = %dir.display(), "created bucket directory");
                    Ok(())
                } else {
                    Err(BlobError::BucketNotFound(location.bucket().to_owned()))
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn read_file(path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Blocks on an exclusive lock of the object's lock file. The lock is
    /// released when the returned handle is dropped.
    async fn lock_object(path: &Path) -> Result<File> {
        let lock_path = sibling(path, |name| format!(".{name}.lock"));
        tokio::task::spawn_blocking(move || {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&lock_path)?;
            file.lock()?;
            Ok::<_, std::io::Error>(file)
        })
        .await
        .map_err(|e| BlobError::Operation(format!("lock task failed: {e}")))?
        .map_err(Into::into)
    }

    fn tmp_path(&self, path: &Path) -> PathBuf {
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        sibling(path, |name| format!(".{name}.{}.{n}.tmp", std::process::id()))
    }
}

fn sibling(path: &Path, name: impl FnOnce(&str) -> String) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(name(&file_name))
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
}

fn content_generation(data: &[u8]) -> Generation {
    Generation::new(xxhash_rust::xxh64::xxh64(data, 0))
}

fn guess_content_type(path: &Path) -> Option<String> {
    let content_type = match path.extension()?.to_str()? {
        "json" => "application/json",
        "html" => "text/html; charset=utf-8",
        "js" => "application/javascript",
        "css" => "text/css",
        _ => return None,
    };
    Some(content_type.to_owned())
}

#[async_trait]
impl BlobBackend for FsBlobBackend {
    async fn read(&self, location: &BlobLocation) -> Result<Option<BlobObject>> {
        self.ensure_bucket(location, false).await?;
        let path = self.object_path(location)?;

        let Some(data) = Self::read_file(&path).await? else {
            trace!(%location, "object not found");
            return Ok(None);
        };

        Ok(Some(BlobObject {
            generation: content_generation(&data),
            content_type: guess_content_type(&path),
            data,
        }))
    }

    async fn write(
        &self,
        location: &BlobLocation,
        data: Vec<u8>,
        options: WriteOptions,
    ) -> Result<Generation> {
        let _guard = self.write_lock.lock().await;

        self.ensure_bucket(location, self.create_buckets).await?;
        let path = self.object_path(location)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let _object_lock = Self::lock_object(&path).await?;

        let current = Self::read_file(&path)
            .await?
            .map(|existing| content_generation(&existing));
        if !options.precondition.is_satisfied_by(current) {
            return Err(options.precondition.violation(location, current));
        }

        let generation = content_generation(&data);
        let tmp = self.tmp_path(&path);
        if let Err(e) = tokio::fs::write(&tmp, &data).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        trace!(%location, %generation, bytes = data.len(), "object written");
        Ok(generation)
    }
}
