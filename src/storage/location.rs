//! Storage locations (S3, R2, local filesystem)

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A root inside an object store that relative keys are resolved against
#[derive(Clone)]
pub struct StorageLocation {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the bucket
    prefix: ObjectPath,
    /// URL scheme for logging
    scheme: String,
}

impl fmt::Debug for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageLocation")
            .field("scheme", &self.scheme)
            .field("prefix", &self.prefix.as_ref())
            .finish_non_exhaustive()
    }
}

impl StorageLocation {
    /// Parse a location URL and create the matching object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` or `s3a://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (requires `storage.endpoint`)
    /// - `file:///path/`, `/path/` or `./path/` - Local filesystem
    ///
    /// With `create` set, a missing local directory is created; otherwise it
    /// is an error.
    pub fn parse(url: &str, storage: &StorageConfig, create: bool) -> Result<Self> {
        if let Some(rest) = url.strip_prefix("s3://") {
            Self::parse_s3(rest, "s3", storage)
        } else if let Some(rest) = url.strip_prefix("s3a://") {
            Self::parse_s3(rest, "s3a", storage)
        } else if let Some(rest) = url.strip_prefix("r2://") {
            if storage.endpoint.is_none() {
                return Err(Error::missing_field("storage.endpoint"));
            }
            Self::parse_s3(rest, "r2", storage)
        } else if url.contains("://") && !url.starts_with("file://") {
            Err(Error::config(format!("Unsupported storage URL: {url}")))
        } else {
            Self::parse_local(url, create)
        }
    }

    /// Wrap an existing store, e.g. `InMemory` in tests
    pub fn from_store(store: Arc<dyn ObjectStore>, prefix: &str, scheme: &str) -> Self {
        Self {
            store,
            prefix: ObjectPath::from_iter(split_segments(prefix)),
            scheme: scheme.to_string(),
        }
    }

    /// Build an S3-compatible store with explicit credentials
    fn parse_s3(without_scheme: &str, scheme: &str, storage: &StorageConfig) -> Result<Self> {
        let (bucket, prefix) = match without_scheme.find('/') {
            Some(idx) => (&without_scheme[..idx], &without_scheme[idx + 1..]),
            None => (without_scheme, ""),
        };
        if bucket.is_empty() {
            return Err(Error::config(format!(
                "Missing bucket in {scheme} URL: {scheme}://{without_scheme}"
            )));
        }

        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_allow_http(storage.allow_http);

        if let Some(region) = &storage.region {
            builder = builder.with_region(region);
        }
        if let (Some(key), Some(secret)) = (&storage.access_key_id, &storage.secret_access_key) {
            builder = builder
                .with_access_key_id(key)
                .with_secret_access_key(secret);
        }
        if let Some(token) = &storage.session_token {
            builder = builder.with_token(token);
        }
        if let Some(endpoint) = &storage.endpoint {
            builder = builder.with_endpoint(endpoint);
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: ObjectPath::from_iter(split_segments(prefix)),
            scheme: scheme.to_string(),
        })
    }

    /// Local filesystem root
    fn parse_local(path: &str, create: bool) -> Result<Self> {
        let path = path.strip_prefix("file://").unwrap_or(path);

        if create {
            std::fs::create_dir_all(path)
                .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;
        } else if !std::path::Path::new(path).is_dir() {
            return Err(Error::FileNotFound {
                path: path.to_string(),
            });
        }

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: ObjectPath::default(),
            scheme: "file".to_string(),
        })
    }

    /// Check if this is a cloud location (not local)
    pub fn is_cloud(&self) -> bool {
        self.scheme != "file"
    }

    /// Get the scheme (s3, s3a, r2, file, ...)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Resolve a relative `/`-separated key to a full object path
    fn resolve(&self, relative: &str) -> ObjectPath {
        self.resolve_parts(&split_segments(relative))
    }

    /// Resolve relative segments; each segment is encoded on its own
    fn resolve_parts(&self, segments: &[&str]) -> ObjectPath {
        let mut path = self.prefix.clone();
        for segment in segments {
            path = path.child(*segment);
        }
        path
    }

    /// Strip this location's prefix from a full path, decoding each segment
    fn relative_segments(&self, full: &ObjectPath) -> Result<Option<Vec<String>>> {
        let Some(parts) = full.prefix_match(&self.prefix) else {
            return Ok(None);
        };
        parts
            .map(|part| unescape_segment(part.as_ref()))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// Display form of a relative key, for logs and errors
    pub fn display(&self, relative: &str) -> String {
        format!("{}://{}", self.scheme, self.resolve(relative))
    }

    /// List full paths of every object under a relative prefix
    async fn list_paths(&self, relative_prefix: &str) -> Result<Vec<ObjectPath>> {
        let path = self.resolve(relative_prefix);
        let listing = if path.as_ref().is_empty() {
            None
        } else {
            Some(&path)
        };

        let metas: Vec<_> = self.store.list(listing).try_collect().await?;
        Ok(metas.into_iter().map(|meta| meta.location).collect())
    }

    /// List every object under a relative prefix, returning decoded relative
    /// segments sorted lexicographically
    pub async fn list_segments(&self, relative_prefix: &str) -> Result<Vec<Vec<String>>> {
        let paths = self.list_paths(relative_prefix).await?;

        let mut entries = Vec::with_capacity(paths.len());
        for path in &paths {
            if let Some(segments) = self.relative_segments(path)? {
                entries.push(segments);
            }
        }
        entries.sort();

        debug!(
            location = %self.display(relative_prefix),
            objects = entries.len(),
            "Listed objects"
        );
        Ok(entries)
    }

    /// List every object under a relative prefix, returning `/`-joined
    /// relative keys sorted lexicographically
    pub async fn list(&self, relative_prefix: &str) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self
            .list_segments(relative_prefix)
            .await?
            .into_iter()
            .map(|segments| segments.join("/"))
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Fetch one object
    pub async fn get(&self, relative: &str) -> Result<Bytes> {
        self.get_parts(&split_segments(relative)).await
    }

    /// Fetch one object addressed by already-split segments
    pub async fn get_parts(&self, segments: &[&str]) -> Result<Bytes> {
        let path = self.resolve_parts(segments);
        let result = self.store.get(&path).await?;
        Ok(result.bytes().await?)
    }

    /// Write one object addressed by already-split segments
    ///
    /// Segments may contain any character; `/` inside a segment does not
    /// create a directory.
    pub async fn put_parts(&self, segments: &[&str], data: Bytes) -> Result<String> {
        let path = self.resolve_parts(segments);
        self.store
            .put(&path, data.into())
            .await
            .map_err(|e| Error::output(format!("Failed to write {path}: {e}")))?;

        Ok(format!("{}://{path}", self.scheme))
    }

    /// Write one object at a relative key
    pub async fn put(&self, relative: &str, data: Bytes) -> Result<String> {
        self.put_parts(&split_segments(relative), data).await
    }

    /// Delete every object under a relative prefix, returning how many were removed
    pub async fn delete_prefix(&self, relative_prefix: &str) -> Result<usize> {
        let paths = self.list_paths(relative_prefix).await?;
        for path in &paths {
            self.store
                .delete(path)
                .await
                .map_err(|e| Error::output(format!("Failed to delete {path}: {e}")))?;
        }
        Ok(paths.len())
    }
}

/// Split a `/`-separated key, dropping empty segments
fn split_segments(key: &str) -> Vec<&str> {
    key.split('/').filter(|s| !s.is_empty()).collect()
}

/// Reverse the `%XX` encoding object_store applies to path segments
pub(crate) fn unescape_segment(segment: &str) -> Result<String> {
    urlencoding::decode(segment)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| Error::invalid_path(segment, e.to_string()))
}
