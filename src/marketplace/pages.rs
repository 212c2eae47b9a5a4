//! File-backed wiki page storage.

use std::{future::Future, io, path::PathBuf, pin::Pin};
use tokio::{fs, io::AsyncWriteExt};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub body: String,
}

impl Page {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: String::new(),
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

pub type PageFuture<'a, T> = Pin<Box<dyn Future<Output = io::Result<T>> + Send + 'a>>;

/// Where wiki pages live.
///
/// Titles are validated by the handlers before they reach the store.
pub trait PageStore: Send + Sync {
    fn load<'a>(&'a self, title: &'a str) -> PageFuture<'a, Page>;
    fn save<'a>(&'a self, page: &'a Page) -> PageFuture<'a, ()>;
}

/// Stores each page as `<dir>/<title>.txt`, readable by the owner only.
#[derive(Clone, Debug)]
pub struct FilePageStore {
    dir: PathBuf,
}

impl FilePageStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, title: &str) -> PathBuf {
        self.dir.join(format!("{title}.txt"))
    }

    async fn read_page(&self, title: &str) -> io::Result<Page> {
        let body = fs::read(self.path(title)).await?;
        Ok(Page::new(title).with_body(String::from_utf8_lossy(&body)))
    }

    async fn write_page(&self, page: &Page) -> io::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(self.path(&page.title)).await?;
        file.write_all(page.body.as_bytes()).await?;
        file.flush().await
    }
}

impl PageStore for FilePageStore {
    fn load<'a>(&'a self, title: &'a str) -> PageFuture<'a, Page> {
        Box::pin(self.read_page(title))
    }

    fn save<'a>(&'a self, page: &'a Page) -> PageFuture<'a, ()> {
        Box::pin(self.write_page(page))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::Path;
    use ulid::Ulid;

    /// Temporary directory removed on drop.
    pub(crate) struct TempDir(PathBuf);

    impl TempDir {
        pub(crate) fn new() -> io::Result<Self> {
            let path = std::env::temp_dir().join(format!("marketplace-{}", Ulid::new()));
            std::fs::create_dir_all(&path)?;
            Ok(Self(path))
        }

        pub(crate) fn path(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    #[tokio::test]
    async fn save_then_load_returns_body() -> io::Result<()> {
        let dir = TempDir::new()?;
        let store = FilePageStore::new(dir.path());

        store.save(&Page::new("Front").with_body("hello wiki")).await?;

        assert_eq!(
            store.load("Front").await?,
            Page::new("Front").with_body("hello wiki")
        );
        Ok(())
    }

    #[tokio::test]
    async fn save_truncates_previous_body() -> io::Result<()> {
        let dir = TempDir::new()?;
        let store = FilePageStore::new(dir.path());

        store.save(&Page::new("Front").with_body("a much longer body")).await?;
        store.save(&Page::new("Front").with_body("short")).await?;

        assert_eq!(store.load("Front").await?.body, "short");
        Ok(())
    }

    #[tokio::test]
    async fn load_missing_page_fails() -> io::Result<()> {
        let dir = TempDir::new()?;
        let store = FilePageStore::new(dir.path());

        let err = store.load("Missing").await.err().map(|err| err.kind());
        assert_eq!(err, Some(io::ErrorKind::NotFound));
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn saved_pages_are_owner_only() -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new()?;
        let store = FilePageStore::new(dir.path());
        store.save(&Page::new("Private").with_body("x")).await?;

        let mode = std::fs::metadata(dir.path().join("Private.txt"))?
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
        Ok(())
    }
}
