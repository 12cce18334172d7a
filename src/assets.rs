use std::path::{Path, PathBuf};

use rocket::fs::NamedFile;
use rocket::State;

/// Directory holding the built front end.
#[derive(Debug, Clone)]
pub struct StaticDir(pub PathBuf);

impl StaticDir {
    pub fn index(&self) -> PathBuf {
        self.0.join("index.html")
    }

    pub fn exists(&self) -> bool {
        self.0.is_dir()
    }
}

/// Any GET no other route claimed gets the single-page app's entry point.
#[get("/<_path..>", rank = 20)]
pub async fn index_fallback(_path: PathBuf, dir: &State<StaticDir>) -> Option<NamedFile> {
    open_index(&dir.index()).await
}

async fn open_index(path: &Path) -> Option<NamedFile> {
    match NamedFile::open(path).await {
        Ok(file) => Some(file),
        Err(e) => {
            log::debug!("No index at {}: {}", path.display(), e);
            None
        }
    }
}
