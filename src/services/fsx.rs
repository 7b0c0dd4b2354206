//! Narrow filesystem helpers composed by the orchestrator.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Recursively copies `src` into `dst`, creating directories as needed.
/// Files already present under `dst` are left alone; the first bundle to
/// stage a file wins.
pub fn copy_tree(src: &Path, dst: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let to = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &to)?;
        } else {
            copy_if_absent(&entry.path(), &to)?;
        }
    }
    Ok(())
}

pub fn copy_if_absent(src: &Path, dst: &Path) -> anyhow::Result<()> {
    if !dst.exists() {
        fs::copy(src, dst)?;
    }
    Ok(())
}

pub fn remove_tree(path: &Path) -> anyhow::Result<()> {
    fs::remove_dir_all(path)?;
    Ok(())
}

/// Relocates a directory, falling back to copy-and-remove when a plain
/// rename fails (e.g. across filesystems).
pub fn move_tree(src: &Path, dst: &Path) -> anyhow::Result<()> {
    if fs::rename(src, dst).is_ok() {
        return Ok(());
    }
    copy_tree(src, dst)?;
    remove_tree(src)
}

/// Directories sorted by name, for deterministic work-list unwrapping.
pub fn list_subdirs(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Content hash over a directory tree: relative entry names and file bytes,
/// walked in sorted order so repeated runs agree.
pub fn hash_tree(path: &Path) -> anyhow::Result<String> {
    let mut hasher = Sha256::new();
    hash_into(path, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

fn hash_into(path: &Path, hasher: &mut Sha256) -> anyhow::Result<()> {
    let mut entries: Vec<_> = fs::read_dir(path)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        hasher.update(entry.file_name().to_string_lossy().as_bytes());
        if entry.file_type()?.is_dir() {
            hash_into(&entry.path(), hasher)?;
        } else {
            hasher.update(fs::read(entry.path())?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{copy_tree, hash_tree};
    use std::fs;

    #[test]
    fn copy_tree_never_overwrites() {
        let tmp = tempfile::TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a.txt"), "new").unwrap();
        fs::write(src.join("nested/b.txt"), "b").unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("a.txt"), "old").unwrap();

        copy_tree(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "old");
        assert_eq!(fs::read_to_string(dst.join("nested/b.txt")).unwrap(), "b");
    }

    #[test]
    fn hash_tree_is_stable_and_content_sensitive() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("bundle");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("x.txt"), "1").unwrap();
        let first = hash_tree(&dir).unwrap();
        assert_eq!(first, hash_tree(&dir).unwrap());
        fs::write(dir.join("x.txt"), "2").unwrap();
        assert_ne!(first, hash_tree(&dir).unwrap());
    }
}
