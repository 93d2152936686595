//! File-based storage implementation.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{Result, XiphosError};
use crate::storage::traits::{Storage, StorageConfig, StorageInput, StorageLock, StorageOutput};

/// A file-based storage rooted at a single directory.
#[derive(Debug)]
pub struct FileStorage {
    directory: PathBuf,
    config: StorageConfig,
}

impl FileStorage {
    /// Create a file storage in the given directory, creating it if needed.
    pub fn new<P: AsRef<Path>>(directory: P, config: StorageConfig) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.exists() {
            fs::create_dir_all(&directory)
                .map_err(|e| XiphosError::storage(format!("Failed to create directory: {e}")))?;
        }

        if !directory.is_dir() {
            return Err(XiphosError::storage(format!(
                "Path is not a directory: {}",
                directory.display()
            )));
        }

        Ok(FileStorage { directory, config })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }

    fn not_found(name: &str, e: io::Error) -> XiphosError {
        if e.kind() == io::ErrorKind::NotFound {
            XiphosError::storage(format!("File not found: {name}"))
        } else {
            XiphosError::Io(e)
        }
    }
}

/// Create `dir` if needed and check that files can be created inside it.
pub fn ensure_writable_dir<P: AsRef<Path>>(dir: P) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| {
        XiphosError::invalid_config(format!("Cannot create directory {}: {e}", dir.display()))
    })?;

    let probe = dir.join(".xiphos-write-probe");
    File::create(&probe).map_err(|e| {
        XiphosError::invalid_config(format!("Directory {} is not writable: {e}", dir.display()))
    })?;
    fs::remove_file(&probe)?;
    Ok(())
}

impl Storage for FileStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        let file = File::open(self.file_path(name)).map_err(|e| Self::not_found(name, e))?;
        Ok(Box::new(FileInput::new(file, self.config.buffer_size)?))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.file_path(name))?;

        Ok(Box::new(FileOutput::new(file, self.config.buffer_size)))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.file_path(name).exists()
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        let path = self.file_path(name);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| XiphosError::storage(format!("Failed to delete file {name}: {e}")))?;
        }
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let path = entry?.path();
            if path.is_file() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    files.push(name.to_string());
                }
            }
        }
        files.sort();
        Ok(files)
    }

    fn file_size(&self, name: &str) -> Result<u64> {
        let metadata = self
            .file_path(name)
            .metadata()
            .map_err(|e| Self::not_found(name, e))?;
        Ok(metadata.len())
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        fs::rename(self.file_path(old_name), self.file_path(new_name)).map_err(|e| {
            XiphosError::storage(format!("Failed to rename {old_name} to {new_name}: {e}"))
        })
    }

    fn sync(&self) -> Result<()> {
        // Directory fsync makes renames durable; not every platform allows it.
        match File::open(&self.directory).and_then(|dir| dir.sync_all()) {
            Ok(()) => Ok(()),
            Err(e) => {
                debug!("Directory sync skipped for {}: {e}", self.directory.display());
                Ok(())
            }
        }
    }

    fn obtain_lock(&self, name: &str) -> Result<Box<dyn StorageLock>> {
        let path = self.file_path(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                writeln!(file, "{}", std::process::id())?;
                Ok(Box::new(FileLock {
                    name: name.to_string(),
                    path,
                    released: false,
                }))
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let holder = fs::read_to_string(&path)
                    .ok()
                    .map(|pid| pid.trim().to_string())
                    .filter(|pid| !pid.is_empty())
                    .unwrap_or_else(|| "an unknown process".to_string());
                Err(XiphosError::storage(format!(
                    "Lock {} is held by process {holder}; if that process is no longer \
                     running, delete the file and retry",
                    path.display()
                )))
            }
            Err(e) => Err(XiphosError::Io(e)),
        }
    }
}

/// A lock file created exclusively and removed on release.
#[derive(Debug)]
pub struct FileLock {
    name: String,
    path: PathBuf,
    released: bool,
}

impl StorageLock for FileLock {
    fn name(&self) -> &str {
        &self.name
    }

    fn release(&mut self) -> Result<()> {
        if !self.released {
            self.released = true;
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("Failed to release lock {}: {e}", self.path.display());
        }
    }
}

/// Buffered file input.
#[derive(Debug)]
pub struct FileInput {
    reader: BufReader<File>,
    size: u64,
}

impl FileInput {
    fn new(file: File, buffer_size: usize) -> Result<Self> {
        let size = file.metadata()?.len();
        Ok(FileInput {
            reader: BufReader::with_capacity(buffer_size, file),
            size,
        })
    }
}

impl Read for FileInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl StorageInput for FileInput {
    fn size(&self) -> Result<u64> {
        Ok(self.size)
    }
}

/// Buffered file output.
#[derive(Debug)]
pub struct FileOutput {
    writer: BufWriter<File>,
    position: u64,
    closed: bool,
}

impl FileOutput {
    fn new(file: File, buffer_size: usize) -> Self {
        FileOutput {
            writer: BufWriter::with_capacity(buffer_size, file),
            position: 0,
            closed: false,
        }
    }
}

impl Write for FileOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.writer.write(buf)?;
        self.position += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl StorageOutput for FileOutput {
    fn flush_and_sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.flush_and_sync()?;
            self.closed = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn storage(dir: &TempDir) -> FileStorage {
        FileStorage::new(dir.path(), StorageConfig::default()).unwrap()
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        let mut output = storage.create_output("seg.post").unwrap();
        output.write_all(b"postings").unwrap();
        assert_eq!(output.position(), 8);
        output.close().unwrap();

        assert!(storage.file_exists("seg.post"));
        assert_eq!(storage.file_size("seg.post").unwrap(), 8);
        assert_eq!(storage.read_file("seg.post").unwrap(), b"postings");
    }

    #[test]
    fn test_list_rename_delete() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        storage.create_output("b.tmp").unwrap().close().unwrap();
        storage.create_output("a").unwrap().close().unwrap();
        assert_eq!(storage.list_files().unwrap(), vec!["a", "b.tmp"]);

        storage.rename_file("b.tmp", "b").unwrap();
        assert_eq!(storage.list_files().unwrap(), vec!["a", "b"]);

        storage.delete_file("a").unwrap();
        storage.delete_file("missing").unwrap();
        assert_eq!(storage.list_files().unwrap(), vec!["b"]);
    }

    #[test]
    fn test_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        assert!(storage.open_input("nope").is_err());
        assert!(storage.file_size("nope").is_err());
    }

    #[test]
    fn test_lock_is_exclusive() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        let lock = storage.obtain_lock("write.lock").unwrap();
        assert_eq!(lock.name(), "write.lock");
        let message = storage.obtain_lock("write.lock").unwrap_err().to_string();
        assert!(message.contains(&format!("process {}", std::process::id())));

        drop(lock);
        assert!(!storage.file_exists("write.lock"));
        assert!(storage.obtain_lock("write.lock").is_ok());
    }

    #[test]
    fn test_ensure_writable_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a/b");
        ensure_writable_dir(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(fs::read_dir(&nested).unwrap().count(), 0);
    }
}
