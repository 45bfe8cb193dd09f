//! File-backed activity log repository.

use super::ActivityLogRepository;
use log::debug;
use std::fs::{self, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Append-only line-delimited UTF-8 file.
#[derive(Debug, Clone)]
pub struct FileActivityLogRepository {
    path: PathBuf,
}

impl FileActivityLogRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn ensure_parent_dir(&self) -> io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

impl ActivityLogRepository for FileActivityLogRepository {
    fn append_line(&self, line: &str) -> io::Result<()> {
        if line.contains('\n') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "log line must not contain a raw newline",
            ));
        }
        self.ensure_parent_dir()?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        let mut record = String::with_capacity(line.len() + 2);
        // A torn or hand-edited tail must not swallow the next record.
        if ends_without_newline(&mut file)? {
            record.push('\n');
        }
        record.push_str(line);
        record.push('\n');
        file.write_all(record.as_bytes())?;
        debug!(
            "event=line_appended module=repo status=ok bytes={} path={}",
            record.len(),
            self.path.display()
        );
        Ok(())
    }

    fn read_lines(&self) -> io::Result<Vec<String>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        // Invalid UTF-8 only spoils the affected line, which the codec then skips.
        let content = String::from_utf8_lossy(&bytes);
        Ok(content.lines().map(str::to_string).collect())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

fn ends_without_newline(file: &mut fs::File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
