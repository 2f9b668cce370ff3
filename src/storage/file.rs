//! File-backed board store.
//!
//! Saves go through a temp file and a rename so a crash mid-write never leaves a
//! half-written board behind. Concurrent savers are serialised with an advisory
//! lock on a `.lock` sibling.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::Path;

use fs2::FileExt;
use log::{debug, info};

use super::codec::{read_board, write_board};
use crate::board::Board;
use crate::errors::BoardDataError;

/// Where boards come from and go to. The engine only talks to this trait.
pub trait BoardStore: Send + Sync {
    fn load(&self, path: &Path) -> Result<Board, BoardDataError>;

    /// Persist `board`, recording `collected` baskets as already won.
    fn save(&self, path: &Path, board: &Board, collected: u32) -> Result<(), BoardDataError>;
}

/// Plain-text board files.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFileStore;

impl BoardStore for TextFileStore {
    fn load(&self, path: &Path) -> Result<Board, BoardDataError> {
        let file = File::open(path).map_err(|e| BoardDataError::load(e).at(path))?;
        let board = read_board(BufReader::new(file)).map_err(|e| e.at(path))?;
        info!(
            "Loaded {}x{} board from {} (goal {}, {} guards)",
            board.size(),
            board.size(),
            path.display(),
            board.basket_goal(),
            board.guard_count()
        );
        Ok(board)
    }

    fn save(&self, path: &Path, board: &Board, collected: u32) -> Result<(), BoardDataError> {
        let mut content = Vec::new();
        write_board(&mut content, board, collected).map_err(|e| e.at(path))?;
        write_atomic(path, &content).map_err(|e| BoardDataError::save(e).at(path))?;
        info!(
            "Saved board to {} ({} of {} baskets collected)",
            path.display(),
            collected,
            board.basket_goal()
        );
        Ok(())
    }
}

fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    write_atomic_with(path, |tmp| tmp.write_all(content))
}

/// Replace `path` with whatever `fill` writes. On any failure the temp file is
/// removed and `path` is left as it was.
fn write_atomic_with<F>(path: &Path, fill: F) -> std::io::Result<()>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let base = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("board.txt");

    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(dir.join(format!(".{base}.lock")))?;
    lock_file.lock_exclusive()?;

    let mut counter = 0u32;
    let (tmp_path, mut tmp) = loop {
        let cand = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&cand) {
            Ok(file) => break (cand, file),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
                continue;
            }
            Err(e) => return Err(e),
        }
    };
    let written = fill(&mut tmp).and_then(|()| tmp.sync_all());
    drop(tmp);
    if let Err(e) = written.and_then(|()| std::fs::rename(&tmp_path, path)) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    debug!("board file {} replaced via {}", path.display(), tmp_path.display());
    drop(lock_file);
    Ok(())
}
