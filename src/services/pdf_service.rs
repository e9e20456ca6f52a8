use std::collections::VecDeque;
use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

pub const CHUNK_SIZE: usize = 500;
pub const CHUNK_OVERLAP: usize = 50;
const SEPARATOR: &str = "\n\n";

#[derive(Debug)]
pub enum PdfError {
    IoError(io::Error),
    ExtractError(String),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::IoError(err) => write!(f, "IO error: {}", err),
            PdfError::ExtractError(msg) => write!(f, "PDF extraction error: {}", msg),
        }
    }
}

impl Error for PdfError {}

impl From<io::Error> for PdfError {
    fn from(err: io::Error) -> Self {
        PdfError::IoError(err)
    }
}

/// Finds `<dir>/<destination>.pdf`, comparing the file stem and extension
/// case-insensitively. A missing directory counts as no match.
pub fn find_matching_pdf(dir: &Path, destination: &str) -> Result<Option<PathBuf>, PdfError> {
    let wanted = destination.trim().to_lowercase();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::warn!("PDF directory {} does not exist", dir.display());
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    for entry in entries {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            continue;
        }
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_lowercase);
        if stem.as_deref() == Some(wanted.as_str()) {
            return Ok(Some(path));
        }
    }

    Ok(None)
}

/// Extracts the text of a PDF on the blocking pool.
pub async fn extract_text(path: PathBuf) -> Result<String, PdfError> {
    tokio::task::spawn_blocking(move || {
        let bytes = std::fs::read(&path)?;
        pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| PdfError::ExtractError(format!("{}: {}", path.display(), e)))
    })
    .await
    .map_err(|e| PdfError::ExtractError(format!("extraction task failed: {}", e)))?
}

/// Splits text on a separator and merges the pieces into chunks of at most
/// `chunk_size` characters, carrying up to `chunk_overlap` characters of
/// trailing pieces into the next chunk. A single piece longer than
/// `chunk_size` becomes its own oversized chunk.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separator: String,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(CHUNK_SIZE, CHUNK_OVERLAP)
    }
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separator: SEPARATOR.to_string(),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let pieces: Vec<&str> = text
            .split(self.separator.as_str())
            .filter(|piece| !piece.is_empty())
            .collect();
        self.merge(&pieces)
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let separator_len = self.separator.chars().count();
        let mut chunks = Vec::new();
        let mut current: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = piece.chars().count();
            let joined_len = total + len + if current.is_empty() { 0 } else { separator_len };

            if joined_len > self.chunk_size {
                if total > self.chunk_size {
                    log::warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total,
                        self.chunk_size
                    );
                }
                if !current.is_empty() {
                    self.push_chunk(&mut chunks, &current);

                    while total > self.chunk_overlap
                        || (total + len + if current.is_empty() { 0 } else { separator_len }
                            > self.chunk_size
                            && total > 0)
                    {
                        let Some((_, removed)) = current.pop_front() else {
                            break;
                        };
                        total -= removed + if current.is_empty() { 0 } else { separator_len };
                    }
                }
            }

            current.push_back((piece, len));
            total += len + if current.len() > 1 { separator_len } else { 0 };
        }

        if !current.is_empty() {
            self.push_chunk(&mut chunks, &current);
        }
        chunks
    }

    fn push_chunk(&self, chunks: &mut Vec<String>, current: &VecDeque<(&str, usize)>) {
        let joined = current
            .iter()
            .map(|(piece, _)| *piece)
            .collect::<Vec<_>>()
            .join(&self.separator);
        let trimmed = joined.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = TextSplitter::default();
        let chunks = splitter.split("Lisbon is hilly.\n\nTake the tram.");
        assert_eq!(chunks, vec!["Lisbon is hilly.\n\nTake the tram.".to_string()]);
    }

    #[test]
    fn test_chunks_respect_size_and_overlap() {
        let splitter = TextSplitter::new(10, 4);
        let chunks = splitter.split("aaaa\n\nbbbb\n\ncccc\n\ndddd");

        assert_eq!(
            chunks,
            vec![
                "aaaa\n\nbbbb".to_string(),
                "bbbb\n\ncccc".to_string(),
                "cccc\n\ndddd".to_string(),
            ]
        );
    }

    #[test]
    fn test_oversized_piece_kept_whole() {
        let splitter = TextSplitter::new(5, 0);
        let chunks = splitter.split("abcdefgh\n\nxy");
        assert_eq!(chunks, vec!["abcdefgh".to_string(), "xy".to_string()]);
    }

    #[test]
    fn test_blank_pieces_dropped() {
        let splitter = TextSplitter::new(10, 0);
        assert!(splitter.split("\n\n\n\n").is_empty());
        assert!(splitter.split("").is_empty());
    }

    #[test]
    fn test_find_matching_pdf_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("Lisbon.PDF")).unwrap();
        File::create(dir.path().join("rome.txt")).unwrap();

        let found = find_matching_pdf(dir.path(), "  lisbon ").unwrap();
        assert_eq!(found, Some(dir.path().join("Lisbon.PDF")));

        assert_eq!(find_matching_pdf(dir.path(), "rome").unwrap(), None);
        assert_eq!(find_matching_pdf(dir.path(), "lis").unwrap(), None);
    }

    #[test]
    fn test_missing_directory_is_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(find_matching_pdf(&missing, "lisbon").unwrap(), None);
    }
}
