use async_zip::base::write::ZipFileWriter;
use async_zip::error::ZipError;
use async_zip::{Compression, ZipEntryBuilder};
use futures::AsyncWriteExt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::warn;

/// Copy buffer for archive entries. Entries are stored rather than
/// compressed: the sources are binary data of unknown compressibility and
/// the archive is built inline with the response.
const COPY_BUFFER_SIZE: usize = 1024 * 1024;

/// Outcome of one archive run: which requested files made it in, and which
/// were dropped. Callers decide whether skips are worth reporting.
#[derive(Debug, Default)]
pub struct ArchiveSummary {
    pub written: Vec<String>,
    pub skipped: Vec<String>,
}

/// Stream a ZIP archive of `files` (resolved path, entry name) into
/// `writer`, in the order given. A file that cannot be statted, opened, or
/// copied is skipped and the archive keeps going; only a failure of the
/// archive stream itself aborts.
pub async fn write_zip<W>(writer: W, files: Vec<(PathBuf, String)>) -> Result<ArchiveSummary, ZipError>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut zip = ZipFileWriter::with_tokio(writer);
    let mut summary = ArchiveSummary::default();
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];

    for (path, name) in files {
        match append_entry(&mut zip, &path, &name, &mut buf).await {
            Ok(()) => summary.written.push(name),
            Err(err) => {
                warn!(file = %name, error = %err, "skipping archive entry");
                summary.skipped.push(name);
            }
        }
    }

    zip.close().await?;
    Ok(summary)
}

async fn append_entry<W>(
    zip: &mut ZipFileWriter<W>,
    path: &Path,
    name: &str,
    buf: &mut [u8],
) -> std::io::Result<()>
where
    W: futures::AsyncWrite + Unpin,
{
    let meta = fs::metadata(path).await?;
    if meta.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "is a directory",
        ));
    }

    let mut file = fs::File::open(path).await?;

    let opts = ZipEntryBuilder::new(name.to_string().into(), Compression::Stored);
    let mut entry = zip
        .write_entry_stream(opts)
        .await
        .map_err(std::io::Error::other)?;

    loop {
        let n = file.read(buf).await?;
        if n == 0 {
            break;
        }
        entry.write_all(&buf[..n]).await?;
    }

    entry.close().await.map_err(std::io::Error::other)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Read;
    use tempfile::tempdir;

    async fn collect_zip(files: Vec<(PathBuf, String)>) -> (ArchiveSummary, Vec<u8>) {
        let (writer, mut reader) = tokio::io::duplex(64 * 1024);
        let task = tokio::spawn(write_zip(writer, files));

        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await.unwrap();
        let summary = task.await.unwrap().unwrap();
        (summary, bytes)
    }

    #[tokio::test]
    async fn test_write_zip_preserves_order_and_content() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join("first.bin"), b"first contents").unwrap();
        std::fs::write(tmp.path().join("second.bin"), b"second contents").unwrap();

        let files = vec![
            (tmp.path().join("first.bin"), "first.bin".to_string()),
            (tmp.path().join("second.bin"), "second.bin".to_string()),
        ];
        let (summary, bytes) = collect_zip(files).await;

        assert_eq!(summary.written, vec!["first.bin", "second.bin"]);
        assert!(summary.skipped.is_empty());

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut contents = String::new();
        let mut entry = archive.by_index(0).unwrap();
        assert_eq!(entry.name(), "first.bin");
        assert_eq!(entry.compression(), zip::CompressionMethod::Stored);
        entry.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "first contents");
        drop(entry);

        contents.clear();
        let mut entry = archive.by_index(1).unwrap();
        assert_eq!(entry.name(), "second.bin");
        entry.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "second contents");
    }

    #[tokio::test]
    async fn test_write_zip_skips_missing_and_dirs() {
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join("keep.txt"), b"keep").unwrap();
        std::fs::create_dir(tmp.path().join("dir")).unwrap();

        let files = vec![
            (tmp.path().join("gone.txt"), "gone.txt".to_string()),
            (tmp.path().join("keep.txt"), "keep.txt".to_string()),
            (tmp.path().join("dir"), "dir".to_string()),
        ];
        let (summary, bytes) = collect_zip(files).await;

        assert_eq!(summary.written, vec!["keep.txt"]);
        assert_eq!(summary.skipped, vec!["gone.txt", "dir"]);

        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 1);
    }
}
