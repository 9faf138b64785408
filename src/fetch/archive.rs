//! Archive extraction
//!
//! The archive kind comes from the file name alone:
//!
//! ```text
//! *.zip, *.whl, *.nupkg   → ZIP
//! anything else           → tar, plain or gzip/bzip2/xz compressed
//! ```
//!
//! A file whose suffix lies about its content fails to open instead of being
//! unpacked as something else.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use tar::Archive;
use xz2::read::XzDecoder;
use zip::ZipArchive;

use crate::error::UfetchError;

const ZIP_SUFFIXES: &[&str] = &[".zip", ".whl", ".nupkg"];
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";
const XZ_MAGIC: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];

/// Compression wrapped around a tar stream, detected from its first bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TarCompression {
    None,
    Gzip,
    Bzip2,
    Xz,
}

impl TarCompression {
    pub fn sniff(head: &[u8]) -> Self {
        if head.starts_with(GZIP_MAGIC) {
            TarCompression::Gzip
        } else if head.starts_with(BZIP2_MAGIC) {
            TarCompression::Bzip2
        } else if head.starts_with(XZ_MAGIC) {
            TarCompression::Xz
        } else {
            TarCompression::None
        }
    }
}

/// Container format of a downloaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
}

impl ArchiveKind {
    pub fn label(self) -> &'static str {
        match self {
            ArchiveKind::Zip => "ZIP",
            ArchiveKind::Tar => "tar",
        }
    }

    /// Infer the kind from the file name suffix
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if ZIP_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            ArchiveKind::Zip
        } else {
            ArchiveKind::Tar
        }
    }
}

/// What an extraction produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    pub kind: ArchiveKind,
    /// Regular files written
    pub files: usize,
}

/// Unpack `archive` into `dest`, creating `dest` if needed.
///
/// There is no rollback: a failure part way through leaves whatever was
/// already written in place.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<ExtractSummary, UfetchError> {
    let kind = ArchiveKind::from_path(archive);
    println!("Extracting {} archive to: {}", kind.label(), dest.display());

    std::fs::create_dir_all(dest)
        .map_err(|e| UfetchError::io(dest, "Failed to create directory", e))?;

    let files = match kind {
        ArchiveKind::Zip => extract_zip(archive, dest)?,
        ArchiveKind::Tar => extract_tar(archive, dest)?,
    };

    println!("Extraction complete ({} files)\n", files);

    Ok(ExtractSummary { kind, files })
}

fn extract_zip(archive_path: &Path, dest: &Path) -> Result<usize, UfetchError> {
    let file = File::open(archive_path)
        .map_err(|e| UfetchError::io(archive_path, "Failed to open archive", e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| {
        UfetchError::archive(archive_path, "not a valid ZIP archive", Some(e.into()))
    })?;

    let mut files = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| {
            UfetchError::archive(archive_path, format!("corrupt entry #{}", i), Some(e.into()))
        })?;

        // Entries with absolute paths or `..` components are skipped
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)
                .map_err(|e| UfetchError::io(&outpath, "Failed to create directory", e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| UfetchError::io(parent, "Failed to create directory", e))?;
        }

        let mut outfile = File::create(&outpath)
            .map_err(|e| UfetchError::io(&outpath, "Failed to create file", e))?;
        std::io::copy(&mut entry, &mut outfile).map_err(|e| {
            UfetchError::archive(
                archive_path,
                format!("failed to unpack {}", outpath.display()),
                Some(e.into()),
            )
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                    .map_err(|e| UfetchError::io(&outpath, "Failed to set permissions", e))?;
            }
        }

        files += 1;
    }

    Ok(files)
}

fn extract_tar(archive_path: &Path, dest: &Path) -> Result<usize, UfetchError> {
    let file = File::open(archive_path)
        .map_err(|e| UfetchError::io(archive_path, "Failed to open archive", e))?;
    let mut reader = BufReader::new(file);

    let compression = TarCompression::sniff(
        reader
            .fill_buf()
            .map_err(|e| UfetchError::io(archive_path, "Failed to read archive", e))?,
    );

    let stream: Box<dyn Read> = match compression {
        TarCompression::Gzip => Box::new(GzDecoder::new(reader)),
        TarCompression::Bzip2 => Box::new(BzDecoder::new(reader)),
        TarCompression::Xz => Box::new(XzDecoder::new(reader)),
        TarCompression::None => Box::new(reader),
    };

    let mut archive = Archive::new(stream);
    let entries = archive.entries().map_err(|e| {
        UfetchError::archive(archive_path, "not a valid tar stream", Some(e.into()))
    })?;

    let mut seen = 0;
    let mut files = 0;
    for entry in entries {
        let mut entry = entry.map_err(|e| {
            UfetchError::archive(archive_path, "not a valid tar stream", Some(e.into()))
        })?;
        seen += 1;

        let is_file = entry.header().entry_type().is_file();
        // `unpack_in` refuses paths that would land outside `dest`
        let unpacked = entry.unpack_in(dest).map_err(|e| {
            UfetchError::archive(archive_path, "failed to unpack entry", Some(e.into()))
        })?;

        if unpacked && is_file {
            files += 1;
        }
    }

    if seen == 0 {
        return Err(UfetchError::archive(
            archive_path,
            "archive contains no entries",
            None,
        ));
    }

    Ok(files)
}
