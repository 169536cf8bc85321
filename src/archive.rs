//! `.tar.gz` archive helpers
//!
//! Archives created here hold a single top-level entry named after the
//! source file or directory, so extracting `foo.tar.gz` into `dest`
//! produces `dest/foo`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Archive, Builder};

use crate::error::{Error, Result};
use crate::files;

/// Gzip stream magic number
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

fn is_gzip(file: &mut File) -> Result<bool> {
    let mut magic = [0u8; 2];
    let read = file.read(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;
    Ok(read == 2 && magic == GZIP_MAGIC)
}

/// Extract a `.tar.gz` (or plain `.tar`) archive into `dest_dir`.
///
/// `dest_dir` is created if needed. With `remove_after` the archive is
/// deleted once extraction succeeded.
pub fn unzip_tar_gz(file: &Path, dest_dir: &Path, remove_after: bool) -> Result<()> {
    if !files::file_exists(file) {
        return Err(Error::FileNotFound(file.to_path_buf()));
    }
    files::create_path(dest_dir, false)?;

    let mut input = File::open(file)?;
    if is_gzip(&mut input)? {
        let mut archive = Archive::new(GzDecoder::new(BufReader::new(input)));
        archive.unpack(dest_dir)?;
    } else {
        tracing::debug!("{} is not gzip compressed, reading as plain tar", file.display());
        let mut archive = Archive::new(BufReader::new(input));
        archive.unpack(dest_dir)?;
    }

    tracing::info!("Extracted {} into {}", file.display(), dest_dir.display());

    if remove_after {
        files::remove_file(file)?;
    }
    Ok(())
}

fn create_tar_gz(dest_file: &Path) -> Result<Builder<GzEncoder<BufWriter<File>>>> {
    let output = File::create(dest_file)?;
    let encoder = GzEncoder::new(BufWriter::new(output), Compression::default());
    let mut builder = Builder::new(encoder);
    // Store symlinks as links; versioned shared libraries rely on them
    builder.follow_symlinks(false);
    Ok(builder)
}

fn finish_tar_gz(builder: Builder<GzEncoder<BufWriter<File>>>) -> Result<()> {
    let encoder = builder.into_inner()?;
    let mut writer = encoder.finish()?;
    std::io::Write::flush(&mut writer)?;
    Ok(())
}

/// Pack a single file into `dest_file` as gzip-compressed tar.
///
/// With `remove_after` the source file is deleted once the archive is written.
pub fn zip_file_tar_gz(file: &Path, dest_file: &Path, remove_after: bool) -> Result<()> {
    if !files::file_exists(file) {
        return Err(Error::FileNotFound(file.to_path_buf()));
    }
    let (_, name) = files::path_base_and_leaf(file);

    let mut builder = create_tar_gz(dest_file)?;
    builder.append_path_with_name(file, &name)?;
    finish_tar_gz(builder)?;

    tracing::info!("Packed {} into {}", file.display(), dest_file.display());

    if remove_after {
        files::remove_file(file)?;
    }
    Ok(())
}

/// Pack a directory tree into `dest_file` as gzip-compressed tar.
///
/// With `remove_after` the source tree is deleted once the archive is written.
pub fn zip_dir_tar_gz(source_dir: &Path, dest_file: &Path, remove_after: bool) -> Result<()> {
    if !files::dir_exists(source_dir) {
        return Err(Error::PathNotFound(source_dir.to_path_buf()));
    }
    let (_, name) = files::path_base_and_leaf(source_dir);

    let mut builder = create_tar_gz(dest_file)?;
    builder.append_dir_all(&name, source_dir)?;
    finish_tar_gz(builder)?;

    tracing::info!("Packed {} into {}", source_dir.display(), dest_file.display());

    if remove_after {
        files::remove_dir(source_dir)?;
    }
    Ok(())
}
