//! Deployment archive writer
//!
//! Packs every transfer into one gzip-compressed tar whose entry names are
//! the absolute remote destinations without the leading `/`. Entries are
//! owned by uid/gid 0; local ownership never reaches the remote host.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, Write};
use tempfile::NamedTempFile;

use crate::domain::value_objects::FileTransfer;

/// Write the archive for `files` to a fresh temporary file.
pub fn build_archive(files: &[FileTransfer]) -> io::Result<NamedTempFile> {
    let temp = tempfile::Builder::new()
        .prefix("scd_conf")
        .suffix(".tar.gz")
        .tempfile()?;
    write_archive(temp.as_file().try_clone()?, files)?;
    tracing::debug!(path = %temp.path().display(), entries = files.len(), "built deployment archive");
    Ok(temp)
}

fn write_archive(file: File, files: &[FileTransfer]) -> io::Result<()> {
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for transfer in files {
        append_transfer(&mut builder, transfer).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("could not add {} to the archive: {}", transfer.source.display(), e),
            )
        })?;
    }

    builder.into_inner()?.finish()?;
    Ok(())
}

/// Append one source, keeping its mode and mtime but not its owner.
/// Symlinked sources ship their target's content.
fn append_transfer<W: Write>(
    builder: &mut tar::Builder<W>,
    transfer: &FileTransfer,
) -> io::Result<()> {
    let mut source = File::open(&transfer.source)?;
    let metadata = source.metadata()?;

    let mut header = tar::Header::new_gnu();
    header.set_metadata_in_mode(&metadata, tar::HeaderMode::Complete);
    header.set_uid(0);
    header.set_gid(0);
    header.set_username("root")?;
    header.set_groupname("root")?;

    builder.append_data(&mut header, transfer.archive_name(), &mut source)
}
