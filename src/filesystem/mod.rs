//! Local and remote filesystem access.

pub mod dir_walker;
#[cfg(test)]
pub(crate) mod memory;
pub mod remote;
pub mod sftp;
pub mod tree;

pub use dir_walker::{FileEntry, walk_local_files, walk_remote_dirs, walk_remote_files};
pub use remote::{
    RemoteEntry, RemoteFs, RemoteMetadata, ensure_remote_dirs, is_pseudo_entry, join_remote,
    parent_remote, read_text_if_file, remove_path,
};
pub use sftp::SftpRemote;
pub use tree::{DirectoryGroup, group_by_directory};
