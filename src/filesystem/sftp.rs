//! SFTP remote endpoint over `russh` and `russh_sftp`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client;
use russh::keys::ssh_key;
use russh::Disconnect;
use russh_sftp::client::SftpSession;
use russh_sftp::protocol::FileAttributes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, error, info};

use super::remote::{RemoteEntry, RemoteFs, RemoteMetadata, join_remote};
use crate::config::SftpProfile;
use crate::error::{AppError, Result};

const CHUNK_SIZE: usize = 32 * 1024;

struct SftpHandler;

impl client::Handler for SftpHandler {
    type Error = AppError;

    async fn check_server_key(
        &mut self,
        _server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        Ok(true)
    }
}

/// One authenticated SFTP session. Created disconnected; [`RemoteFs::connect`]
/// opens the SSH transport and the `sftp` subsystem.
pub struct SftpRemote {
    profile: SftpProfile,
    handle: Option<client::Handle<SftpHandler>>,
    sftp: Option<SftpSession>,
}

impl SftpRemote {
    pub fn new(profile: SftpProfile) -> Self {
        Self {
            profile,
            handle: None,
            sftp: None,
        }
    }

    fn session(&self) -> Result<&SftpSession> {
        self.sftp.as_ref().ok_or(AppError::ConnectionLost)
    }
}

#[async_trait]
impl RemoteFs for SftpRemote {
    async fn connect(&mut self) -> Result<()> {
        let config = Arc::new(client::Config {
            keepalive_interval: Some(Duration::from_secs(30)),
            ..Default::default()
        });

        let address = (self.profile.host.as_str(), self.profile.port);
        let mut handle = client::connect(config, address, SftpHandler).await?;

        let auth_result = handle
            .authenticate_password(&self.profile.user_name, &self.profile.password)
            .await?;
        if !auth_result.success() {
            return Err(AppError::AuthenticationError(format!(
                "Password authentication failed for {}@{}",
                self.profile.user_name, self.profile.host
            )));
        }

        let channel = handle.channel_open_session().await?;
        channel.request_subsystem(true, "sftp").await?;
        let sftp = SftpSession::new(channel.into_stream()).await.map_err(|e| {
            error!("SFTP session creation failed: {}", e);
            AppError::SshConnectionError(format!("SFTP session creation failed: {e}"))
        })?;

        info!("SFTP session established with {}", self.profile.host_port());
        self.handle = Some(handle);
        self.sftp = Some(sftp);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(sftp) = self.sftp.take() {
            let _ = sftp.close().await;
        }
        if let Some(handle) = self.handle.take() {
            handle
                .disconnect(Disconnect::ByApplication, "", "en")
                .await?;
        }
        debug!("SFTP session to {} closed", self.profile.host_port());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.sftp.is_some() && self.handle.as_ref().is_some_and(|h| !h.is_closed())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.session()?.try_exists(path).await?)
    }

    async fn stat(&self, path: &str) -> Result<RemoteMetadata> {
        let metadata = self.session()?.metadata(path).await?;
        Ok(RemoteMetadata {
            len: metadata.len(),
            is_dir: metadata.is_dir(),
        })
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>> {
        debug!("SFTP read_dir: {}", path);
        let read_dir = self.session()?.read_dir(path).await.map_err(|e| {
            error!("SFTP read_dir failed for '{}': {}", path, e);
            e
        })?;

        let entries: Vec<RemoteEntry> = read_dir
            .map(|entry| {
                let name = entry.file_name();
                let metadata = entry.metadata();
                RemoteEntry {
                    path: join_remote(path, &name),
                    name,
                    len: metadata.size.unwrap_or(0),
                    is_dir: entry.file_type().is_dir(),
                }
            })
            .collect();

        debug!("SFTP read_dir completed for '{}': {} entries", path, entries.len());
        Ok(entries)
    }

    async fn read_to_string(&self, path: &str) -> Result<String> {
        let bytes = self.session()?.read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn upload(
        &self,
        source: &mut (dyn AsyncRead + Unpin + Send),
        remote_path: &str,
        on_written: &(dyn Fn(u64) + Send + Sync),
    ) -> Result<u64> {
        let mut remote_file = self.session()?.create(remote_path).await?;

        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut transferred = 0u64;
        loop {
            let bytes_read = source.read(&mut buffer).await?;
            if bytes_read == 0 {
                break;
            }
            remote_file.write_all(&buffer[..bytes_read]).await?;
            transferred += bytes_read as u64;
            on_written(transferred);
        }
        remote_file.flush().await?;
        remote_file.shutdown().await?;

        debug!("Uploaded {} bytes to {}", transferred, remote_path);
        Ok(transferred)
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        debug!("SFTP deleting file: {}", path);
        Ok(self.session()?.remove_file(path).await?)
    }

    async fn remove_dir(&self, path: &str) -> Result<()> {
        debug!("SFTP deleting directory: {}", path);
        Ok(self.session()?.remove_dir(path).await?)
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        Ok(self.session()?.create_dir(path).await?)
    }

    async fn set_permissions(&self, path: &str, mode: u32) -> Result<()> {
        let mut attributes = FileAttributes::empty();
        attributes.permissions = Some(mode);
        Ok(self.session()?.set_metadata(path, attributes).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_disconnected() {
        let remote = SftpRemote::new(SftpProfile::new("127.0.0.1", 2222, "dockeruser", "dockerpass"));
        assert!(!remote.is_connected());
    }

    #[tokio::test]
    #[ignore = "requires a running ssh server"]
    async fn test_connect_docker() {
        let mut remote =
            SftpRemote::new(SftpProfile::new("127.0.0.1", 2222, "dockeruser", "dockerpass"));
        remote.connect().await.unwrap();
        assert!(remote.is_connected());
        assert!(remote.exists(".").await.unwrap());
        remote.disconnect().await.unwrap();
        assert!(!remote.is_connected());
    }
}
