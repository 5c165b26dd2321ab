//! Local implementation of the runtime's background collaborators.
//!
//! Bootstrap looks for an ed25519 key in the keys directory and opens the
//! stash directory as a [`LocalClient`]. Without a key it reports
//! [`BootstrapError::MissingAuth`], which sends the controller through key
//! generation once.

use std::{io, path::PathBuf};

use ed25519_dalek::SigningKey;
use quire_app::{Backend, BootstrapError, Geometry, User};

use crate::{Config, LocalClient, markdown, ui};

/// Private key file name inside the keys directory.
pub const KEY_FILE: &str = "id_ed25519";

/// Public key file name inside the keys directory.
pub const PUBLIC_KEY_FILE: &str = "id_ed25519.pub";

/// Length of an ed25519 seed.
const SEED_LEN: usize = 32;

/// Bytes of the public key used as the user id.
const USER_ID_LEN: usize = 8;

/// Backend over the local filesystem and terminal.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    config: Config,
}

impl LocalBackend {
    /// Create a backend for the given directories.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn key_path(&self) -> PathBuf {
        self.config.keys_dir.join(KEY_FILE)
    }

    async fn load_key(&self) -> Result<SigningKey, BootstrapError> {
        let bytes = match tokio::fs::read(self.key_path()).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.key_path().display(), "no key found");
                return Err(BootstrapError::MissingAuth);
            },
            Err(e) => return Err(BootstrapError::Failed(e.to_string())),
        };
        let seed: [u8; SEED_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| BootstrapError::Failed(format!("malformed key ({} bytes)", bytes.len())))?;
        Ok(SigningKey::from_bytes(&seed))
    }

    async fn write_keys(&self, key: &SigningKey) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.config.keys_dir).await?;

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(self.key_path()).await?;
        tokio::io::AsyncWriteExt::write_all(&mut file, &key.to_bytes()).await?;
        tokio::io::AsyncWriteExt::flush(&mut file).await?;

        let public = hex::encode(key.verifying_key().to_bytes());
        tokio::fs::write(self.config.keys_dir.join(PUBLIC_KEY_FILE), public + "\n").await
    }
}

/// User derived from the key: id from the public key, name from `$USER`.
fn user_for(key: &SigningKey) -> User {
    let public = key.verifying_key().to_bytes();
    let name = std::env::var("USER").unwrap_or_else(|_| "you".to_string());
    User { id: hex::encode(&public[..USER_ID_LEN]), name }
}

impl Backend for LocalBackend {
    type Client = LocalClient;

    async fn bootstrap(&self) -> Result<Self::Client, BootstrapError> {
        let key = self.load_key().await?;
        let client = LocalClient::open(&self.config.stash_dir, Some(user_for(&key)))
            .await
            .map_err(|e| BootstrapError::Failed(e.to_string()))?;
        tracing::debug!(stash = %client.dir().display(), "client ready");
        Ok(client)
    }

    async fn generate_keys(&self) -> Result<(), String> {
        let key = SigningKey::from_bytes(&rand::random::<[u8; SEED_LEN]>());
        self.write_keys(&key).await.map_err(|e| e.to_string())?;
        tracing::debug!(dir = %self.config.keys_dir.display(), "generated ed25519 keypair");
        Ok(())
    }

    /// Terminal size minus the status footer, which the controller never
    /// draws into.
    async fn probe_geometry(&self) -> Result<Geometry, String> {
        let (width, height) = crossterm::terminal::size().map_err(|e| e.to_string())?;
        Ok(Geometry::new(width, height.saturating_sub(ui::FOOTER_HEIGHT)))
    }

    async fn render_content(&self, body: &str, width: u16) -> String {
        markdown::render(body, width)
    }
}
