//! SMB2/SMB3 probe built on the `smb` crate

use super::{share_relative, PhaseTimer, RemoteProbe};
use crate::error::{AppError, Result};
use crate::logging::ProbeLogger;
use crate::models::{Config, Timed};
use crate::types::{ProbeOperation, ProtocolVersion};
use async_trait::async_trait;
use smb::{Client, ClientConfig, Directory, File, FileAccessMask, FileCreateArgs, GetLen, Resource, UncPath};
use std::str::FromStr;
use std::sync::Arc;

/// NT status codes a server answers with for a missing object, and their names
const NOT_FOUND_STATUSES: [(u32, &str); 2] = [
    (0xC000_0034, "ObjectNameNotFound"),
    (0xC000_003A, "ObjectPathNotFound"),
];

const SESSION_PHASE: &str = "connect and mount";
const CHECK_PHASE: &str = "check";

fn is_not_found(error: &smb::Error) -> bool {
    mentions_not_found(&format!("{} {:?}", error, error))
}

/// Whether a rendered error carries one of the not-found statuses.
///
/// The status may appear by name (`ObjectNameNotFound`,
/// `STATUS_OBJECT_NAME_NOT_FOUND`), as hex or as a decimal `u32`.
fn mentions_not_found(text: &str) -> bool {
    let folded = text.to_ascii_lowercase().replace('_', "");
    NOT_FOUND_STATUSES.iter().any(|(code, name)| {
        folded.contains(&name.to_ascii_lowercase())
            || folded.contains(&format!("{:08x}", code))
            || text.contains(&code.to_string())
    })
}

/// Handle opened on the target, kept only until teardown
enum Opened {
    File(File),
    Directory(Directory),
    Other,
}

impl Opened {
    fn describe(&self) -> &'static str {
        match self {
            Opened::File(_) => "file",
            Opened::Directory(_) => "directory",
            Opened::Other => "other",
        }
    }

    async fn close(self) -> std::result::Result<(), smb::Error> {
        match self {
            Opened::File(file) => file.close().await,
            Opened::Directory(directory) => directory.close().await,
            Opened::Other => Ok(()),
        }
    }
}

/// Probe for the current protocol family
pub struct Smb2Probe {
    logger: Arc<ProbeLogger>,
}

impl Smb2Probe {
    pub fn new(logger: Arc<ProbeLogger>) -> Self {
        Self { logger }
    }

    fn error(&self, operation: ProbeOperation, message: String) -> AppError {
        AppError::probe(ProtocolVersion::V2_3, operation, message)
    }

    /// Create a client and mount the share
    async fn open_session(&self, config: &Config, operation: ProbeOperation) -> Result<(Client, UncPath)> {
        let share_unc = config.share_unc();
        let share = UncPath::from_str(&share_unc)
            .map_err(|e| self.error(operation, format!("invalid share path {}: {}", share_unc, e)))?;

        let client = Client::new(ClientConfig::default());
        if let Err(e) = client
            .share_connect(&share, &config.principal(), config.password.clone())
            .await
        {
            self.close_client(client, operation).await;
            return Err(self.error(
                operation,
                format!("failed to connect to {} as {}: {}", share_unc, config.principal(), e),
            ));
        }

        Ok((client, share))
    }

    /// Open `target` read-only and classify what the handle points at
    async fn open_target(
        &self,
        client: &Client,
        share: &UncPath,
        target: &str,
    ) -> std::result::Result<Opened, smb::Error> {
        let path = share.clone().with_path(&share_relative(target, '\\'));
        let args = FileCreateArgs::make_open_existing(FileAccessMask::new().with_generic_read(true));
        let resource = client.create_file(&path, &args).await?;

        let opened = match resource {
            Resource::File(file) => Opened::File(file),
            Resource::Directory(directory) => Opened::Directory(directory),
            _ => Opened::Other,
        };
        Ok(opened)
    }

    async fn close_client(&self, client: Client, operation: ProbeOperation) {
        if let Err(e) = client.close().await {
            self.logger
                .log_teardown_failure(operation, "client", &e.to_string())
                .await;
        }
    }

    /// Release the handle and then the client; failures are only logged
    async fn teardown(&self, client: Client, opened: Option<Opened>, operation: ProbeOperation) {
        if let Some(opened) = opened {
            let kind = opened.describe();
            if let Err(e) = opened.close().await {
                self.logger
                    .log_teardown_failure(operation, kind, &e.to_string())
                    .await;
            }
        }
        self.close_client(client, operation).await;
    }

    /// Shared flow of the two boolean checks
    async fn check_kind(
        &self,
        config: &Config,
        operation: ProbeOperation,
        target: &str,
        accept: fn(&Opened) -> bool,
    ) -> Result<Timed<bool>> {
        self.logger
            .log_operation_start(self.family(), operation, target)
            .await;

        let mut timer = PhaseTimer::start(operation);
        let (client, share) = self.open_session(config, operation).await?;
        timer.mark(SESSION_PHASE);
        let outcome = self.open_target(&client, &share, target).await;
        timer.mark(CHECK_PHASE);

        let (result, opened) = match outcome {
            Ok(opened) => (Ok(accept(&opened)), Some(opened)),
            Err(e) if is_not_found(&e) => (Ok(false), None),
            Err(e) => (
                Err(self.error(operation, format!("failed to open {}: {}", target, e))),
                None,
            ),
        };
        self.teardown(client, opened, operation).await;

        let found = result?;
        let timed = timer.finish(found);
        timer.log_phases(&self.logger).await;
        self.logger
            .log_operation_end(operation, timed.elapsed_ms(), &found.to_string())
            .await;
        Ok(timed)
    }
}

#[async_trait]
impl RemoteProbe for Smb2Probe {
    fn family(&self) -> ProtocolVersion {
        ProtocolVersion::V2_3
    }

    async fn exists(&self, config: &Config) -> Result<Timed<bool>> {
        self.check_kind(config, ProbeOperation::Exists, &config.file_name, |opened| {
            matches!(opened, Opened::File(_) | Opened::Directory(_))
        })
        .await
    }

    async fn is_directory(&self, config: &Config) -> Result<Timed<bool>> {
        self.check_kind(config, ProbeOperation::IsDirectory, &config.dir_name, |opened| {
            matches!(opened, Opened::Directory(_))
        })
        .await
    }

    async fn length(&self, config: &Config) -> Result<Timed<u64>> {
        let operation = ProbeOperation::Length;
        let target = config.file_name.as_str();
        self.logger
            .log_operation_start(self.family(), operation, target)
            .await;

        let mut timer = PhaseTimer::start(operation);
        let (client, share) = self.open_session(config, operation).await?;
        timer.mark(SESSION_PHASE);

        let (result, opened) = match self.open_target(&client, &share, target).await {
            Ok(Opened::File(file)) => {
                let len = file
                    .get_len()
                    .await
                    .map_err(|e| self.error(operation, format!("failed to read size of {}: {}", target, e)));
                (len, Some(Opened::File(file)))
            }
            Ok(other) => (
                Err(self.error(operation, format!("{} is a {}, not a file", target, other.describe()))),
                Some(other),
            ),
            Err(e) => (
                Err(self.error(operation, format!("failed to open {}: {}", target, e))),
                None,
            ),
        };
        timer.mark(CHECK_PHASE);
        self.teardown(client, opened, operation).await;

        let len = result?;
        let timed = timer.finish(len);
        timer.log_phases(&self.logger).await;
        self.logger
            .log_operation_end(operation, timed.elapsed_ms(), &format!("{} bytes", len))
            .await;
        Ok(timed)
    }
}
