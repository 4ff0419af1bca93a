//! Legacy SMB1 probe.
//!
//! Backed by `pavao` (libsmbclient) when the `smb1` feature is enabled.
//! libsmbclient is blocking, so each call runs on the blocking thread pool
//! with its own client, which is dropped before the result is returned.

use super::{share_relative, RemoteProbe};
use crate::error::{AppError, Result};
use crate::logging::ProbeLogger;
use crate::models::{Config, Timed};
use crate::types::{ProbeOperation, ProtocolVersion};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// What a legacy check should report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    Exists,
    IsDirectory,
    Length,
}

/// Value of a finished legacy check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Flag(bool),
    Size(u64),
}

/// Outcome of one blocking call: the answer and its phases
struct LegacyRun {
    answer: std::result::Result<Answer, String>,
    phases: Vec<(&'static str, Duration)>,
    elapsed: Duration,
}

/// Connection settings copied out of the config for the blocking task
#[derive(Debug, Clone)]
struct LegacyTarget {
    server: String,
    share: String,
    username: String,
    password: String,
    path: String,
}

impl LegacyTarget {
    fn new(config: &Config, target: &str) -> anyhow::Result<Self> {
        let url = Url::parse(&format!("smb://{}", config.server_address))
            .with_context(|| format!("invalid server address '{}'", config.server_address))?;
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| anyhow!("no host in server address '{}'", config.server_address))?;
        let server = match url.port() {
            Some(port) => format!("smb://{}:{}", host, port),
            None => format!("smb://{}", host),
        };

        Ok(Self {
            server,
            share: format!("/{}", config.share_name.trim_matches(['/', '\\'])),
            username: config.username.clone(),
            password: config.password.clone(),
            path: format!("/{}", share_relative(target, '/')),
        })
    }
}

/// Probe for the legacy protocol family
pub struct Smb1Probe {
    logger: Arc<ProbeLogger>,
}

impl Smb1Probe {
    pub fn new(logger: Arc<ProbeLogger>) -> Self {
        Self { logger }
    }

    /// Whether legacy support was compiled in
    pub fn is_available() -> bool {
        cfg!(feature = "smb1")
    }

    fn error(&self, operation: ProbeOperation, message: String) -> AppError {
        AppError::probe(ProtocolVersion::V1, operation, message)
    }

    async fn run(&self, config: &Config, operation: ProbeOperation, target: &str, check: Check) -> Result<Timed<Answer>> {
        self.logger
            .log_operation_start(self.family(), operation, target)
            .await;

        let legacy = LegacyTarget::new(config, target).map_err(|e| self.error(operation, format!("{:#}", e)))?;
        let run = tokio::task::spawn_blocking(move || backend::run(&legacy, check))
            .await
            .context("blocking worker did not finish")
            .map_err(|e| self.error(operation, format!("{:#}", e)))?;

        for (name, duration) in &run.phases {
            self.logger.log_phase(operation, name, *duration).await;
        }

        let answer = run.answer.map_err(|message| self.error(operation, message))?;
        let timed = Timed::new(answer, run.elapsed);
        let outcome = match answer {
            Answer::Flag(flag) => flag.to_string(),
            Answer::Size(size) => format!("{} bytes", size),
        };
        self.logger
            .log_operation_end(operation, timed.elapsed_ms(), &outcome)
            .await;
        Ok(timed)
    }

    async fn run_flag(&self, config: &Config, operation: ProbeOperation, target: &str, check: Check) -> Result<Timed<bool>> {
        let timed = self.run(config, operation, target, check).await?;
        match timed.value {
            Answer::Flag(flag) => Ok(Timed::new(flag, timed.elapsed)),
            Answer::Size(_) => Err(AppError::internal("SMB1 check returned a size where a flag was expected")),
        }
    }
}

#[async_trait]
impl RemoteProbe for Smb1Probe {
    fn family(&self) -> ProtocolVersion {
        ProtocolVersion::V1
    }

    async fn exists(&self, config: &Config) -> Result<Timed<bool>> {
        self.run_flag(config, ProbeOperation::Exists, &config.file_name, Check::Exists)
            .await
    }

    async fn is_directory(&self, config: &Config) -> Result<Timed<bool>> {
        self.run_flag(config, ProbeOperation::IsDirectory, &config.dir_name, Check::IsDirectory)
            .await
    }

    async fn length(&self, config: &Config) -> Result<Timed<u64>> {
        let timed = self
            .run(config, ProbeOperation::Length, &config.file_name, Check::Length)
            .await?;
        match timed.value {
            Answer::Size(size) => Ok(Timed::new(size, timed.elapsed)),
            Answer::Flag(_) => Err(AppError::internal("SMB1 length check returned a flag")),
        }
    }
}

#[cfg(feature = "smb1")]
mod backend {
    use super::{Answer, Check, LegacyRun, LegacyTarget};
    use crate::probe::PhaseTimer;
    use crate::types::ProbeOperation;
    use pavao::{SmbClient, SmbCredentials, SmbError, SmbOptions};
    use std::io::ErrorKind;

    fn is_missing(error: &SmbError) -> bool {
        matches!(error, SmbError::Io(io) if io.kind() == ErrorKind::NotFound)
    }

    fn is_not_directory(error: &SmbError) -> bool {
        matches!(error, SmbError::Io(io) if io.kind() == ErrorKind::NotADirectory)
    }

    pub(super) fn run(target: &LegacyTarget, check: Check) -> LegacyRun {
        let operation = match check {
            Check::Exists => ProbeOperation::Exists,
            Check::IsDirectory => ProbeOperation::IsDirectory,
            Check::Length => ProbeOperation::Length,
        };
        let mut timer = PhaseTimer::start(operation);

        let credentials = SmbCredentials::default()
            .server(&target.server)
            .share(&target.share)
            .username(&target.username)
            .password(&target.password)
            .workgroup("");

        let client = match SmbClient::new(credentials, SmbOptions::default()) {
            Ok(client) => client,
            Err(e) => {
                timer.mark("client setup");
                return LegacyRun {
                    answer: Err(format!("failed to create client for {}{}: {}", target.server, target.share, e)),
                    phases: timer.phases().to_vec(),
                    elapsed: timer.elapsed(),
                };
            }
        };
        timer.mark("client setup");

        let answer = match check {
            Check::Exists => match client.stat(&target.path) {
                Ok(_) => Ok(Answer::Flag(true)),
                Err(e) if is_missing(&e) => Ok(Answer::Flag(false)),
                Err(e) => Err(format!("failed to stat {}: {}", target.path, e)),
            },
            Check::IsDirectory => match client.list_dir(&target.path) {
                Ok(_) => Ok(Answer::Flag(true)),
                Err(e) if is_missing(&e) || is_not_directory(&e) => Ok(Answer::Flag(false)),
                Err(e) => Err(format!("failed to list {}: {}", target.path, e)),
            },
            Check::Length => client
                .stat(&target.path)
                .map(|stat| Answer::Size(stat.size))
                .map_err(|e| format!("failed to stat {}: {}", target.path, e)),
        };
        timer.mark("check");

        let run = LegacyRun {
            answer,
            phases: timer.phases().to_vec(),
            elapsed: timer.elapsed(),
        };
        drop(client);
        run
    }
}

#[cfg(not(feature = "smb1"))]
mod backend {
    use super::{Check, LegacyRun, LegacyTarget};
    use std::time::Duration;

    pub(super) fn run(_target: &LegacyTarget, _check: Check) -> LegacyRun {
        LegacyRun {
            answer: Err("legacy SMB1 support not compiled in (enable feature smb1)".to_string()),
            phases: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }
}
