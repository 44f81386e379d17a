// This file is part of the terraform-provider-junos project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::{anyhow, bail, Context, Result};
use async_process::{Command, Stdio};
use async_trait::async_trait;
use futures::AsyncWriteExt;
use tracing::{debug, warn};

use crate::utils::DisplayJoinable;

use super::Session;

#[derive(Debug, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Session driving the device through local programs.
///
/// `cli` runs one operational command, given as its last argument.
/// `config` receives the statements on stdin, one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSession {
    cli: Vec<String>,
    config: Vec<String>,
}

impl LocalSession {
    pub fn new(cli: Vec<String>, config: Option<Vec<String>>) -> Result<Self> {
        if cli.is_empty() {
            bail!("`cli_command` must at least name the program to run");
        }
        let config = config
            .filter(|config| !config.is_empty())
            .unwrap_or_else(|| cli.clone());
        Ok(Self { cli, config })
    }
}

#[async_trait]
impl Session for LocalSession {
    async fn command(&self, cmd: &str) -> Result<String> {
        let res = execute(&self.cli, Some(cmd), None).await?;
        if res.status != 0 {
            bail!(
                "`{cmd}` failed with status code {}: {}",
                res.status,
                res.stderr.trim()
            );
        }
        if !res.stderr.is_empty() {
            warn!(cmd, stderr = res.stderr.trim(), "command succeeded but stderr was not empty");
        }
        Ok(res.stdout)
    }

    async fn config_set(&self, lines: &[String]) -> Result<()> {
        let input = format!("{}\n", lines.iter().join_with("\n"));
        let res = execute(&self.config, None, Some(&input)).await?;
        if res.status != 0 {
            bail!(
                "loading configuration failed with status code {}: {}",
                res.status,
                res.stderr.trim()
            );
        }
        let errors = res
            .stdout
            .lines()
            .chain(res.stderr.lines())
            .map(str::trim)
            .filter(|line| line.starts_with("error:"))
            .collect::<Vec<_>>();
        if !errors.is_empty() {
            bail!("loading configuration failed:\n{}", errors.join("\n"));
        }
        Ok(())
    }
}

async fn execute(argv: &[String], arg: Option<&str>, input: Option<&str>) -> Result<ExecutionResult> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| anyhow!("no program to run"))?;
    debug!(
        command = %argv.iter().join_with(" "),
        arg,
        stdin_bytes = input.map_or(0, str::len),
        "running local program"
    );

    let mut child = Command::new(program)
        .args(args)
        .args(arg)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to start `{program}`"))?;

    if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
        // a program exiting without reading its input is not an error by itself
        match stdin.write_all(input.as_bytes()).await {
            Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => (),
            res => res?,
        }
        drop(stdin);
    }

    let output = child
        .output()
        .await
        .with_context(|| format!("failed to wait for `{program}`"))?;

    Ok(ExecutionResult {
        status: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn config_command_defaults_to_cli() {
        let session = LocalSession::new(argv(&["cli", "-c"]), Some(vec![])).unwrap();
        assert_eq!(session.config, argv(&["cli", "-c"]));
        assert!(LocalSession::new(vec![], None).is_err());
    }

    #[tokio::test]
    async fn command_is_last_argument() {
        let session = LocalSession::new(argv(&["echo"]), None).unwrap();
        let output = session.command("show configuration system").await.unwrap();
        assert_eq!(output, "show configuration system\n");
    }

    #[tokio::test]
    async fn statements_go_to_stdin() {
        let session =
            LocalSession::new(argv(&["true"]), Some(argv(&["grep", "-q", "set system"]))).unwrap();
        session
            .config_set(&["set system host-name r1".to_owned()])
            .await
            .unwrap();
        let err = session
            .config_set(&["delete system".to_owned()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("status code 1"), "{err}");
    }

    #[tokio::test]
    async fn error_lines_fail_the_load() {
        let session =
            LocalSession::new(argv(&["true"]), Some(argv(&["sh", "-c", "cat >/dev/null; echo 'error: syntax error'"]))).unwrap();
        let err = session
            .config_set(&["set foo".to_owned()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("error: syntax error"), "{err}");
    }
}
