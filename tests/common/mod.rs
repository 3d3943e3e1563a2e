//! Shared utilities for integration tests.
//!
//! `FakeProxy` stands in for the HAProxy binary: a shell script that logs its
//! arguments, copies the config it was given, and writes a fresh pid to the
//! `-p` file the way a daemonizing proxy would.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use haproxy_ingress::rules::{ListError, PathRoute, RoutingRule, RuleSet, RuleSource};
use haproxy_ingress::supervisor::{PidFile, ProcessSupervisor, ProxyCommand};

const SCRIPT: &str = r#"
echo "$@" >> "$DIR/args.log"
pidfile=""
while [ $# -gt 0 ]; do
    case "$1" in
        -p) pidfile="$2" ;;
        -f) cp "$2" "$DIR/loaded.cfg" ;;
    esac
    shift
done
if [ -e "$DIR/fail" ]; then
    echo "configuration file has errors" >&2
    exit 1
fi
if [ -e "$DIR/stuck" ]; then
    exit 0
fi
n=$(cat "$DIR/counter" 2>/dev/null || echo 4190000)
n=$((n + 1))
echo "$n" > "$DIR/counter"
echo "$n" > "$pidfile"
"#;

/// A scriptable stand-in for the proxy binary.
pub struct FakeProxy {
    dir: TempDir,
}

impl FakeProxy {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let script = format!("DIR='{}'\n{}", dir.path().display(), SCRIPT);
        fs::write(dir.path().join("proxy.sh"), script).unwrap();
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn script(&self) -> PathBuf {
        self.dir().join("proxy.sh")
    }

    pub fn pid_file(&self) -> PathBuf {
        self.dir().join("haproxy.pid")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir().join("haproxy.cfg")
    }

    /// Make later invocations exit without writing a pid.
    pub fn make_stuck(&self) {
        fs::write(self.dir().join("stuck"), "").unwrap();
    }

    /// Make later invocations exit non-zero.
    pub fn make_failing(&self) {
        fs::write(self.dir().join("fail"), "").unwrap();
    }

    pub fn write_pid(&self, content: &str) {
        fs::write(self.pid_file(), content).unwrap();
    }

    pub fn read_pid(&self) -> String {
        fs::read_to_string(self.pid_file()).unwrap_or_default().trim().to_string()
    }

    /// Arguments of every invocation, minus the leading script path.
    pub fn invocations(&self) -> Vec<Vec<String>> {
        fs::read_to_string(self.dir().join("args.log"))
            .unwrap_or_default()
            .lines()
            .map(|line| line.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    /// The config the proxy was last started with.
    pub fn loaded_config(&self) -> Option<String> {
        fs::read_to_string(self.dir().join("loaded.cfg")).ok()
    }

    pub fn command(&self) -> ProxyCommand {
        ProxyCommand::new("/bin/sh", self.pid_file())
            .with_extra_args(vec![self.script().display().to_string()])
    }

    pub fn supervisor(&self, rotation_timeout: Duration) -> ProcessSupervisor {
        ProcessSupervisor::new(self.command(), PidFile::new(self.pid_file()))
            .with_poll_interval(Duration::from_millis(10))
            .with_rotation_timeout(rotation_timeout)
    }
}

/// A rule source replaying queued responses, then repeating the last one.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    responses: Arc<Mutex<VecDeque<Result<RuleSet, String>>>>,
    last: Arc<Mutex<Option<RuleSet>>>,
    calls: Arc<Mutex<usize>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, rules: RuleSet) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(rules));
        self
    }

    pub fn push_err(&self, message: &str) -> &Self {
        self.responses.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl RuleSource for ScriptedSource {
    async fn list(&self) -> Result<RuleSet, ListError> {
        *self.calls.lock().unwrap() += 1;
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(rules)) => {
                *self.last.lock().unwrap() = Some(rules.clone());
                Ok(rules)
            }
            Some(Err(message)) => Err(ListError::Other(message)),
            None => Ok(self.last.lock().unwrap().clone().unwrap_or_default()),
        }
    }
}

pub fn foo_rules() -> RuleSet {
    RuleSet::new(vec![RoutingRule::new(
        "default",
        "foo",
        vec![PathRoute::new("/", "foo", 3000)],
    )])
}

pub fn foo_bar_rules() -> RuleSet {
    RuleSet::new(vec![
        RoutingRule::new("default", "foo", vec![PathRoute::new("/", "foo", 3000)]),
        RoutingRule::new("default", "bar", vec![PathRoute::new("/my/path", "bar", 9000)]),
    ])
}
