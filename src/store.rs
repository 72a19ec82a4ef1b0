//! OS preference storage.
//!
//! [`PrefStore`] is the seam between reconciliation and the OS. The real
//! implementation, [`DefaultsStore`], drives the macOS `defaults` tool and
//! exchanges plists over its stdin/stdout. Tests substitute an in-memory
//! store.

use std::collections::BTreeSet;
use std::io::{Cursor, Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use tracing::{debug, info};
use wait_timeout::ChildExt;

use crate::access::{self, AccessScope};
use crate::error::DotmacosError;
use crate::prefs::PreferenceMap;
use crate::types::Section;
use crate::validate;
use crate::value::Value;

/// Read and write access to the preferences of one machine.
pub trait PrefStore {
    /// Current preferences of `domain`, or `None` if the domain does not
    /// exist. With `keys`, only those keys are returned.
    fn read(
        &self,
        section: Section,
        domain: &str,
        keys: Option<&BTreeSet<String>>,
    ) -> Result<Option<PreferenceMap>, DotmacosError>;

    /// Replace the stored preferences of `domain` with `prefs`.
    fn write(
        &mut self,
        section: Section,
        domain: &str,
        prefs: &PreferenceMap,
    ) -> Result<(), DotmacosError>;

    /// Names of every domain stored in `section`.
    fn domains(&self, section: Section) -> Result<BTreeSet<String>, DotmacosError>;
}

pub const DEFAULT_PROGRAM: &str = "defaults";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `defaults` reports a missing domain on stderr with this phrase.
const MISSING_DOMAIN: &str = "does not exist";

/// [`PrefStore`] backed by the `defaults` command line tool.
///
/// `local` commands run with `-currentHost`. Every invocation is killed once
/// `timeout` elapses.
#[derive(Debug, Clone)]
pub struct DefaultsStore {
    program: String,
    timeout: Duration,
    scope: AccessScope,
}

struct Captured {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl Captured {
    fn succeeded(&self) -> bool {
        self.status.success() && self.stderr.is_empty()
    }

    fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

impl DefaultsStore {
    pub fn new(scope: AccessScope) -> Self {
        Self {
            program: DEFAULT_PROGRAM.into(),
            timeout: DEFAULT_TIMEOUT,
            scope,
        }
    }

    /// Run a different executable in place of `defaults`.
    pub fn program(mut self, program: &str) -> Self {
        self.program = program.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn check_scope(&self, section: Section) -> Result<(), DotmacosError> {
        if self.scope.allows(section) {
            Ok(())
        } else {
            Err(DotmacosError::AccessDenied {
                section,
                uid: access::effective_uid(),
            })
        }
    }

    fn command_line(&self, section: Section, args: &[&str]) -> Vec<String> {
        let mut line = vec![self.program.clone()];
        if section == Section::Local {
            line.push("-currentHost".into());
        }
        line.extend(args.iter().map(|arg| arg.to_string()));
        line
    }

    /// Run one `defaults` command, feeding `input` on stdin if given.
    fn run(
        &self,
        section: Section,
        domain: &str,
        args: &[&str],
        input: Option<&[u8]>,
    ) -> Result<Captured, DotmacosError> {
        let line = self.command_line(section, args);
        let shown = line.join(" ");
        let fail = |reason: String| DotmacosError::StoreError {
            section,
            domain: domain.into(),
            reason,
        };
        debug!(command = %shown, "Running preference command");

        let mut child = Command::new(&line[0])
            .args(&line[1..])
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| fail(format!("'{shown}' could not be started: {e}")))?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        if let (Some(bytes), Some(mut pipe)) = (input, child.stdin.take()) {
            let written = pipe.write_all(bytes);
            drop(pipe);
            if let Err(e) = written {
                let _ = child.kill();
                let _ = child.wait();
                return Err(fail(format!("'{shown}' did not accept input: {e}")));
            }
        }

        let status = match child
            .wait_timeout(self.timeout)
            .map_err(|e| fail(format!("'{shown}' could not be awaited: {e}")))?
        {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(fail(format!(
                    "'{shown}' timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        Ok(Captured {
            status,
            stdout: stdout.join().unwrap_or_default(),
            stderr: stderr.join().unwrap_or_default(),
        })
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

impl PrefStore for DefaultsStore {
    fn read(
        &self,
        section: Section,
        domain: &str,
        keys: Option<&BTreeSet<String>>,
    ) -> Result<Option<PreferenceMap>, DotmacosError> {
        self.check_scope(section)?;
        let out = self.run(section, domain, &["export", domain, "-"], None)?;
        let fail = |reason: String| DotmacosError::StoreError {
            section,
            domain: domain.into(),
            reason,
        };

        if !out.succeeded() {
            let stderr = out.stderr_text();
            if stderr.contains(MISSING_DOMAIN) {
                debug!(%section, domain, "Domain is absent");
                return Ok(None);
            }
            return Err(fail(format!(
                "export exited with {} and stderr '{stderr}'",
                out.status
            )));
        }

        let raw = plist::Value::from_reader(Cursor::new(out.stdout))
            .map_err(|e| fail(format!("malformed export: {e}")))?;
        let at = validate::child(section.name(), domain);
        let prefs = validate::from_plist(raw, &at)
            .and_then(|value| PreferenceMap::from_value(value, &at))
            .map_err(|e| fail(e.to_string()))?;

        Ok(Some(match keys {
            Some(keys) => prefs.restricted_to(keys),
            None => prefs,
        }))
    }

    fn write(
        &mut self,
        section: Section,
        domain: &str,
        prefs: &PreferenceMap,
    ) -> Result<(), DotmacosError> {
        self.check_scope(section)?;
        let fail = |reason: String| DotmacosError::StoreError {
            section,
            domain: domain.into(),
            reason,
        };

        let dict: plist::Dictionary = prefs
            .iter()
            .map(|(key, value)| (key.clone(), to_plist(value)))
            .collect();
        let mut bytes = Vec::new();
        plist::Value::Dictionary(dict)
            .to_writer_binary(&mut bytes)
            .map_err(|e| fail(format!("could not encode plist: {e}")))?;

        let out = self.run(section, domain, &["import", domain, "-"], Some(&bytes))?;
        if !out.succeeded() {
            return Err(fail(format!(
                "import exited with {} and stderr '{}'",
                out.status,
                out.stderr_text()
            )));
        }
        info!(%section, domain, keys = prefs.len(), "Wrote preferences");
        Ok(())
    }

    fn domains(&self, section: Section) -> Result<BTreeSet<String>, DotmacosError> {
        self.check_scope(section)?;
        let out = self.run(section, "*", &["domains"], None)?;
        if !out.succeeded() {
            return Err(DotmacosError::StoreError {
                section,
                domain: "*".into(),
                reason: format!(
                    "domains exited with {} and stderr '{}'",
                    out.status,
                    out.stderr_text()
                ),
            });
        }
        Ok(parse_domain_list(&String::from_utf8_lossy(&out.stdout)))
    }
}

/// Split the comma separated output of `defaults domains`.
fn parse_domain_list(text: &str) -> BTreeSet<String> {
    text.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

fn to_plist(value: &Value) -> plist::Value {
    match value {
        Value::Boolean(b) => plist::Value::Boolean(*b),
        Value::Integer(i) => plist::Value::Integer((*i).into()),
        Value::Real(r) => plist::Value::Real(*r),
        Value::Date(d) => plist::Value::Date(plist::Date::from(SystemTime::from(*d))),
        Value::String(s) => plist::Value::String(s.clone()),
        Value::Data(bytes) => plist::Value::Data(bytes.clone()),
        Value::Array(items) => plist::Value::Array(items.iter().map(to_plist).collect()),
        Value::Dictionary(dict) => plist::Value::Dictionary(
            dict.iter()
                .map(|(key, item)| (key.clone(), to_plist(item)))
                .collect(),
        ),
    }
}
