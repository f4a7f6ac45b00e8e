/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

#[cfg(feature = "yaml")]
mod yaml;

pub(crate) const MAX_BATCH_SIZE: usize = 128;

pub(super) struct SyslogBackend(UnixDatagram);

impl SyslogBackend {
    /// Send as many messages as possible, return how many were sent.
    pub(super) fn write_many(&self, msgs: &[Vec<u8>]) -> io::Result<usize> {
        let mut count = 0;
        for msg in msgs {
            match self.0.send(msg) {
                Ok(_) => count += 1,
                Err(e) => {
                    if count == 0 {
                        return Err(e);
                    }
                    break;
                }
            }
        }
        Ok(count)
    }
}

/// Where to find the local syslog daemon.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SyslogBackendBuilder {
    /// the default socket path of the platform
    #[default]
    Default,
    /// unix socket with a custom path
    Unix(PathBuf),
}

impl SyslogBackendBuilder {
    pub fn path(&self) -> &Path {
        match self {
            SyslogBackendBuilder::Default => Path::new(DEFAULT_SOCKET_PATH),
            SyslogBackendBuilder::Unix(path) => path,
        }
    }

    pub(super) fn build(&self) -> io::Result<SyslogBackend> {
        let socket = UnixDatagram::unbound()?;
        socket.connect(self.path())?;
        Ok(SyslogBackend(socket))
    }
}

#[cfg(any(target_os = "freebsd", target_os = "dragonfly", target_os = "netbsd"))]
const DEFAULT_SOCKET_PATH: &str = "/var/run/log";
#[cfg(target_os = "macos")]
const DEFAULT_SOCKET_PATH: &str = "/var/run/syslog";
#[cfg(not(any(
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "macos"
)))]
const DEFAULT_SOCKET_PATH: &str = "/dev/log";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_to_bound_socket() {
        let dir = std::env::temp_dir().join(format!("modlog-syslog-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("backend.sock");
        let _ = std::fs::remove_file(&path);
        let server = UnixDatagram::bind(&path).unwrap();

        let backend = SyslogBackendBuilder::Unix(path.clone()).build().unwrap();
        let msgs = vec![b"<11>one".to_vec(), b"<11>two".to_vec()];
        assert_eq!(backend.write_many(&msgs).unwrap(), 2);

        let mut buf = [0u8; 64];
        let n = server.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"<11>one");
        let n = server.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"<11>two");

        let _ = std::fs::remove_file(&path);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn default_path() {
        assert_eq!(SyslogBackendBuilder::Default.path(), Path::new("/dev/log"));
    }

    #[test]
    fn missing_socket() {
        let builder = SyslogBackendBuilder::Unix(PathBuf::from("/nonexistent/modlog.sock"));
        assert!(builder.build().is_err());
    }
}
