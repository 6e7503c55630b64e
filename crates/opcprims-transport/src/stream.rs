use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use crate::error::Result;

/// A connected OPC stream. Implements `Read` and `Write`.
///
/// This is the fundamental I/O type returned by transport operations.
/// OPC has no framing beyond the packet header, so this is a thin wrapper
/// around a TCP stream with the socket options OPC clients care about.
pub struct OpcStream {
    inner: TcpStream,
}

impl Read for OpcStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for OpcStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl OpcStream {
    pub(crate) fn from_tcp(stream: TcpStream) -> Self {
        Self { inner: stream }
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Disable Nagle's algorithm so each frame leaves immediately.
    pub fn set_nodelay(&self, nodelay: bool) -> Result<()> {
        self.inner.set_nodelay(nodelay).map_err(Into::into)
    }

    /// Try to clone this stream (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self::from_tcp(self.inner.try_clone()?))
    }

    /// Address of the remote end.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        self.inner.peer_addr().map_err(Into::into)
    }

    /// Shut down both halves of the connection.
    pub fn shutdown(&self) -> Result<()> {
        self.inner
            .shutdown(std::net::Shutdown::Both)
            .map_err(Into::into)
    }

    /// Bytes written to the socket that the kernel has not sent yet.
    ///
    /// Uses `SIOCOUTQ` on Linux. Returns `None` where the platform does not
    /// expose the send queue depth.
    #[cfg(target_os = "linux")]
    pub fn unsent_bytes(&self) -> Option<usize> {
        use std::os::fd::AsRawFd;

        let fd = self.inner.as_raw_fd();
        let mut queued: libc::c_int = 0;

        // SAFETY: `queued` is a valid writable c_int and `fd` is an open TCP
        // socket descriptor owned by this stream.
        let rc = unsafe { libc::ioctl(fd, libc::TIOCOUTQ, &mut queued as *mut libc::c_int) };

        if rc == 0 && queued >= 0 {
            Some(queued as usize)
        } else {
            None
        }
    }

    /// Bytes written to the socket that the kernel has not sent yet.
    ///
    /// Returns `None` on platforms that do not expose the send queue depth.
    #[cfg(not(target_os = "linux"))]
    pub fn unsent_bytes(&self) -> Option<usize> {
        None
    }
}

impl std::fmt::Debug for OpcStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_struct("OpcStream");
        dbg.field("type", &"tcp");
        if let Ok(addr) = self.inner.peer_addr() {
            dbg.field("peer", &addr);
        }
        dbg.finish()
    }
}
