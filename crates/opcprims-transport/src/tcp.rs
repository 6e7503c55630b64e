use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use tracing::{debug, info};

use crate::endpoint::Endpoint;
use crate::error::{Result, TransportError};
use crate::stream::OpcStream;

/// Connect to an OPC server (blocking, bounded by `timeout`).
///
/// Every resolved address is tried in order; the last error is reported if
/// none accept. `TCP_NODELAY` is enabled on success.
pub fn connect(endpoint: &Endpoint, timeout: Duration) -> Result<OpcStream> {
    let addrs = endpoint.resolve()?;
    let mut last_err = None;

    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                debug!(%endpoint, %addr, "connected to opc server");
                return Ok(OpcStream::from_tcp(stream));
            }
            Err(err) => {
                debug!(%endpoint, %addr, error = %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
    }

    Err(TransportError::Connect {
        endpoint: endpoint.to_string(),
        source: last_err.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses to try")
        }),
    })
}

/// TCP listener accepting OPC client connections.
///
/// Used by the sink side: fcserver-style receivers, test harnesses and the
/// `listen` CLI command.
pub struct TcpTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen on the endpoint. Port 0 picks an ephemeral port.
    pub fn bind(endpoint: &Endpoint) -> Result<Self> {
        let addrs = endpoint.resolve()?;
        let listener =
            TcpListener::bind(addrs.as_slice()).map_err(|source| TransportError::Bind {
                endpoint: endpoint.to_string(),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        info!(%local_addr, "listening for opc clients");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<OpcStream> {
        let (stream, addr) = self.listener.accept().map_err(TransportError::Accept)?;
        stream.set_nodelay(true)?;
        debug!(%addr, "accepted opc client");
        Ok(OpcStream::from_tcp(stream))
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The bound address as an endpoint clients can connect to.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::from(self.local_addr)
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "tcp"
    }
}
