use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use opcprims_frame::{FrameConfig, Packet, PacketReader};
use opcprims_transport::{Endpoint, OpcStream, TcpTransport};
use tracing::debug;

use crate::error::Result;

/// Listens for and accepts OPC client connections.
///
/// A minimal blocking OPC server: it decodes packets and hands them to the
/// caller without driving any hardware.
pub struct OpcSink {
    transport: TcpTransport,
    frame_config: FrameConfig,
    next_id: AtomicU64,
}

impl OpcSink {
    /// Bind to an endpoint. Port 0 picks an ephemeral port.
    pub fn bind(endpoint: &Endpoint) -> Result<Self> {
        let transport = TcpTransport::bind(endpoint)?;
        Ok(Self {
            transport,
            frame_config: FrameConfig::default(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Override reader config for accepted connections.
    pub fn with_frame_config(mut self, config: FrameConfig) -> Self {
        self.frame_config = config;
        self
    }

    /// Accept the next client connection.
    pub fn accept(&self) -> Result<SinkConnection> {
        let stream = self.transport.accept()?;
        let peer = stream.peer_addr().ok();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(id, peer = ?peer, "opc client accepted");

        let reader = PacketReader::with_config_opc(stream, self.frame_config.clone())?;
        Ok(SinkConnection { id, peer, reader })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    pub fn endpoint(&self) -> Endpoint {
        self.transport.endpoint()
    }
}

/// One accepted OPC client.
pub struct SinkConnection {
    id: u64,
    peer: Option<SocketAddr>,
    reader: PacketReader<OpcStream>,
}

impl SinkConnection {
    /// Block until the next complete packet arrives.
    ///
    /// Returns `FrameError::ConnectionClosed` (wrapped) once the client hangs up.
    pub fn recv(&mut self) -> Result<Packet> {
        Ok(self.reader.read_packet()?)
    }

    /// Sequential connection number, starting at 1.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }
}

impl Iterator for SinkConnection {
    type Item = Packet;

    /// Yields packets until the client disconnects or a read fails.
    fn next(&mut self) -> Option<Packet> {
        match self.recv() {
            Ok(packet) => Some(packet),
            Err(err) => {
                if !err.is_disconnect() {
                    debug!(id = self.id, error = %err, "opc connection read failed");
                }
                None
            }
        }
    }
}
