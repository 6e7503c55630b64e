use std::fmt;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use opcprims_frame::{
    ColorCorrection, FirmwareConfig, FrameConfig, FrameError, PacketWriter, PixelBuffer, SysEx,
    BROADCAST,
};
use opcprims_transport::{ConnectionState, Endpoint, OpcStream};
use tracing::{debug, trace, warn};

use crate::color::{Color, BLACK};
use crate::config::{ClientConfig, ConnectionMode};
use crate::error::{ClientError, Result};
use crate::model::ModelPoint;
use crate::particle::{shade, Particle};

type StateObserver = Box<dyn FnMut(ConnectionState) + Send>;
type ConnectAttempt = Receiver<opcprims_transport::Result<OpcStream>>;

/// Outcome of a frame write that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The whole packet was handed to the socket.
    Sent(usize),
    /// No connection could be made; nothing was written.
    NotConnected,
    /// The socket still held more than a frame of unsent data, so this
    /// frame was skipped.
    Dropped,
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent(_) => "sent",
            Self::NotConnected => "not_connected",
            Self::Dropped => "dropped",
        }
    }
}

/// An Open Pixel Control client for one server.
///
/// Owns the pixel buffer and the connection. Sends are fire-and-forget:
/// nothing is read back from the server. Connection failures never surface
/// as errors.
///
/// In `Persistent` mode a write while disconnected starts a connect on a
/// helper thread and returns [`Delivery::NotConnected`] at once. The client
/// stays `Connecting` until a later write picks up the result, so frames are
/// skipped rather than stalling the caller.
pub struct Client {
    endpoint: Endpoint,
    config: ClientConfig,
    state: ConnectionState,
    pixels: PixelBuffer,
    writer: Option<PacketWriter<OpcStream>>,
    attempt: Option<ConnectAttempt>,
    firmware: Option<FirmwareConfig>,
    color_correction: Option<ColorCorrection>,
    observer: Option<StateObserver>,
}

impl Client {
    /// Create a disconnected client with default configuration.
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_config(endpoint, ClientConfig::default())
    }

    /// Create a disconnected client with explicit configuration.
    pub fn with_config(endpoint: Endpoint, config: ClientConfig) -> Self {
        Self {
            pixels: PixelBuffer::with_channel(config.channel),
            endpoint,
            config,
            state: ConnectionState::Disconnected,
            writer: None,
            attempt: None,
            firmware: None,
            color_correction: None,
            observer: None,
        }
    }

    /// Address pixel packets to `channel`.
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.config.channel = channel;
        self.pixels.set_channel(channel);
        self
    }

    pub fn with_mode(mut self, mode: ConnectionMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Call `observer` on every connection state transition.
    pub fn on_state_change<F>(&mut self, observer: F)
    where
        F: FnMut(ConnectionState) + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Connect if not already connected, blocking for up to the configured
    /// connect timeout.
    ///
    /// Returns whether the client is connected afterwards. If a background
    /// attempt is in flight, waits for it instead of starting another. A
    /// failed attempt is logged and leaves the client disconnected.
    pub fn connect(&mut self) -> bool {
        if self.state.is_connected() {
            return true;
        }

        let result = match self.attempt.take() {
            Some(attempt) => attempt.recv().unwrap_or_else(|_| Err(attempt_lost())),
            None => {
                self.transition(ConnectionState::Connecting);
                opcprims_transport::connect(&self.endpoint, self.config.connect_timeout)
            }
        };
        self.finish_connect(result)
    }

    /// Advance a background connect without blocking.
    ///
    /// Starts an attempt when disconnected, otherwise checks whether the
    /// attempt in flight has finished. Returns whether the client is
    /// connected now.
    pub fn poll_connect(&mut self) -> bool {
        if self.state.is_connected() {
            return true;
        }

        let Some(attempt) = self.attempt.take() else {
            self.start_connect();
            return false;
        };
        match attempt.try_recv() {
            Ok(result) => self.finish_connect(result),
            Err(TryRecvError::Empty) => {
                self.attempt = Some(attempt);
                false
            }
            Err(TryRecvError::Disconnected) => self.finish_connect(Err(attempt_lost())),
        }
    }

    fn start_connect(&mut self) {
        let (tx, rx) = mpsc::channel();
        let endpoint = self.endpoint.clone();
        let timeout = self.config.connect_timeout;

        let spawned = thread::Builder::new()
            .name("opc-connect".into())
            .spawn(move || {
                // The receiver is gone if the client disconnected or was dropped.
                let _ = tx.send(opcprims_transport::connect(&endpoint, timeout));
            });

        match spawned {
            Ok(_) => {
                self.attempt = Some(rx);
                self.transition(ConnectionState::Connecting);
            }
            Err(err) => {
                warn!(endpoint = %self.endpoint, error = %err, "connect thread failed to start");
                self.transition(ConnectionState::Disconnected);
            }
        }
    }

    fn finish_connect(&mut self, result: opcprims_transport::Result<OpcStream>) -> bool {
        let opened = result
            .map_err(ClientError::from)
            .and_then(|stream| self.open(stream));
        match opened {
            Ok(writer) => {
                self.writer = Some(writer);
                self.transition(ConnectionState::Connected);
                true
            }
            Err(err) => {
                warn!(endpoint = %self.endpoint, error = %err, "connect failed");
                self.transition(ConnectionState::Disconnected);
                false
            }
        }
    }

    /// Connect the way the configured mode writes: in the background for
    /// `Persistent`, inline for `PerFrame`.
    fn ready(&mut self) -> bool {
        match self.config.mode {
            ConnectionMode::Persistent => self.poll_connect(),
            ConnectionMode::PerFrame => self.connect(),
        }
    }

    fn open(&self, stream: OpcStream) -> Result<PacketWriter<OpcStream>> {
        let frame_config = FrameConfig {
            write_timeout: self.config.write_timeout,
            ..FrameConfig::default()
        };
        let mut writer = PacketWriter::with_config_opc(stream, frame_config)?;

        for sysex in self.pending_sysex()? {
            writer.write_sysex(BROADCAST, &sysex)?;
        }
        Ok(writer)
    }

    fn pending_sysex(&self) -> Result<Vec<SysEx>> {
        let mut out = Vec::with_capacity(2);
        if let Some(firmware) = &self.firmware {
            out.push(firmware.to_sysex());
        }
        if let Some(cc) = &self.color_correction {
            out.push(cc.to_sysex()?);
        }
        Ok(out)
    }

    /// Close the connection, if any, and abandon a connect in flight.
    pub fn disconnect(&mut self) {
        self.attempt = None;
        if let Some(writer) = self.writer.take() {
            if let Err(err) = writer.get_ref().shutdown() {
                debug!(endpoint = %self.endpoint, error = %err, "shutdown failed");
            }
        }
        self.transition(ConnectionState::Disconnected);
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state == next {
            return;
        }
        debug!(endpoint = %self.endpoint, from = %self.state, to = %next, "connection state");
        self.state = next;
        if let Some(observer) = self.observer.as_mut() {
            observer(next);
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.pixel_count()
    }

    /// Resize the buffer to `count` pixels.
    ///
    /// Existing pixels below `count` are kept; new ones start black.
    pub fn set_pixel_count(&mut self, count: usize) -> Result<()> {
        self.pixels.set_pixel_count(count).map_err(invalid_argument)
    }

    /// Store one pixel, growing the buffer if `index` is past the end.
    ///
    /// Each channel is clamped to `[0, 255]` and then truncated toward zero.
    pub fn set_pixel(&mut self, index: usize, r: f32, g: f32, b: f32) -> Result<()> {
        self.pixels
            .set_pixel(index, [r, g, b])
            .map_err(invalid_argument)
    }

    pub fn pixel(&self, index: usize) -> Option<[u8; 3]> {
        self.pixels.pixel(index)
    }

    /// The packet exactly as it will be written.
    pub fn packet(&self) -> &[u8] {
        self.pixels.as_bytes()
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// Write the current buffer.
    ///
    /// Connects first if needed (see [`Client`] for how each mode connects).
    /// A failed send closes the connection and returns [`ClientError::Send`];
    /// the buffer is left as it was.
    pub fn write_pixels(&mut self) -> Result<Delivery> {
        if !self.ready() {
            return Ok(Delivery::NotConnected);
        }

        let result = self.send_frame();
        if self.config.mode == ConnectionMode::PerFrame {
            self.disconnect();
        }
        result
    }

    fn send_frame(&mut self) -> Result<Delivery> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(Delivery::NotConnected);
        };

        let frame_len = self.pixels.len();
        if self.config.drop_on_backlog {
            let backlog = writer.unsent_bytes().unwrap_or(0);
            if backlog > frame_len {
                trace!(backlog, frame_len, "frame dropped");
                return Ok(Delivery::Dropped);
            }
        }

        match writer.write_pixels(&self.pixels) {
            Ok(()) => Ok(Delivery::Sent(frame_len)),
            Err(err) => {
                warn!(endpoint = %self.endpoint, error = %err, "send failed");
                self.disconnect();
                Err(ClientError::Send(err))
            }
        }
    }

    /// Colour every pixel from its model point and write the frame.
    ///
    /// Pixel `i` gets `color_fn(points[i])`; `None` entries are black. If no
    /// connection can be made, neither the buffer nor `color_fn` is touched.
    pub fn map_pixels<F>(&mut self, mut color_fn: F, points: &[Option<ModelPoint>]) -> Result<Delivery>
    where
        F: FnMut(&ModelPoint) -> Color,
    {
        if !self.ready() {
            return Ok(Delivery::NotConnected);
        }

        self.set_pixel_count(points.len())?;
        for (index, point) in points.iter().enumerate() {
            let rgb = point.as_ref().map_or(BLACK, &mut color_fn);
            self.pixels
                .set_pixel(index, rgb)
                .map_err(invalid_argument)?;
        }
        self.write_pixels()
    }

    /// Light each point with the sum of all particle contributions and write
    /// the frame.
    pub fn map_particles(
        &mut self,
        particles: &[Particle],
        points: &[Option<ModelPoint>],
    ) -> Result<Delivery> {
        self.map_pixels(|p| shade(particles, p.point), points)
    }

    /// Set Fadecandy firmware options. Sent now if connected, and again on
    /// every new connection.
    pub fn set_firmware_config(&mut self, config: FirmwareConfig) -> Result<()> {
        self.firmware = Some(config);
        self.send_sysex(config.to_sysex())
    }

    pub fn firmware_config(&self) -> Option<FirmwareConfig> {
        self.firmware
    }

    /// Set the Fadecandy global colour correction. Sent now if connected,
    /// and again on every new connection.
    pub fn set_color_correction(&mut self, correction: ColorCorrection) -> Result<()> {
        let sysex = correction.to_sysex()?;
        self.color_correction = Some(correction);
        self.send_sysex(sysex)
    }

    pub fn color_correction(&self) -> Option<&ColorCorrection> {
        self.color_correction.as_ref()
    }

    fn send_sysex(&mut self, sysex: SysEx) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        if let Err(err) = writer.write_sysex(BROADCAST, &sysex) {
            warn!(endpoint = %self.endpoint, error = %err, "sysex send failed");
            self.disconnect();
            return Err(ClientError::Send(err));
        }
        Ok(())
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state)
            .field("mode", &self.config.mode)
            .field("pixel_count", &self.pixels.pixel_count())
            .finish_non_exhaustive()
    }
}

fn attempt_lost() -> opcprims_transport::TransportError {
    std::io::Error::other("connect thread exited without a result").into()
}

fn invalid_argument(err: FrameError) -> ClientError {
    match err {
        FrameError::TooManyPixels { count, max } => ClientError::InvalidArgument(format!(
            "pixel count {count} exceeds maximum of {max} per packet"
        )),
        other => ClientError::Frame(other),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::thread::{self, JoinHandle};
    use std::time::{Duration, Instant};

    use glam::Vec3;
    use opcprims_frame::{Packet, MAX_PIXELS, SYSTEM_EXCLUSIVE};
    use opcprims_transport::TcpTransport;

    use super::*;
    use crate::sink::OpcSink;

    /// Accept one connection per entry in `per_conn` and read that many
    /// packets from it.
    fn spawn_sink(per_conn: Vec<usize>) -> (Endpoint, JoinHandle<Vec<Packet>>) {
        let sink = OpcSink::bind(&Endpoint::new("127.0.0.1", 0)).expect("sink should bind");
        let endpoint = sink.endpoint();
        let handle = thread::spawn(move || {
            let mut packets = Vec::new();
            for count in per_conn {
                let mut conn = sink.accept().expect("sink should accept");
                for _ in 0..count {
                    packets.push(conn.recv().expect("sink should receive packet"));
                }
            }
            packets
        });
        (endpoint, handle)
    }

    fn connected(endpoint: Endpoint) -> Client {
        let mut client = Client::new(endpoint);
        assert!(client.connect());
        client
    }

    fn refused_endpoint() -> Endpoint {
        let listener =
            TcpTransport::bind(&Endpoint::new("127.0.0.1", 0)).expect("listener should bind");
        listener.endpoint()
    }

    fn line(n: usize) -> Vec<Option<ModelPoint>> {
        (0..n)
            .map(|i| Some(ModelPoint::new(Vec3::new(i as f32, 0.0, 0.0))))
            .collect()
    }

    #[test]
    fn rgb_scenario_on_the_wire() {
        let (endpoint, sink) = spawn_sink(vec![1]);
        let mut client = connected(endpoint);

        client.set_pixel_count(3).unwrap();
        client.set_pixel(0, 255.0, 0.0, 0.0).unwrap();
        client.set_pixel(1, 0.0, 255.0, 0.0).unwrap();
        client.set_pixel(2, 0.0, 0.0, 255.0).unwrap();

        assert_eq!(
            client.packet(),
            &[0, 0, 0, 9, 255, 0, 0, 0, 255, 0, 0, 0, 255]
        );
        assert_eq!(client.write_pixels().unwrap(), Delivery::Sent(13));

        let packets = sink.join().expect("sink thread should finish");
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].channel, 0);
        assert!(packets[0].is_pixel_colors());
        assert_eq!(
            packets[0].payload.as_ref(),
            &[255, 0, 0, 0, 255, 0, 0, 0, 255]
        );
    }

    #[test]
    fn repeated_write_sends_identical_bytes() {
        let (endpoint, sink) = spawn_sink(vec![2]);
        let mut client = connected(endpoint);
        client.set_pixel(1, 10.5, 300.0, -4.0).unwrap();

        assert!(client.write_pixels().unwrap().is_sent());
        assert!(client.write_pixels().unwrap().is_sent());

        let packets = sink.join().expect("sink thread should finish");
        assert_eq!(packets[0], packets[1]);
        assert_eq!(packets[0].payload.as_ref(), &[0, 0, 0, 10, 255, 0]);
    }

    #[test]
    fn disconnected_map_pixels_touches_nothing() {
        let mut client = Client::new(refused_endpoint());
        client.set_pixel_count(2).unwrap();
        client.set_pixel(0, 1.0, 2.0, 3.0).unwrap();
        let before = client.packet().to_vec();

        let mut calls = 0;
        let delivery = client
            .map_pixels(
                |_| {
                    calls += 1;
                    [255.0, 255.0, 255.0]
                },
                &line(5),
            )
            .unwrap();

        assert_eq!(delivery, Delivery::NotConnected);
        assert_eq!(calls, 0);
        assert_eq!(client.packet(), before.as_slice());
        assert!(!client.is_connected());
    }

    #[test]
    fn write_while_unreachable_is_not_an_error() {
        let mut client = Client::new(refused_endpoint());
        client.set_pixel_count(1).unwrap();
        assert_eq!(client.write_pixels().unwrap(), Delivery::NotConnected);
        assert!(!client.connect());
    }

    #[test]
    fn write_starts_connect_without_blocking() {
        let (endpoint, sink) = spawn_sink(vec![1]);
        let mut client = Client::new(endpoint);
        client.set_pixel(1, 1.0, 2.0, 3.0).unwrap();

        let started = Instant::now();
        assert_eq!(client.write_pixels().unwrap(), Delivery::NotConnected);
        assert!(started.elapsed() < client.config().connect_timeout);
        assert_eq!(client.state(), ConnectionState::Connecting);

        let mut delivery = Delivery::NotConnected;
        for _ in 0..200 {
            delivery = client.write_pixels().unwrap();
            if delivery.is_sent() {
                break;
            }
            assert_eq!(client.state(), ConnectionState::Connecting);
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(delivery, Delivery::Sent(10));

        let packets = sink.join().expect("sink thread should finish");
        assert_eq!(packets[0].payload.as_ref(), &[0, 0, 0, 1, 2, 3]);
    }

    #[test]
    fn failed_background_connect_returns_to_disconnected() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut client = Client::new(refused_endpoint());
        let log = Arc::clone(&seen);
        client.on_state_change(move |s| log.lock().unwrap().push(s));

        assert!(!client.poll_connect());
        for _ in 0..200 {
            if client.state() != ConnectionState::Connecting {
                break;
            }
            thread::sleep(Duration::from_millis(5));
            client.poll_connect();
        }

        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![ConnectionState::Connecting, ConnectionState::Disconnected]
        );
    }

    #[test]
    fn connect_waits_for_attempt_in_flight() {
        let (endpoint, sink) = spawn_sink(vec![0]);
        let mut client = Client::new(endpoint);

        assert!(!client.poll_connect());
        assert!(client.connect());
        assert!(client.is_connected());
        sink.join().expect("sink thread should finish");
    }

    #[test]
    fn disconnect_abandons_attempt_in_flight() {
        let mut client = Client::new(refused_endpoint());
        assert!(!client.poll_connect());
        client.disconnect();
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn backlog_drops_frame_and_keeps_connection() {
        let listener =
            TcpTransport::bind(&Endpoint::new("127.0.0.1", 0)).expect("listener should bind");
        let mut client = Client::new(listener.endpoint());
        client.set_pixel_count(MAX_PIXELS).unwrap();
        assert!(client.connect());
        let _idle_peer = listener.accept().expect("listener should accept");

        let mut dropped = false;
        for _ in 0..50 {
            match client.write_pixels() {
                Ok(Delivery::Dropped) => {
                    dropped = true;
                    break;
                }
                Ok(_) => {}
                Err(err) => panic!("write should not fail: {err}"),
            }
        }

        assert!(dropped);
        assert_eq!(client.state(), ConnectionState::Connected);
    }

    #[test]
    fn map_pixels_preserves_order() {
        let (endpoint, sink) = spawn_sink(vec![1]);
        let mut client = connected(endpoint);

        let delivery = client
            .map_pixels(|p| [p.point.x * 10.0, 0.0, 0.0], &line(4))
            .unwrap();
        assert_eq!(delivery, Delivery::Sent(4 + 12));

        let packets = sink.join().expect("sink thread should finish");
        let reds: Vec<u8> = packets[0].pixels().map(|rgb| rgb[0]).collect();
        assert_eq!(reds, vec![0, 10, 20, 30]);
    }

    #[test]
    fn map_pixels_null_points_are_black() {
        let (endpoint, sink) = spawn_sink(vec![1]);
        let mut client = connected(endpoint);
        let points = vec![Some(ModelPoint::new(Vec3::ZERO)), None];

        client.map_pixels(|_| [9.0, 9.0, 9.0], &points).unwrap();

        let packets = sink.join().expect("sink thread should finish");
        assert_eq!(packets[0].payload.as_ref(), &[9, 9, 9, 0, 0, 0]);
    }

    #[test]
    fn map_pixels_shrinks_buffer_to_model() {
        let (endpoint, sink) = spawn_sink(vec![1]);
        let mut client = connected(endpoint);
        client.set_pixel_count(10).unwrap();

        client.map_pixels(|_| BLACK, &line(2)).unwrap();
        assert_eq!(client.pixel_count(), 2);
        sink.join().expect("sink thread should finish");
    }

    #[test]
    fn map_particles_without_particles_is_black() {
        let (endpoint, sink) = spawn_sink(vec![1]);
        let mut client = connected(endpoint);

        client.map_particles(&[], &line(3)).unwrap();

        let packets = sink.join().expect("sink thread should finish");
        assert_eq!(packets[0].payload.as_ref(), &[0; 9]);
    }

    #[test]
    fn map_particles_single_particle_at_point() {
        let (endpoint, sink) = spawn_sink(vec![1]);
        let mut client = connected(endpoint);
        let particle = Particle::new(Vec3::new(1.0, 0.0, 0.0), [100.0, 40.0, 20.0], 2.0, 0.0);
        let points = vec![None, Some(ModelPoint::new(particle.point))];

        client.map_particles(&[particle], &points).unwrap();

        let packets = sink.join().expect("sink thread should finish");
        assert_eq!(packets[0].payload.as_ref(), &[0, 0, 0, 200, 80, 40]);
    }

    #[test]
    fn out_of_range_index_is_invalid_argument() {
        let mut client = Client::new(refused_endpoint());
        assert!(matches!(
            client.set_pixel(MAX_PIXELS, 0.0, 0.0, 0.0),
            Err(ClientError::InvalidArgument(_))
        ));
        assert!(matches!(
            client.set_pixel_count(MAX_PIXELS + 1),
            Err(ClientError::InvalidArgument(_))
        ));
        assert_eq!(client.pixel_count(), 0);

        client.set_pixel(MAX_PIXELS - 1, 1.0, 1.0, 1.0).unwrap();
        assert_eq!(client.pixel_count(), MAX_PIXELS);
    }

    #[test]
    fn state_transitions_are_observed() {
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut unreachable = Client::new(refused_endpoint());
        let log = Arc::clone(&seen);
        unreachable.on_state_change(move |s| log.lock().unwrap().push(s));
        assert!(!unreachable.connect());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![ConnectionState::Connecting, ConnectionState::Disconnected]
        );

        seen.lock().unwrap().clear();
        let (endpoint, sink) = spawn_sink(vec![0]);
        let mut client = Client::new(endpoint);
        let log = Arc::clone(&seen);
        client.on_state_change(move |s| log.lock().unwrap().push(s));

        assert!(client.connect());
        assert!(client.connect());
        client.disconnect();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ConnectionState::Connecting,
                ConnectionState::Connected,
                ConnectionState::Disconnected,
            ]
        );
        sink.join().expect("sink thread should finish");
    }

    #[test]
    fn send_failure_disconnects() {
        let listener =
            TcpTransport::bind(&Endpoint::new("127.0.0.1", 0)).expect("listener should bind");
        let mut client = Client::new(listener.endpoint());
        client.set_pixel_count(1000).unwrap();
        assert!(client.connect());

        drop(listener.accept().expect("listener should accept"));
        drop(listener);

        let mut failure = None;
        for _ in 0..50 {
            match client.write_pixels() {
                Err(err) => {
                    failure = Some(err);
                    break;
                }
                Ok(_) => thread::sleep(Duration::from_millis(10)),
            }
        }

        assert!(matches!(failure, Some(ClientError::Send(_))));
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert_eq!(client.pixel_count(), 1000);
    }

    #[test]
    fn sysex_sent_before_first_frame() {
        let (endpoint, sink) = spawn_sink(vec![3]);
        let mut client = Client::new(endpoint);
        let firmware = FirmwareConfig {
            dithering: false,
            ..FirmwareConfig::default()
        };
        client.set_firmware_config(firmware).unwrap();
        client
            .set_color_correction(ColorCorrection {
                gamma: 2.5,
                ..ColorCorrection::default()
            })
            .unwrap();
        client.set_pixel(0, 1.0, 1.0, 1.0).unwrap();
        assert!(client.connect());
        client.write_pixels().unwrap();

        let packets = sink.join().expect("sink thread should finish");
        assert_eq!(packets[0].command, SYSTEM_EXCLUSIVE);
        let fw = SysEx::from_packet(&packets[0]).unwrap();
        assert_eq!(FirmwareConfig::from_sysex(&fw).unwrap(), firmware);
        let cc = SysEx::from_packet(&packets[1]).unwrap();
        assert_eq!(ColorCorrection::from_sysex(&cc).unwrap().gamma, 2.5);
        assert!(packets[2].is_pixel_colors());
    }

    #[test]
    fn per_frame_mode_reconnects_each_write() {
        let (endpoint, sink) = spawn_sink(vec![1, 1]);
        let mut client = Client::new(endpoint).with_mode(ConnectionMode::PerFrame);
        client.set_pixel(0, 5.0, 5.0, 5.0).unwrap();

        assert!(client.write_pixels().unwrap().is_sent());
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert!(client.write_pixels().unwrap().is_sent());

        let packets = sink.join().expect("sink thread should finish");
        assert_eq!(packets.len(), 2);
    }

    #[test]
    fn channel_is_written_to_header() {
        let (endpoint, sink) = spawn_sink(vec![1]);
        let mut client = Client::new(endpoint).with_channel(4);
        assert!(client.connect());
        client.set_pixel(0, 0.0, 0.0, 0.0).unwrap();
        client.write_pixels().unwrap();

        let packets = sink.join().expect("sink thread should finish");
        assert_eq!(packets[0].channel, 4);
    }
}
