//! Open Pixel Control client.
//!
//! This is the "just works" layer. Set pixels, map a model through a colour
//! function or a particle field, and write frames to an OPC server such as
//! fcserver. Sends are fire-and-forget; an unreachable server is retried on
//! the next frame instead of raising an error.

pub mod client;
pub mod color;
pub mod config;
pub mod error;
pub mod model;
pub mod particle;
pub mod sink;

pub use glam::Vec3;

pub use client::{Client, Delivery};
pub use color::{hsv, Color, BLACK};
pub use config::{ClientConfig, ConnectionMode, DEFAULT_CONNECT_TIMEOUT, DEFAULT_WRITE_TIMEOUT};
pub use error::{ClientError, Result};
pub use model::{load_model, point_from_components, Bounds, Model, ModelPoint};
pub use particle::{shade, Particle};
pub use sink::{OpcSink, SinkConnection};
