//! Touch classification and gesture detection for a grid-addressed touch
//! surface: per-touch note lifecycles, delay-gated tap/swipe/drag/center
//! classification and annulus-gated rotation detection.

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod rotation;
pub mod timer;
pub mod touch;
pub mod types;
pub mod zone;

pub use classifier::GestureClassifier;
pub use config::{
    AssessmentConfig, GestureConfig, HoldConfig, RotationConfig, SwipeConfig, SwipePolicy,
};
pub use engine::{EngineOutput, EngineTrace, GestureEngine};
pub use error::{ConfigError, Result};
pub use geometry::Point;
pub use rotation::{CircleDetector, CircleFit, RecognizerState};
pub use types::{
    GestureEvent, GesturePhase, GridCoordinate, RejectReason, RotationDirection, TouchBatch,
    TouchContact, TouchId, TouchSnapshot, Viewport,
};
pub use zone::{NoZones, UniformGrid, ZoneResolver};
