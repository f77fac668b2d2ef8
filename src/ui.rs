// src/ui.rs
use crate::driver::{AnimationDriver, DriverConfig, Frame}; // Frame loop and trace buffer
use crate::error::{PendulumError, PendulumResult};
use crate::initial::InitialAngles;
use crate::logic::Multipendulum; // The chain itself
use crate::params::PendulumConfig;
use actix_web::{web, HttpResponse, Result}; // Actix-web types for request handling and HTTP responses
use base64::{engine::general_purpose, Engine as _}; // Base64 encoder for embedding image data
use image::ImageFormat; // PNG encoding
use plotters::prelude::*; // Plotters plotting library prelude
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng; // Seedable source for reproducible runs
use serde::{Deserialize, Serialize}; // Serde traits for JSON (de)serialization
use serde_json::Value;
use std::io::{self, Cursor}; // IO utilities and Cursor for in-memory byte writing
use tracing::{info, warn};

/// Upper bound on frames per request so one call cannot pin a worker forever.
pub const MAX_FRAMES: usize = 20_000;

/// Upper bound on chain length per request; each step allocates two N×N matrices and eliminates in O(N³).
pub const MAX_SEGMENTS: usize = 256;

/// Everything needed to run one simulation. Any field left out of a request body takes the server default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationRequest {
    pub pendulum: PendulumConfig,
    pub driver: DriverConfig,
    pub frames: usize,
    /// Fixed seed for the initial angles; drawn from the OS when absent.
    pub seed: Option<u64>,
}

impl Default for SimulationRequest {
    fn default() -> Self {
        Self {
            pendulum: PendulumConfig::default(),
            driver: DriverConfig::default(),
            frames: 1000,
            seed: None,
        }
    }
}

/// Shared, read-only server state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub defaults: SimulationRequest,
}

#[derive(Serialize)]
struct SimResponse {
    success: bool,                    // Whether the simulation succeeded
    error: Option<String>,            // Why it did not
    trace_image: String,              // Base64-encoded PNG of the trace, empty if drawing failed
    animation_data: AnimationData,    // Raw frames for frontend playback
}

#[derive(Serialize, Default)]
struct AnimationData {
    frames: Vec<Frame>,          // Anchor-prefixed chain per frame
    trace: Vec<(f64, f64)>,      // Tip history at the end of the run
    n: usize,                    // Number of segments
    limit: f64,                  // Viewport half-size
    interval_ms: f64,            // Playback delay between frames
    trace_length: usize,         // Trace bound the player should keep
}

impl SimResponse {
    fn failed(message: String) -> Self {
        Self {
            success: false,
            error: Some(message),
            trace_image: String::new(),
            animation_data: AnimationData::default(),
        }
    }
}

/// Overlays `patch` onto `base`, recursing into objects so nested fields can be given individually.
pub fn merge_json(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                merge_json(base_map.entry(key).or_insert(Value::Null), value);
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Resolves a request body against the server defaults.
pub fn resolve_request(defaults: &SimulationRequest, body: Value) -> serde_json::Result<SimulationRequest> {
    let mut merged = serde_json::to_value(defaults)?;
    merge_json(&mut merged, body);
    serde_json::from_value(merged)
}

/// Runs the driver to completion. Blocking; call from a worker thread.
pub fn run_simulation(request: &SimulationRequest) -> PendulumResult<(AnimationDriver, Vec<Frame>)> {
    if request.pendulum.segment_count > MAX_SEGMENTS {
        return Err(PendulumError::invalid(
            "segment_count exceeds the per-request limit of 256",
            request.pendulum.segment_count,
        ));
    }
    request.driver.validate()?;
    let params = request.pendulum.validate()?;
    let mut rng = match request.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    };
    let pendulum = Multipendulum::new(params, request.driver.initial_angles, &mut rng)?;
    let mut driver = AnimationDriver::new(pendulum, request.driver.clone());
    let frames = driver.run(request.frames.min(MAX_FRAMES))?;
    Ok((driver, frames))
}

/// Draws the tip trace and the final chain pose, returns a PNG data URL.
pub fn render_trace_png(last: Option<&Frame>, trace: &[(f64, f64)], limit: f64, n: usize) -> io::Result<String> {
    // Image width and height in pixels
    const W: u32 = 500;
    const H: u32 = 500;

    // Allocate RGB pixel buffer (3 bytes per pixel)
    let mut pixel_buffer = vec![0u8; (W * H * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut pixel_buffer, (W, H)).into_drawing_area();
        root.fill(&WHITE).map_err(io::Error::other)?;

        // Square chart so the chain is not distorted
        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Multipendulum (n={n})"), ("sans-serif", 20).into_font())
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(30)
            .build_cartesian_2d(-limit..limit, -limit..limit)
            .map_err(io::Error::other)?;

        chart.configure_mesh().draw().map_err(io::Error::other)?;

        // Trace of the free end, thin
        chart
            .draw_series(LineSeries::new(trace.iter().copied(), RED.mix(0.75).stroke_width(1)))
            .map_err(io::Error::other)?;

        // Final pose: rods as a thick polyline, joints as dots
        if let Some(frame) = last {
            let points: Vec<(f64, f64)> = frame.xs.iter().copied().zip(frame.ys.iter().copied()).collect();
            chart
                .draw_series(LineSeries::new(points.iter().copied(), BLUE.stroke_width(2)))
                .map_err(io::Error::other)?;
            chart
                .draw_series(points.iter().map(|&p| Circle::new(p, 4, BLUE.filled())))
                .map_err(io::Error::other)?;
        }

        root.present().map_err(io::Error::other)?;
    }

    let img_buffer = image::ImageBuffer::from_raw(W, H, pixel_buffer)
        .ok_or_else(|| io::Error::other("Failed to create image buffer"))?;
    let dynamic_image = image::DynamicImage::ImageRgb8(img_buffer);

    let mut png_buffer = Cursor::new(Vec::new());
    dynamic_image
        .write_to(&mut png_buffer, ImageFormat::Png)
        .map_err(|e| io::Error::other(e.to_string()))?;

    Ok(format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(png_buffer.into_inner())
    ))
}

pub async fn simulate_handler(state: web::Data<AppState>, body: web::Json<Value>) -> Result<HttpResponse> {
    let request = match resolve_request(&state.defaults, body.into_inner()) {
        Ok(request) => request,
        Err(e) => return Ok(HttpResponse::Ok().json(SimResponse::failed(format!("Malformed request: {e}")))),
    };

    // Physics and drawing are CPU-bound; keep them off the async workers
    let outcome = tokio::task::spawn_blocking(move || {
        let (driver, frames) = run_simulation(&request)?;
        let trace = driver.trace().to_vec();
        let limit = driver.plot_limit();
        let n = driver.pendulum().params().segment_count();
        let trace_image = render_trace_png(frames.last(), &trace, limit, n).unwrap_or_else(|e| {
            warn!(error = %e, "trace image could not be rendered");
            String::new()
        });
        Ok::<_, PendulumError>(SimResponse {
            success: true,
            error: None,
            trace_image,
            animation_data: AnimationData {
                interval_ms: driver.frame_interval_ms(),
                trace_length: driver.trace().limit(),
                frames,
                trace,
                n,
                limit,
            },
        })
    })
    .await
    .map_err(io::Error::other)?;

    match outcome {
        Ok(response) => {
            info!(frames = response.animation_data.frames.len(), "simulation served");
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            warn!(error = %e, "simulation rejected");
            Ok(HttpResponse::Ok().json(SimResponse::failed(e.to_string())))
        }
    }
}

pub async fn defaults_handler(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.defaults)
}

/// Mounts the API under `/api`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/simulate", web::post().to(simulate_handler))
            .route("/defaults", web::get().to(defaults_handler)),
    );
}

/// Defaults the binary serves: a long trace and a chain starting almost upright.
pub fn launch_defaults(segment_count: usize, damping: f64) -> SimulationRequest {
    SimulationRequest {
        pendulum: PendulumConfig {
            segment_count,
            damping,
            ..PendulumConfig::default()
        },
        driver: DriverConfig {
            trace_length: 6000,
            initial_angles: InitialAngles::NearInverted,
            ..DriverConfig::default()
        },
        ..SimulationRequest::default()
    }
}
