//! Test fixtures for draw-route.
//!
//! Provides:
//! - A map surface that records every call made on it
//! - A directions provider stub with a canned outcome
//! - A one-shot HTTP server for exercising the real client

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use draw_route::directions::{DirectionsResult, EncodedPolyline, Leg, Route, TextValue};
use draw_route::render::{LineOverlay, MarkerIcon};
use draw_route::{Coordinate, DirectionsError, DirectionsProvider, MapSurface, TravelMode};

/// Standard polyline test vector and what it decodes to.
pub const REFERENCE_POLYLINE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

pub fn reference_points() -> Vec<Coordinate> {
    vec![
        Coordinate::new(38.5, -120.2),
        Coordinate::new(40.7, -120.95),
        Coordinate::new(43.252, -126.453),
    ]
}

pub fn source() -> Coordinate {
    Coordinate::new(10.69017978, 106.59802544)
}

pub fn destination() -> Coordinate {
    Coordinate::new(10.77801822, 107.03330555)
}

pub fn route(points: Option<&str>, legs: Vec<Leg>) -> Route {
    Route {
        overview_polyline: points.map(|points| EncodedPolyline {
            points: points.to_string(),
        }),
        legs,
    }
}

/// One leg of 1000 m and 120 s ("2 mins").
pub fn two_minute_leg() -> Leg {
    Leg {
        distance: Some(TextValue {
            text: String::new(),
            value: 1000,
        }),
        duration: Some(TextValue {
            text: "2 mins".to_string(),
            value: 120,
        }),
    }
}

pub fn single_route_result() -> DirectionsResult {
    DirectionsResult {
        routes: vec![route(Some(REFERENCE_POLYLINE), vec![two_minute_leg()])],
        status: "OK".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    AddLine(LineOverlay),
    Remove(u64),
    MoveViewport(Coordinate),
    AddMarker(Coordinate, MarkerIcon, String),
}

/// Records calls and tracks which overlays are currently shown.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<SurfaceCall>,
    pub live: Vec<u64>,
    next_handle: u64,
}

impl RecordingSurface {
    pub fn add_line_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, SurfaceCall::AddLine(_)))
            .count()
    }

    pub fn remove_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, SurfaceCall::Remove(_)))
            .count()
    }
}

impl MapSurface for RecordingSurface {
    type Handle = u64;

    fn add_line_overlay(&mut self, overlay: &LineOverlay) -> u64 {
        self.next_handle += 1;
        self.live.push(self.next_handle);
        self.calls.push(SurfaceCall::AddLine(overlay.clone()));
        self.next_handle
    }

    fn remove_overlay(&mut self, handle: u64) {
        self.live.retain(|live| *live != handle);
        self.calls.push(SurfaceCall::Remove(handle));
    }

    fn move_viewport(&mut self, center: Coordinate) {
        self.calls.push(SurfaceCall::MoveViewport(center));
    }

    fn add_marker(&mut self, position: Coordinate, icon: &MarkerIcon, title: &str) {
        self.calls
            .push(SurfaceCall::AddMarker(position, icon.clone(), title.to_string()));
    }
}

/// Returns canned outcomes in order; the last one repeats.
pub struct StubProvider {
    outcomes: Mutex<Vec<Result<DirectionsResult, DirectionsError>>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(Coordinate, Coordinate, TravelMode, String)>>,
}

impl StubProvider {
    pub fn new(outcome: Result<DirectionsResult, DirectionsError>) -> Self {
        Self::sequence(vec![outcome])
    }

    pub fn sequence(outcomes: Vec<Result<DirectionsResult, DirectionsError>>) -> Self {
        assert!(!outcomes.is_empty(), "stub needs at least one outcome");
        Self {
            outcomes: Mutex::new(outcomes),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(Coordinate, Coordinate, TravelMode, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectionsProvider for StubProvider {
    async fn fetch_directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TravelMode,
        credential: &str,
    ) -> Result<DirectionsResult, DirectionsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((origin, destination, mode, credential.to_string()));
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.len() > 1 {
            outcomes.remove(0)
        } else {
            outcomes[0].clone()
        }
    }
}

/// Serves a single HTTP response on a local port.
///
/// Returns the base URL and a handle resolving to the request line that was
/// received.
pub async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let read = socket.read(&mut chunk).await.expect("read request");
            if read == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..read]);
            if request.windows(4).any(|window| window == b"\r\n\r\n") {
                break;
            }
        }
        socket
            .write_all(response.as_bytes())
            .await
            .expect("write response");
        let _ = socket.shutdown().await;

        String::from_utf8_lossy(&request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });

    (format!("http://{}", addr), handle)
}
