//! In-process stand-in for the floor-plan backend.

#![allow(dead_code)]

use plancore::model::{GeneratedPlan, ImageUpload, PlotSubmission, ProcessedPlot};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use warp::http::Response;
use warp::hyper::body::Bytes;
use warp::path::FullPath;
use warp::Filter;

#[derive(Debug, Clone)]
pub struct Hit {
    pub path: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Hit {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn body_json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

#[derive(Clone)]
struct Canned {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

/// Canned responses keyed by request path.
#[derive(Default)]
pub struct StubBackend {
    routes: HashMap<String, Canned>,
    stall: Option<(String, Duration)>,
}

pub struct RunningStub {
    pub addr: SocketAddr,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl RunningStub {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hits_for(&self, path: &str) -> Vec<Hit> {
        self.hits().into_iter().filter(|hit| hit.path == path).collect()
    }
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(mut self, path: &str, status: u16, body: Value) -> Self {
        self.routes.insert(
            path.to_string(),
            Canned {
                status,
                content_type: "application/json",
                body: serde_json::to_vec(&body).unwrap(),
            },
        );
        self
    }

    pub fn raw(mut self, path: &str, status: u16, content_type: &'static str, body: &[u8]) -> Self {
        self.routes.insert(
            path.to_string(),
            Canned {
                status,
                content_type,
                body: body.to_vec(),
            },
        );
        self
    }

    /// Holds requests to `path` for `delay` before answering.
    pub fn stall(mut self, path: &str, delay: Duration) -> Self {
        self.stall = Some((path.to_string(), delay));
        self
    }

    pub fn start(self) -> RunningStub {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let recorded = hits.clone();
        let routes = Arc::new(self.routes);
        let stall = Arc::new(self.stall);

        let filter = warp::post()
            .and(warp::path::full())
            .and(warp::header::optional::<String>("content-type"))
            .and(warp::body::bytes())
            .and_then(
                move |path: FullPath, content_type: Option<String>, body: Bytes| {
                    let recorded = recorded.clone();
                    let routes = routes.clone();
                    let stall = stall.clone();
                    async move {
                        let path = path.as_str().to_string();
                        recorded.lock().unwrap().push(Hit {
                            path: path.clone(),
                            content_type,
                            body: body.to_vec(),
                        });
                        if let Some((stalled, delay)) = stall.as_ref() {
                            if *stalled == path {
                                tokio::time::sleep(*delay).await;
                            }
                        }
                        let canned = routes.get(&path).cloned().unwrap_or(Canned {
                            status: 404,
                            content_type: "application/json",
                            body: br#"{"error":"not_found"}"#.to_vec(),
                        });
                        let response = Response::builder()
                            .status(canned.status)
                            .header("content-type", canned.content_type)
                            .body(canned.body)
                            .unwrap();
                        Ok::<_, Infallible>(response)
                    }
                },
            );

        let (addr, server) = warp::serve(filter).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        RunningStub { addr, hits }
    }
}

pub fn room(name: &str, x: f64, y: f64, w: f64, h: f64) -> Value {
    json!({
        "name": name,
        "bbox_px": [x * 40.0, y * 40.0, w * 40.0, h * 40.0],
        "x_m": x, "y_m": y, "w_m": w, "h_m": h, "area_m2": w * h
    })
}

pub fn processed_json() -> Value {
    json!({
        "plot_bbox_px": [0, 0, 620, 480],
        "meters_per_px": 0.025,
        "layout": [
            room("Room_1", 0.0, 0.0, 6.0, 5.0),
            room("Room_2", 6.0, 0.0, 4.0, 3.0),
            room("Room_3", 6.0, 3.0, 4.0, 2.5)
        ],
        "wall_lines": [{"x1": 0, "y1": 0, "x2": 620, "y2": 0}],
        "openings": [],
        "dxf_path": "/tmp/tmpabc.dxf"
    })
}

pub fn plan_json(score: u8) -> Value {
    json!({
        "rooms": [
            room("Living Room", 0.0, 0.0, 6.0, 5.0),
            room("Master Bedroom", 6.0, 0.0, 4.0, 3.0),
            room("Kitchen", 6.0, 3.0, 4.0, 2.5)
        ],
        "vastu_score": score,
        "suggestions": ["Consider repositioning the kitchen to the southeast corner for better Vastu compliance"],
        "svg_content": "<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>",
        "total_area": 52.0
    })
}

/// Plan in the shape the generation endpoint returns, with the scoring fields
/// under `metadata`.
pub fn nested_plan_json(score: u8) -> Value {
    json!({
        "rooms": [
            room("Living Room", 0.0, 0.0, 6.0, 5.0),
            room("Kitchen", 6.0, 3.0, 4.0, 2.5)
        ],
        "metadata": {
            "total_area": 40.0,
            "vastu_score": score,
            "suggestions": ["Good entrance placement"]
        },
        "svg_data": "<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>"
    })
}

pub fn processed_plot() -> ProcessedPlot {
    serde_json::from_value(processed_json()).unwrap()
}

pub fn generated_plan(score: u8) -> GeneratedPlan {
    serde_json::from_value(plan_json(score)).unwrap()
}

pub fn submission() -> PlotSubmission {
    let image = ImageUpload::from_bytes("plot.png", "image/png", b"\x89PNG\r\n\x1a\nstub".to_vec());
    PlotSubmission::new(image, 15.5, 12.0).unwrap()
}
