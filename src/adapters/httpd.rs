//! Camera snapshot HTTP endpoint.
//!
//! One unauthenticated `GET /` that returns the latest JPEG frame, or 500
//! when the camera is absent or the capture fails.  Device-only: there is
//! nothing to serve in the host simulation.

#![cfg(target_os = "espidf")]

use std::sync::{Arc, Mutex};

use anyhow::Context;
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::http::Method;
use esp_idf_svc::io::Write;
use log::info;

use crate::drivers::camera::Camera;

pub struct CameraServer {
    // Handlers are torn down when the server drops; keep it alive.
    _server: EspHttpServer<'static>,
}

pub fn start(camera: Arc<Mutex<Camera>>) -> anyhow::Result<CameraServer> {
    let mut server =
        EspHttpServer::new(&Configuration::default()).context("failed to start HTTP server")?;

    server
        .fn_handler("/", Method::Get, move |req| -> anyhow::Result<()> {
            let frame = camera.lock().ok().and_then(|mut cam| cam.capture_jpeg());
            match frame {
                Some(jpeg) => {
                    let mut rsp = req.into_response(
                        200,
                        Some("OK"),
                        &[
                            ("Content-Type", "image/jpeg"),
                            ("Content-Disposition", "inline; filename=capture.jpg"),
                        ],
                    )?;
                    rsp.write_all(&jpeg)?;
                    info!("served {} B JPEG", jpeg.len());
                }
                None => {
                    req.into_status_response(500)?;
                }
            }
            Ok(())
        })
        .context("adding GET / handler")?;

    info!("camera endpoint listening on port 80");
    Ok(CameraServer { _server: server })
}
