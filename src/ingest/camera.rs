use std::io::Read;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use rand::Rng;
use url::Url;

use crate::frame::Frame;

const MAX_JPEG_BYTES: usize = 5 * 1024 * 1024;

/// Configuration for a camera source.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    /// Source URL. `stub://` for synthetic frames, `http(s)://` for MJPEG or
    /// single-JPEG snapshot endpoints.
    pub url: String,
    /// Target frame rate; the source decimates to this rate.
    pub target_fps: u32,
    /// Frame width (synthetic frames only; HTTP frames keep their own size).
    pub width: u32,
    /// Frame height (synthetic frames only).
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            url: "stub://road_camera".to_string(),
            target_fps: 10,
            width: 640,
            height: 480,
        }
    }
}

/// Camera frame source.
pub struct CameraSource {
    backend: CameraBackend,
}

enum CameraBackend {
    Synthetic(SyntheticCamera),
    Http(HttpCamera),
}

impl CameraSource {
    pub fn new(config: CameraConfig) -> Result<Self> {
        if config.url.starts_with("stub://") {
            return Ok(Self {
                backend: CameraBackend::Synthetic(SyntheticCamera::new(config)),
            });
        }

        let url = Url::parse(&config.url).context("parse camera url")?;
        match url.scheme() {
            "http" | "https" => Ok(Self {
                backend: CameraBackend::Http(HttpCamera::new(config)),
            }),
            other => Err(anyhow!(
                "unsupported camera scheme '{}'; expected stub or http(s)",
                other
            )),
        }
    }

    /// Open the source. Failure here is fatal for the run.
    pub fn connect(&mut self) -> Result<()> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.connect(),
            CameraBackend::Http(source) => source.connect(),
        }
    }

    /// Capture the next frame at the decimated rate.
    pub fn next_frame(&mut self) -> Result<Frame> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.next_frame(),
            CameraBackend::Http(source) => source.next_frame(),
        }
    }

    /// Check if the source is still delivering frames.
    pub fn is_healthy(&self) -> bool {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.is_healthy(),
            CameraBackend::Http(source) => source.is_healthy(),
        }
    }

    pub fn stats(&self) -> CameraStats {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.stats(),
            CameraBackend::Http(source) => source.stats(),
        }
    }
}

/// Statistics for a camera source.
#[derive(Clone, Debug)]
pub struct CameraStats {
    pub frames_captured: u64,
    pub url: String,
}

// ----------------------------------------------------------------------------
// Synthetic source (stub://)
// ----------------------------------------------------------------------------

struct SyntheticCamera {
    config: CameraConfig,
    frame_count: u64,
}

impl SyntheticCamera {
    fn new(config: CameraConfig) -> Self {
        Self {
            config,
            frame_count: 0,
        }
    }

    fn connect(&mut self) -> Result<()> {
        log::info!("camera: connected to {} (synthetic)", self.config.url);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        self.frame_count += 1;
        Ok(Frame::new(
            self.generate_pixels(),
            self.config.width,
            self.config.height,
        ))
    }

    /// Flat asphalt-grey scene with per-frame sensor noise, enough to keep
    /// downstream consumers honest about frame-to-frame variation.
    fn generate_pixels(&mut self) -> Vec<u8> {
        let len = Frame::expected_len(self.config.width, self.config.height);
        let mut rng = rand::thread_rng();
        let mut pixels = vec![0u8; len];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            let base = ((i as u64 / 3 + self.frame_count) % 32) as u8 + 96;
            *pixel = base.wrapping_add(rng.gen_range(0..4));
        }
        pixels
    }

    fn is_healthy(&self) -> bool {
        true
    }

    fn stats(&self) -> CameraStats {
        CameraStats {
            frames_captured: self.frame_count,
            url: self.config.url.clone(),
        }
    }
}

// ----------------------------------------------------------------------------
// HTTP source: MJPEG stream or single-JPEG snapshot endpoint
// ----------------------------------------------------------------------------

struct HttpCamera {
    config: CameraConfig,
    stream: Option<HttpStream>,
    last_frame_at: Option<Instant>,
    connected_at: Option<Instant>,
    frame_count: u64,
}

enum HttpStream {
    Mjpeg(MjpegStream),
    SingleJpeg,
}

impl HttpCamera {
    fn new(config: CameraConfig) -> Self {
        Self {
            config,
            stream: None,
            last_frame_at: None,
            connected_at: None,
            frame_count: 0,
        }
    }

    fn connect(&mut self) -> Result<()> {
        let response = ureq::get(&self.config.url)
            .call()
            .context("connect to camera http stream")?;
        let content_type = response.header("Content-Type").unwrap_or("");
        if content_type.to_lowercase().contains("multipart") {
            let reader = response.into_reader();
            self.stream = Some(HttpStream::Mjpeg(MjpegStream::new(reader)));
        } else {
            self.stream = Some(HttpStream::SingleJpeg);
        }
        self.connected_at = Some(Instant::now());
        log::info!("camera: connected to {}", self.config.url);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| anyhow!("camera not connected; call connect() first"))?;
        let min_interval = frame_interval(self.config.target_fps);

        loop {
            let jpeg_bytes = match stream {
                HttpStream::Mjpeg(stream) => stream.read_next_jpeg(),
                HttpStream::SingleJpeg => fetch_single_jpeg(&self.config.url),
            }?;

            let now = Instant::now();
            if let Some(last) = self.last_frame_at {
                if now.duration_since(last) < min_interval {
                    continue;
                }
            }

            let (pixels, width, height) = decode_jpeg(&jpeg_bytes)?;
            self.frame_count += 1;
            self.last_frame_at = Some(now);

            return Ok(Frame::new(pixels, width, height));
        }
    }

    fn is_healthy(&self) -> bool {
        let Some(connected_at) = self.connected_at else {
            return false;
        };
        let Some(last_frame_at) = self.last_frame_at else {
            return connected_at.elapsed() <= Duration::from_secs(5);
        };
        last_frame_at.elapsed() <= health_grace(self.config.target_fps)
    }

    fn stats(&self) -> CameraStats {
        CameraStats {
            frames_captured: self.frame_count,
            url: self.config.url.clone(),
        }
    }
}

struct MjpegStream {
    reader: Box<dyn Read + Send>,
    buffer: Vec<u8>,
}

impl MjpegStream {
    fn new(reader: Box<dyn Read + Send>) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(64 * 1024),
        }
    }

    fn read_next_jpeg(&mut self) -> Result<Vec<u8>> {
        let mut chunk = vec![0u8; 8192];
        loop {
            if let Some((start, end)) = find_jpeg_bounds(&self.buffer) {
                let frame = self.buffer[start..end].to_vec();
                self.buffer.drain(..end);
                return Ok(frame);
            }

            let read = self.reader.read(&mut chunk).context("read mjpeg chunk")?;
            if read == 0 {
                return Err(anyhow!("mjpeg stream ended"));
            }
            self.buffer.extend_from_slice(&chunk[..read]);

            if self.buffer.len() > MAX_JPEG_BYTES * 2 {
                let keep = 2.min(self.buffer.len());
                let drain_len = self.buffer.len() - keep;
                self.buffer.drain(..drain_len);
            }
        }
    }
}

fn fetch_single_jpeg(url: &str) -> Result<Vec<u8>> {
    let response = ureq::get(url)
        .call()
        .with_context(|| format!("fetch jpeg snapshot from {}", url))?;
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .context("read jpeg snapshot")?;
    if bytes.is_empty() {
        return Err(anyhow!("empty jpeg snapshot"));
    }
    Ok(bytes)
}

fn decode_jpeg(bytes: &[u8]) -> Result<(Vec<u8>, u32, u32)> {
    let image = image::load_from_memory(bytes).context("decode jpeg")?;
    let rgb = image.into_rgb8();
    let (width, height) = rgb.dimensions();
    Ok((rgb.into_raw(), width, height))
}

fn find_jpeg_bounds(buffer: &[u8]) -> Option<(usize, usize)> {
    let start = buffer.windows(2).position(|w| w == [0xFF, 0xD8])?;
    let end = buffer[start + 2..]
        .windows(2)
        .position(|w| w == [0xFF, 0xD9])?;
    Some((start, start + 2 + end + 2))
}

fn frame_interval(target_fps: u32) -> Duration {
    if target_fps == 0 {
        Duration::from_millis(0)
    } else {
        Duration::from_millis((1000 / target_fps).max(1) as u64)
    }
}

fn health_grace(target_fps: u32) -> Duration {
    let base_ms = if target_fps == 0 {
        2_000
    } else {
        (1000 / target_fps).saturating_mul(6)
    };
    Duration::from_millis(base_ms.max(2_000) as u64)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn stub_config() -> CameraConfig {
        CameraConfig {
            url: "stub://test".to_string(),
            target_fps: 10,
            width: 640,
            height: 480,
        }
    }

    #[test]
    fn synthetic_source_produces_frames() -> Result<()> {
        let mut source = CameraSource::new(stub_config())?;
        source.connect()?;

        let frame = source.next_frame()?;
        assert_eq!(frame.width, 640);
        assert_eq!(frame.height, 480);
        assert_eq!(frame.pixels.len(), Frame::expected_len(640, 480));
        assert!(source.is_healthy());
        assert_eq!(source.stats().frames_captured, 1);

        Ok(())
    }

    #[test]
    fn rejects_unknown_scheme() {
        let config = CameraConfig {
            url: "rtsp://camera-1".to_string(),
            ..stub_config()
        };
        assert!(CameraSource::new(config).is_err());
    }

    #[test]
    fn jpeg_bounds_are_found_mid_buffer() {
        let mut buffer = vec![0x00, 0x01];
        buffer.extend_from_slice(&[0xFF, 0xD8, 0xAA, 0xBB, 0xFF, 0xD9]);
        buffer.extend_from_slice(&[0x02]);

        let (start, end) = find_jpeg_bounds(&buffer).unwrap();
        assert_eq!(&buffer[start..end], &[0xFF, 0xD8, 0xAA, 0xBB, 0xFF, 0xD9]);
    }

    #[test]
    fn jpeg_bounds_require_terminator() {
        assert!(find_jpeg_bounds(&[0xFF, 0xD8, 0xAA]).is_none());
        assert!(find_jpeg_bounds(&[0xAA, 0xBB]).is_none());
    }
}
