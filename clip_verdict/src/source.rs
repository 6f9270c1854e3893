use opencv::{core::Mat, core::Vector, imgcodecs, prelude::*, videoio};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("video source could not be opened: {0}")]
    Unreadable(String),
    #[error("failed to read frame: {0}")]
    ReadFrameFailed(opencv::Error),
    #[error("failed to encode frame: {0}")]
    EncodeFrameFailed(opencv::Error),
}

/// A finite, forward-only sequence of decoded frames.
///
/// `Ok(None)` means end of stream; `Err` means a mid-stream read failure.
/// The two outcomes must stay distinguishable so the pipeline can treat
/// a failure as a soft-stop rather than a clean end.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, DecodeError>;
}

/// Frame source backed by an OpenCV `VideoCapture` over a file on disk.
/// The capture handle is released on drop, on every exit path.
#[derive(Debug)]
pub struct VideoFile {
    capture: videoio::VideoCapture,
}

impl VideoFile {
    pub fn open(path: &Path) -> Result<Self, DecodeError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| DecodeError::Unreadable(format!("non-UTF8 path: {:?}", path)))?;
        let capture = videoio::VideoCapture::from_file(path_str, videoio::CAP_ANY)
            .map_err(|e| DecodeError::Unreadable(e.to_string()))?;
        let opened = capture
            .is_opened()
            .map_err(|e| DecodeError::Unreadable(e.to_string()))?;
        if !opened {
            return Err(DecodeError::Unreadable(format!(
                "no decoder accepted {}",
                path_str
            )));
        }
        Ok(Self { capture })
    }
}

impl FrameSource for VideoFile {
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, DecodeError> {
        let mut frame = Mat::default();
        let read = self
            .capture
            .read(&mut frame)
            .map_err(DecodeError::ReadFrameFailed)?;
        if !read || frame.empty() {
            return Ok(None);
        }
        let mut buf = Vector::<u8>::new();
        imgcodecs::imencode(".jpg", &frame, &mut buf, &Vector::new())
            .map_err(DecodeError::EncodeFrameFailed)?;
        Ok(Some(buf.into()))
    }
}
