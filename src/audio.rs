//! Audio decode and playback.
//!
//! The speech backends hand us two distinct wire encodings: raw base64
//! PCM with no container header, and a standard compressed audio file.
//! Both decode into one [`AudioBuffer`] playable through the shared
//! output sink. Playback is a single-slot resource: starting a new
//! utterance stops the current one first.

use crate::speech::SpeechAudio;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::io::Cursor;
use thiserror::Error;

/// Sample rate of the primary provider's inline PCM payloads.
pub const PCM_SAMPLE_RATE: u32 = 24_000;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Base64 decode error: {0}")]
    Base64(String),

    #[error("Audio decode error: {0}")]
    Decode(String),

    #[error("Audio device error: {0}")]
    Device(String),

    #[error("Playback error: {0}")]
    Playback(String),
}

/// One playable in-memory buffer, whatever the wire encoding was.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

/// Decode base64 text to raw bytes.
pub fn decode_base64(data: &str) -> Result<Vec<u8>, AudioError> {
    BASE64
        .decode(data)
        .map_err(|e| AudioError::Base64(e.to_string()))
}

/// Reinterpret raw bytes as 16-bit signed little-endian samples,
/// normalized to the [-1.0, 1.0] range. A trailing odd byte is dropped.
pub fn pcm_to_samples(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| {
            let sample_i16 = i16::from_le_bytes([pair[0], pair[1]]);
            sample_i16 as f32 / 32768.0
        })
        .collect()
}

/// Turn a speech result into one playable buffer.
pub fn decode(audio: &SpeechAudio) -> Result<AudioBuffer, AudioError> {
    match audio {
        SpeechAudio::Pcm { data } => {
            let bytes = decode_base64(data)?;
            Ok(AudioBuffer {
                samples: pcm_to_samples(&bytes),
                channels: 1,
                sample_rate: PCM_SAMPLE_RATE,
            })
        }
        SpeechAudio::File { bytes } => {
            let decoder = Decoder::new(Cursor::new(bytes.clone()))
                .map_err(|e| AudioError::Decode(e.to_string()))?;
            let channels = decoder.channels();
            let sample_rate = decoder.sample_rate();
            let samples: Vec<f32> = decoder.convert_samples().collect();
            Ok(AudioBuffer {
                samples,
                channels,
                sample_rate,
            })
        }
    }
}

/// The shared audio output. One utterance at a time.
pub struct Player {
    _stream: OutputStream,
    _stream_handle: OutputStreamHandle,
    sink: Sink,
}

impl Player {
    /// Open the default output device.
    pub fn new() -> Result<Self, AudioError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| AudioError::Device(e.to_string()))?;
        let sink = Sink::try_new(&stream_handle).map_err(|e| AudioError::Playback(e.to_string()))?;
        log::debug!("Player: output sink ready");
        Ok(Self {
            _stream: stream,
            _stream_handle: stream_handle,
            sink,
        })
    }

    /// Start playing `buffer`, stopping whatever is currently audible.
    pub fn play(&self, buffer: AudioBuffer) {
        self.stop();
        if buffer.samples.is_empty() {
            return;
        }
        let source = SamplesBuffer::new(buffer.channels, buffer.sample_rate, buffer.samples);
        self.sink.append(source);
    }

    /// Stop playback immediately and discard the queued source.
    pub fn stop(&self) {
        self.sink.stop();
    }

    pub fn is_playing(&self) -> bool {
        !self.sink.empty()
    }

    /// Block until the current utterance has finished.
    pub fn wait(&self) {
        self.sink.sleep_until_end();
    }
}
