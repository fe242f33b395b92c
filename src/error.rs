//! Error taxonomy.
//!
//! Every fatal condition maps to one [`Error`] variant naming the stage that
//! failed, so the binary can report "graph registration" vs "command
//! dispatch" without inspecting the cause.

use std::time::Duration;

use thiserror::Error;

/// Failure talking to the synthesis engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    #[error("osc codec error: {0}")]
    Osc(String),

    #[error("engine rejected {command}: {reason}")]
    Failed { command: String, reason: String },

    #[error("no reply to {command} within {timeout:?}")]
    Timeout { command: String, timeout: Duration },
}

/// Failure finding or opening the MIDI input.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("midi backend unavailable: {0}")]
    Init(String),

    #[error("no midi input matching {0:?} detected")]
    NotFound(String),

    #[error("failed to open {name:?}: {reason}")]
    Connect { name: String, reason: String },
}

/// A malformed message from the input stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("empty midi message")]
    Empty,

    #[error("data byte {0:#04x} where a status byte was expected")]
    MissingStatus(u8),

    #[error("status {status:#04x} needs {expected} data bytes, got {got}")]
    Truncated { status: u8, expected: usize, got: usize },
}

/// Top-level error: which stage of the organ failed, and why.
#[derive(Debug, Error)]
pub enum Error {
    #[error("device discovery failed: {0}")]
    Device(#[from] DeviceError),

    #[error("graph registration failed for {name:?}: {source}")]
    Registration {
        name: String,
        #[source]
        source: EngineError,
    },

    #[error("group creation failed: {0}")]
    Group(#[source] EngineError),

    #[error("master bus setup failed: {0}")]
    Master(#[source] EngineError),

    #[error("input stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("command dispatch failed: {0}")]
    Command(#[source] EngineError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
