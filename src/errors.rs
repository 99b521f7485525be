//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`SceneError`] covers all failure modes including:
//! - Malformed keyframe input (rejected at construction, never defaulted)
//! - Hierarchy and skinning misuse (missing bones, cycles)
//! - Shader compilation and template rendering failures
//! - Asset loading and decoding errors
//!
//! Out-of-range animation time queries are not errors: tracks clamp.
//!
//! ```rust,ignore
//! use dinoscene::errors::{SceneError, Result};
//!
//! fn build() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::render::ShaderKind;

/// The main error type for the crate.
#[derive(Error, Debug)]
pub enum SceneError {
    // ========================================================================
    // Keyframe Errors
    // ========================================================================
    /// A keyframe track was built from an empty key set.
    #[error("Keyframe track needs at least one key")]
    EmptyKeyframes,

    /// A key time is NaN or infinite.
    #[error("Keyframe time is not finite: {0}")]
    NonFiniteKeyTime(f32),

    /// Two keys share the same time.
    #[error("Duplicate keyframe time: {0}")]
    DuplicateKeyTime(f32),

    /// Times are not strictly increasing.
    #[error("Keyframe times are not strictly increasing at index {index}")]
    UnsortedKeyTimes {
        /// First offending index
        index: usize,
    },

    /// Times and values differ in length.
    #[error("Keyframe count mismatch: {times} times for {values} values")]
    MismatchedKeyframes {
        /// Number of times
        times: usize,
        /// Number of values
        values: usize,
    },

    /// One channel of a transform track is invalid.
    #[error("Invalid {channel} channel: {source}")]
    InvalidChannel {
        /// `translation`, `rotation` or `scale`
        channel: &'static str,
        /// Underlying track error
        #[source]
        source: Box<SceneError>,
    },

    // ========================================================================
    // Hierarchy & Skinning Errors
    // ========================================================================
    /// The node handle does not refer to a live node.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Attaching would make a node its own ancestor.
    #[error("Attaching '{child}' under '{parent}' would create a cycle")]
    HierarchyCycle {
        /// Name of the node being attached
        child: String,
        /// Name of the requested parent
        parent: String,
    },

    /// A skinned mesh names a bone that does not exist.
    #[error("Skinned mesh '{mesh}' references missing bone '{bone}'")]
    MissingBone {
        /// Mesh name
        mesh: String,
        /// Bone name or handle description
        bone: String,
    },

    /// A bone node does not record its world transform.
    #[error("Node '{0}' is used as a bone but does not publish its world transform")]
    BoneNotPublished(String),

    /// Bones and offset matrices are not paired 1:1.
    #[error("Skinned mesh '{mesh}' has {bones} bones but {offsets} offset matrices")]
    BoneOffsetMismatch {
        /// Mesh name
        mesh: String,
        /// Number of bones
        bones: usize,
        /// Number of offsets
        offsets: usize,
    },

    /// More bones than the skinning shader can address.
    #[error("Skinned mesh '{mesh}' has {count} bones (limit {limit})")]
    TooManyBones {
        /// Mesh name
        mesh: String,
        /// Number of bones
        count: usize,
        /// Shader limit
        limit: usize,
    },

    // ========================================================================
    // Shader Errors
    // ========================================================================
    /// A shader stage failed to compile.
    #[error("{stage} shader '{label}' failed to compile: {log}")]
    ShaderCompile {
        /// Program label
        label: String,
        /// `vertex` or `fragment`
        stage: &'static str,
        /// Backend info log
        log: String,
    },

    /// A program failed to link.
    #[error("Shader program '{label}' failed to link: {log}")]
    ShaderLink {
        /// Program label
        label: String,
        /// Backend info log
        log: String,
    },

    /// Template rendering failed.
    #[error("Shader template error: {0}")]
    ShaderTemplate(#[from] minijinja::Error),

    /// A drawable needs a program that was never compiled successfully.
    #[error("No compiled program for shader {0:?}")]
    MissingProgram(ShaderKind),

    // ========================================================================
    // Asset Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Asset content is structurally invalid.
    #[error("Invalid asset '{asset}': {reason}")]
    InvalidAsset {
        /// Asset identifier
        asset: String,
        /// What is wrong
        reason: String,
    },
}

impl SceneError {
    pub(crate) fn channel(channel: &'static str, source: SceneError) -> Self {
        SceneError::InvalidChannel {
            channel,
            source: Box::new(source),
        }
    }
}

/// Alias for `Result<T, SceneError>`.
pub type Result<T> = std::result::Result<T, SceneError>;
