// Copyright 2026 the notedrill authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;

pub type Fallible<T> = Result<T, Error>;

/// Crate-wide error type.
///
/// The three session-facing variants (`Transport`, `MalformedOutput`,
/// `MarkerNotFound`) are fatal to the topic under review, never to the
/// engine: the learner can start a new session and the affected topic is
/// still due.
#[derive(Debug, Error)]
pub enum Error {
    #[error("error: {0}")]
    Report(String),

    #[error("error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("error: {0}")]
    Json(#[from] serde_json::Error),

    /// The ANTHROPIC_API_KEY environment variable is not set.
    #[error("error: API key not configured")]
    NoApiKey,

    /// The completion request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The completion service answered with a non-2xx status. The body is
    /// surfaced verbatim.
    #[error("completion service error (status {status}): {message}")]
    Transport { status: u16, message: String },

    /// The tutor's reply did not decode into a verdict. The raw reply is
    /// kept for diagnosis.
    #[error("malformed tutor reply: {raw}")]
    MalformedOutput { raw: String },

    /// The topic marker vanished between discovery and write-back, e.g.
    /// because the note was edited mid-session. The scheduling update is
    /// discarded rather than partially applied.
    #[error("topic marker not found: {topic}")]
    MarkerNotFound { topic: String },
}

pub fn fail<T>(message: &str) -> Fallible<T> {
    Err(Error::Report(message.to_string()))
}
