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

//! The completion service boundary: an ordered transcript in, one textual
//! reply out. Transport failures are reported here; decoding the reply
//! into a verdict is the session's job.

pub mod anthropic;

use crate::error::Fallible;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Role {
    System,
    Assistant,
    User,
}

#[derive(Clone, Debug)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// Optional output-shape constraint: a JSON schema the reply should
    /// conform to. Implementations that cannot enforce it may ignore it,
    /// in which case the caller falls back to scanning the reply text.
    pub schema: Option<serde_json::Value>,
}

pub trait CompletionService {
    /// Send the transcript and return the single reply. At most one call
    /// is in flight per session; the session enforces that.
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Fallible<String>> + Send;
}
