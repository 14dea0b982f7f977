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

use std::path::PathBuf;

use chrono::DateTime;
use chrono::Utc;

use crate::types::schedule::Schedule;

/// One reviewable unit: a topic marker found in a note, together with the
/// full text of the note it lives in.
///
/// Cards are constructed fresh on every store scan; the only persistent
/// representation is the encoded comment inside the owning note.
#[derive(Clone, Debug)]
pub struct TopicCard {
    /// The topic name, unique within its note (first marker wins when
    /// duplicated).
    name: String,
    /// The absolute path to the note this topic was parsed from.
    path: PathBuf,
    /// The complete text of the owning note. The marker may sit anywhere;
    /// the whole note is the tutoring context.
    content: String,
    schedule: Schedule,
}

impl TopicCard {
    pub fn new(name: String, path: PathBuf, content: String, schedule: Schedule) -> Self {
        Self {
            name,
            path,
            content,
            schedule,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.schedule.is_due(now)
    }

    /// Whether the topic has never been reviewed.
    pub fn is_new(&self) -> bool {
        self.schedule.reps == 0
    }
}
