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

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use rs_fsrs::Card;
use rs_fsrs::FSRS;
use rs_fsrs::Parameters;
use rs_fsrs::State;

use crate::types::rating::Rating;
use crate::types::schedule::Schedule;

/// The desired recall probability at review time.
const TARGET_RECALL: f64 = 0.9;

/// Spaced-repetition scheduler: a thin wrapper over FSRS.
///
/// Interval fuzz is on, to keep review dates from clustering; same-day
/// scheduling is off, so the minimum granularity is one day. The transition
/// is pure: no I/O, and deterministic up to the fuzz.
pub struct Scheduler {
    fsrs: FSRS,
}

impl Scheduler {
    pub fn new() -> Self {
        let fsrs = FSRS::new(Parameters {
            request_retention: TARGET_RECALL,
            enable_fuzz: true,
            enable_short_term: false,
            ..Default::default()
        });
        Self { fsrs }
    }

    /// Map (current state, rating, now) to the post-review state.
    ///
    /// The rating vocabulary maps one-to-one onto the four FSRS grades.
    /// The returned interval is floored at one day and `reps` is carried
    /// forward incremented.
    pub fn next(&self, schedule: &Schedule, rating: Rating, now: DateTime<Utc>) -> Schedule {
        debug_assert!(schedule.interval >= 1);
        debug_assert!(schedule.stability > 0.0);
        debug_assert!((1.0..=10.0).contains(&schedule.difficulty));
        debug_assert!(schedule.reps >= 0);

        let mut card = Card::new();
        card.due = schedule.next_review;
        card.stability = schedule.stability;
        card.difficulty = schedule.difficulty;
        card.scheduled_days = schedule.interval;
        card.reps = schedule.reps;
        card.state = if schedule.reps == 0 {
            State::New
        } else {
            State::Review
        };
        card.last_review = schedule.next_review - Duration::days(schedule.interval);

        let info = self.fsrs.next(card, now, rating.into());
        Schedule {
            next_review: info.card.due,
            rating: Some(rating),
            interval: info.card.scheduled_days.max(1),
            stability: info.card.stability,
            difficulty: info.card.difficulty,
            reps: schedule.reps + 1,
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
