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
use chrono::Utc;

use crate::types::rating::Rating;

/// Memory-model state for a single topic, as consumed and produced by the
/// scheduler.
///
/// `rating` is the outcome of the most recently completed review; `None`
/// means the topic has never been reviewed, in which case `reps` is zero.
#[derive(Clone, PartialEq, Debug)]
pub struct Schedule {
    /// When the topic next becomes due. Persisted at calendar-day
    /// granularity; a decoded value is midnight UTC of the stored date.
    pub next_review: DateTime<Utc>,
    pub rating: Option<Rating>,
    /// Days between the last review and `next_review`. Always at least 1.
    pub interval: i64,
    pub stability: f64,
    pub difficulty: f64,
    pub reps: i32,
}

impl Schedule {
    /// The state of a topic that has never been reviewed: due immediately.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            next_review: now,
            rating: None,
            interval: 1,
            stability: 2.5,
            difficulty: 5.0,
            reps: 0,
        }
    }

    /// A topic is due when its next review time has passed. Exact equality
    /// counts as due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_fresh_defaults() {
        let now = Utc::now();
        let schedule = Schedule::fresh(now);
        assert_eq!(schedule.next_review, now);
        assert_eq!(schedule.rating, None);
        assert_eq!(schedule.interval, 1);
        assert_eq!(schedule.stability, 2.5);
        assert_eq!(schedule.difficulty, 5.0);
        assert_eq!(schedule.reps, 0);
        assert!(schedule.is_due(now));
    }

    #[test]
    fn test_due_boundary() {
        let now = Utc::now();
        let mut schedule = Schedule::fresh(now);

        schedule.next_review = now + Duration::seconds(1);
        assert!(!schedule.is_due(now));

        schedule.next_review = now - Duration::seconds(1);
        assert!(schedule.is_due(now));

        schedule.next_review = now;
        assert!(schedule.is_due(now));
    }
}
