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

//! Codec for the persisted topic format.
//!
//! A topic lives inside a Markdown callout, with its scheduling state on
//! the next line as an HTML comment:
//!
//! ```text
//! > [!topic] Ring homomorphisms
//! > <!--2026-03-01,good,3,2.5,5.0,1-->
//! ```
//!
//! The comment holds six comma-separated fields: next review date, rating
//! (empty for a never-reviewed topic), interval in days, stability,
//! difficulty, and review count. A missing or malformed comment means the
//! topic is new.

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;

use crate::error::Error;
use crate::error::Fallible;
use crate::types::rating::Rating;
use crate::types::schedule::Schedule;

const MARKER_TAG: &str = "[!topic]";

/// A topic marker found in a note, with the schedule decoded from the line
/// below it (or the fresh-topic default).
#[derive(Clone, Debug)]
pub struct ParsedTopic {
    pub name: String,
    pub schedule: Schedule,
}

/// If the line is a topic marker, return the topic name.
fn parse_marker(line: &str) -> Option<&str> {
    let body = line.trim_start().strip_prefix('>')?.trim_start();
    // `get` refuses short lines and offsets that are not char boundaries,
    // so multibyte quoted text never slices mid-character.
    let tag = body.get(..MARKER_TAG.len())?;
    if !tag.eq_ignore_ascii_case(MARKER_TAG) {
        return None;
    }
    let name = body[MARKER_TAG.len()..].trim();
    if name.is_empty() { None } else { Some(name) }
}

fn extract_payload(line: &str) -> Option<&str> {
    let body = line.trim().strip_prefix('>')?.trim();
    let body = body.strip_prefix("<!--")?;
    body.strip_suffix("-->")
}

/// Decode a schedule from an encoded-comment line. Returns `None` when the
/// line is not an encoded comment or the payload does not have six
/// well-formed fields.
fn decode_schedule(line: &str) -> Option<Schedule> {
    let payload = extract_payload(line)?;
    let fields: Vec<&str> = payload.split(',').map(|f| f.trim()).collect();
    if fields.len() != 6 {
        return None;
    }
    let date = NaiveDate::parse_from_str(fields[0], "%Y-%m-%d").ok()?;
    let next_review = date.and_hms_opt(0, 0, 0)?.and_utc();
    let rating = if fields[1].is_empty() {
        None
    } else {
        Some(Rating::parse(fields[1])?)
    };
    let interval: i64 = fields[2].parse().ok()?;
    let stability: f64 = fields[3].parse().ok()?;
    let difficulty: f64 = fields[4].parse().ok()?;
    let reps: i32 = fields[5].parse().ok()?;
    if interval < 1 || reps < 0 {
        return None;
    }
    if !stability.is_finite() || stability <= 0.0 {
        return None;
    }
    if !difficulty.is_finite() || !(1.0..=10.0).contains(&difficulty) {
        return None;
    }
    // A topic with a completed rating has at least one rep, and vice versa.
    if (reps == 0) != rating.is_none() {
        return None;
    }
    Some(Schedule {
        next_review,
        rating,
        interval,
        stability,
        difficulty,
        reps,
    })
}

/// Serialize a schedule into the encoded-comment line.
pub fn encode_schedule(schedule: &Schedule) -> String {
    let rating = match schedule.rating {
        Some(rating) => rating.as_str(),
        None => "",
    };
    format!(
        "> <!--{},{},{},{:.1},{:.1},{}-->",
        schedule.next_review.date_naive().format("%Y-%m-%d"),
        rating,
        schedule.interval,
        schedule.stability,
        schedule.difficulty,
        schedule.reps,
    )
}

/// Scan a note for topic markers. Each marker yields one topic; a marker
/// with no decodable comment below it is treated as new, due at `now`.
pub fn parse_topics(content: &str, now: DateTime<Utc>) -> Vec<ParsedTopic> {
    let lines: Vec<&str> = content.lines().collect();
    let mut topics = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if let Some(name) = parse_marker(line) {
            let schedule = lines
                .get(i + 1)
                .and_then(|next| decode_schedule(next))
                .unwrap_or_else(|| Schedule::fresh(now));
            topics.push(ParsedTopic {
                name: name.to_string(),
                schedule,
            });
        }
    }
    topics
}

/// Rewrite a note so the named topic carries the given schedule.
///
/// The first marker with an exact name match is updated: the line below it
/// is overwritten when it decodes as an encoded comment, otherwise a new
/// one is inserted above it. A blockquoted comment that is not a schedule
/// belongs to the learner and is never touched. Every other line is
/// preserved byte for byte. If a note holds two markers with the same
/// name, only the first is ever updated.
pub fn write_schedule(content: &str, name: &str, schedule: &Schedule) -> Fallible<String> {
    let had_trailing_newline = content.ends_with('\n');
    let mut lines: Vec<String> = content.lines().map(|l| l.to_string()).collect();

    let marker_index = lines
        .iter()
        .position(|line| parse_marker(line) == Some(name))
        .ok_or_else(|| Error::MarkerNotFound {
            topic: name.to_string(),
        })?;

    let encoded = encode_schedule(schedule);
    match lines.get(marker_index + 1) {
        Some(next) if decode_schedule(next).is_some() => {
            lines[marker_index + 1] = encoded;
        }
        _ => {
            lines.insert(marker_index + 1, encoded);
        }
    }

    let mut result = lines.join("\n");
    if had_trailing_newline {
        result.push('\n');
    }
    Ok(result)
}
