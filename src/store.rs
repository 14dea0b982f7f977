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

use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use chrono::DateTime;
use chrono::Utc;
use walkdir::WalkDir;

use crate::error::Fallible;
use crate::error::fail;
use crate::parser::parse_topics;
use crate::parser::write_schedule;
use crate::types::schedule::Schedule;
use crate::types::topic::TopicCard;

/// Discovers topics embedded in a directory of Markdown notes and writes
/// scheduling state back into them.
///
/// The store holds no state of its own: every scan walks the directory and
/// rebuilds all cards from the note text.
pub struct TopicStore {
    directory: PathBuf,
}

impl TopicStore {
    pub fn new(directory: impl Into<PathBuf>) -> Fallible<Self> {
        let directory: PathBuf = directory.into();
        if !directory.exists() {
            return fail("directory does not exist.");
        }
        let directory = directory.canonicalize()?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Scan every note in the directory for topics.
    pub fn all_topics(&self, now: DateTime<Utc>) -> Fallible<Vec<TopicCard>> {
        log::debug!("Scanning {:?} for topics...", self.directory);
        let start = Instant::now();
        let mut topics = Vec::new();
        for entry in WalkDir::new(&self.directory) {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
                let content = std::fs::read_to_string(path)?;
                for parsed in parse_topics(&content, now) {
                    topics.push(TopicCard::new(
                        parsed.name,
                        path.to_path_buf(),
                        content.clone(),
                        parsed.schedule,
                    ));
                }
            }
        }
        let duration = start.elapsed().as_millis();
        log::debug!("Found {} topics in {duration}ms.", topics.len());
        Ok(topics)
    }

    /// All topics whose next review time has passed.
    pub fn due_topics(&self, now: DateTime<Utc>) -> Fallible<Vec<TopicCard>> {
        let topics = self.all_topics(now)?;
        Ok(topics.into_iter().filter(|t| t.is_due(now)).collect())
    }

    /// Write a topic's new schedule back into its note.
    ///
    /// The note is re-read at write time so edits made since discovery are
    /// not clobbered: the rewrite is a single read-modify-write of the full
    /// text, and only the encoded comment line changes. If the marker has
    /// vanished in the meantime the update is discarded and reported.
    pub fn persist(&self, topic: &TopicCard, schedule: &Schedule) -> Fallible<()> {
        let content = std::fs::read_to_string(topic.path())?;
        let updated = write_schedule(&content, topic.name(), schedule)?;
        std::fs::write(topic.path(), updated)?;
        log::debug!(
            "{} {} S={:.2}d D={:.2} due={}",
            topic.name(),
            schedule.rating.map(|r| r.as_str()).unwrap_or("new"),
            schedule.stability,
            schedule.difficulty,
            schedule.next_review.date_naive()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::TimeZone;
    use tempfile::tempdir;

    use super::*;
    use crate::error::Error;
    use crate::types::rating::Rating;

    fn write_note(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_new_on_missing_directory() {
        let result = TopicStore::new("./derpherp");
        assert!(result.is_err());
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), "error: directory does not exist.");
    }

    #[test]
    fn test_scan_across_notes() {
        let dir = tempdir().unwrap();
        write_note(
            dir.path(),
            "algebra.md",
            "> [!topic] Rings\n\nRing notes.\n",
        );
        write_note(
            dir.path(),
            "analysis.md",
            "> [!topic] Limits\n> <!--2026-09-02,good,3,2.5,5.0,1-->\n\nLimit notes.\n",
        );
        write_note(dir.path(), "scratch.txt", "> [!topic] Ignored\n");

        let now = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();
        let store = TopicStore::new(dir.path()).unwrap();
        let mut topics = store.all_topics(now).unwrap();
        topics.sort_by(|a, b| a.name().cmp(b.name()));

        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].name(), "Limits");
        assert_eq!(topics[0].schedule().rating, Some(Rating::Good));
        assert!(topics[0].content().contains("Limit notes."));
        assert_eq!(topics[1].name(), "Rings");
        assert!(topics[1].is_new());
    }

    #[test]
    fn test_due_filtering_boundary() {
        let dir = tempdir().unwrap();
        // Due exactly at midnight on the 30th.
        write_note(
            dir.path(),
            "due.md",
            "> [!topic] Due\n> <!--2026-08-30,good,3,2.5,5.0,1-->\n",
        );
        write_note(
            dir.path(),
            "future.md",
            "> [!topic] Future\n> <!--2026-08-31,good,3,2.5,5.0,1-->\n",
        );
        let store = TopicStore::new(dir.path()).unwrap();

        let midnight = Utc.with_ymd_and_hms(2026, 8, 30, 0, 0, 0).unwrap();

        // One second before the due timestamp: excluded.
        let due = store.due_topics(midnight - Duration::seconds(1)).unwrap();
        assert!(due.is_empty());

        // Exact equality: included.
        let due = store.due_topics(midnight).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].name(), "Due");

        // One second past: still just the one.
        let due = store.due_topics(midnight + Duration::seconds(1)).unwrap();
        assert_eq!(due.len(), 1);
    }

    #[test]
    fn test_persist_rewrites_note() {
        let dir = tempdir().unwrap();
        let path = write_note(
            dir.path(),
            "algebra.md",
            "# Algebra\n\n> [!topic] Rings\n\nRing notes.\n",
        );
        let now = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();
        let store = TopicStore::new(dir.path()).unwrap();
        let topics = store.all_topics(now).unwrap();
        assert_eq!(topics.len(), 1);

        let schedule = Schedule {
            next_review: Utc.with_ymd_and_hms(2026, 9, 2, 0, 0, 0).unwrap(),
            rating: Some(Rating::Hard),
            interval: 3,
            stability: 2.7,
            difficulty: 5.4,
            reps: 1,
        };
        store.persist(&topics[0], &schedule).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "# Algebra\n\n> [!topic] Rings\n> <!--2026-09-02,hard,3,2.7,5.4,1-->\n\nRing notes.\n"
        );

        // A fresh scan decodes the state we just wrote.
        let topics = store.all_topics(now).unwrap();
        assert_eq!(topics[0].schedule().rating, Some(Rating::Hard));
        assert_eq!(topics[0].schedule().reps, 1);
    }

    #[test]
    fn test_persist_marker_vanished() {
        let dir = tempdir().unwrap();
        let path = write_note(dir.path(), "algebra.md", "> [!topic] Rings\n");
        let now = Utc::now();
        let store = TopicStore::new(dir.path()).unwrap();
        let topics = store.all_topics(now).unwrap();

        // The learner edits the note mid-session.
        std::fs::write(&path, "nothing here anymore\n").unwrap();

        let schedule = Schedule::fresh(now);
        let result = store.persist(&topics[0], &schedule);
        match result {
            Err(Error::MarkerNotFound { topic }) => assert_eq!(topic, "Rings"),
            _ => panic!("Expected MarkerNotFound"),
        }
        // No partial write.
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "nothing here anymore\n");
    }
}
