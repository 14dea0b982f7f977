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

use std::fmt::Display;
use std::fmt::Formatter;
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use clap::ValueEnum;
use serde::Serialize;

use crate::error::Fallible;
use crate::llm::anthropic::Anthropic;
use crate::scheduler::Scheduler;
use crate::session::ReviewSession;
use crate::session::SessionEvent;
use crate::store::TopicStore;
use crate::types::topic::TopicCard;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Review due topics in a tutoring session.
    Review {
        /// Optional path to the notes directory.
        directory: Option<String>,
        /// Override the completion model.
        #[arg(long)]
        model: Option<String>,
    },
    /// List every topic and its scheduling state.
    List {
        /// Optional path to the notes directory.
        directory: Option<String>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = ListFormat::Plain)]
        format: ListFormat,
    },
}

#[derive(ValueEnum, Clone)]
enum ListFormat {
    /// One line per topic.
    Plain,
    /// JSON output.
    Json,
}

impl Display for ListFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ListFormat::Plain => write!(f, "plain"),
            ListFormat::Json => write!(f, "json"),
        }
    }
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Review { directory, model } => review(directory, model).await,
        Command::List { directory, format } => list(directory, format),
    }
}

fn resolve_directory(directory: Option<String>) -> Fallible<PathBuf> {
    match directory {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Ok(std::env::current_dir()?),
    }
}

async fn review(directory: Option<String>, model: Option<String>) -> Fallible<()> {
    let store = TopicStore::new(resolve_directory(directory)?)?;
    let now = Utc::now();
    let mut due = store.due_topics(now)?;
    if due.is_empty() {
        println!("No topics due today.");
        return Ok(());
    }
    // Longest-overdue first.
    due.sort_by_key(|t| t.schedule().next_review);
    println!("{} topic(s) due.", due.len());

    let mut client = Anthropic::from_env()?;
    if let Some(model) = model {
        client = client.with_model(model);
    }
    let mut session = ReviewSession::new(store, Scheduler::new(), client);

    let mut events = session.load_queue(due).await?;
    loop {
        if render_events(&events) {
            return Ok(());
        }
        let line = match read_student_line()? {
            Some(line) => line,
            None => {
                // Stdin closed; unfinished topics stay due.
                println!("Session ended.");
                return Ok(());
            }
        };
        events = session.submit_student_reply(line).await?;
    }
}

/// Print session events. Returns true once the session is over.
fn render_events(events: &[SessionEvent]) -> bool {
    for event in events {
        match event {
            SessionEvent::NothingDue => {
                println!("No topics due today.");
                return true;
            }
            SessionEvent::TutorTurn { message, .. } => {
                println!("\n{message}");
            }
            SessionEvent::TopicFinished {
                name, interval, ..
            } => {
                println!("\n[{name}: next review in {interval} day(s).]");
            }
            SessionEvent::SessionFinished => {
                println!("\nAll topics reviewed.");
                return true;
            }
        }
    }
    false
}

/// Read one line from stdin. Returns None on EOF.
fn read_student_line() -> Fallible<Option<String>> {
    print!("\n> ");
    std::io::stdout().flush()?;
    let mut input = String::new();
    let bytes = std::io::stdin().read_line(&mut input)?;
    if bytes == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn list(directory: Option<String>, format: ListFormat) -> Fallible<()> {
    let store = TopicStore::new(resolve_directory(directory)?)?;
    let now = Utc::now();
    let mut topics = store.all_topics(now)?;
    topics.sort_by_key(|t| t.schedule().next_review);

    match format {
        ListFormat::Plain => {
            for topic in &topics {
                let marker = if topic.is_due(now) { "*" } else { " " };
                let rating = match topic.schedule().rating {
                    Some(rating) => rating.as_str(),
                    None => "new",
                };
                println!(
                    "{marker} {}  due {}  {rating}  reps {}",
                    topic.name(),
                    topic.schedule().next_review.date_naive(),
                    topic.schedule().reps,
                );
            }
        }
        ListFormat::Json => {
            let rows: Vec<TopicRow> = topics.iter().map(|t| TopicRow::new(t, now)).collect();
            let json = serde_json::to_string_pretty(&rows)?;
            println!("{json}");
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TopicRow {
    name: String,
    file: String,
    next_review: String,
    rating: Option<String>,
    interval_days: i64,
    stability: f64,
    difficulty: f64,
    reps: i32,
    due: bool,
}

impl TopicRow {
    fn new(topic: &TopicCard, now: chrono::DateTime<Utc>) -> Self {
        let schedule = topic.schedule();
        Self {
            name: topic.name().to_string(),
            file: topic.path().display().to_string(),
            next_review: schedule.next_review.date_naive().to_string(),
            rating: schedule.rating.map(|r| r.as_str().to_string()),
            interval_days: schedule.interval,
            stability: schedule.stability,
            difficulty: schedule.difficulty,
            reps: schedule.reps,
            due: topic.is_due(now),
        }
    }
}
