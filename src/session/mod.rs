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

//! The review session state machine.
//!
//! A session walks a queue of due topics. For each topic it holds a
//! bounded dialogue with the completion service: the tutor asks one
//! question, the student answers, and the very next tutor turn must carry
//! a terminal rating. That rating drives exactly one scheduler transition
//! and one store write-back, then the cursor advances.

pub mod prompt;
pub mod verdict;

use chrono::DateTime;
use chrono::Utc;

use crate::error::Fallible;
use crate::llm::ChatMessage;
use crate::llm::CompletionRequest;
use crate::llm::CompletionService;
use crate::scheduler::Scheduler;
use crate::session::verdict::Verdict;
use crate::store::TopicStore;
use crate::types::rating::Rating;
use crate::types::topic::TopicCard;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// No queue loaded, or the loaded queue was empty.
    Idle,
    /// A dialogue is in progress for the topic under the cursor.
    TopicActive,
    /// Every topic in the queue has been rated.
    Finished,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Speaker {
    Student,
    Tutor,
}

#[derive(Clone, Debug)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    /// The literal payload exchanged with the completion service, when it
    /// differs from the display text (tutor turns arrive as JSON).
    pub encoded_text: Option<String>,
}

/// What the hosting shell renders after a session command.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    NothingDue,
    TutorTurn {
        message: String,
        rating: Option<Rating>,
    },
    TopicFinished {
        name: String,
        next_review: DateTime<Utc>,
        interval: i64,
    },
    SessionFinished,
}

pub struct ReviewSession<C> {
    store: TopicStore,
    scheduler: Scheduler,
    completion: C,
    /// Immutable once loaded; only the cursor advances.
    queue: Vec<TopicCard>,
    cursor: usize,
    /// Dialogue for the current topic only; cleared on advance.
    transcript: Vec<TranscriptEntry>,
    /// True while a completion call is outstanding. Gates new calls:
    /// concurrent submissions are ignored, not queued.
    awaiting_reply: bool,
    /// Set when the current topic hit an error. Input stays disabled; the
    /// learner restarts the session and the topic is still due.
    halted: bool,
}

impl<C: CompletionService> ReviewSession<C> {
    pub fn new(store: TopicStore, scheduler: Scheduler, completion: C) -> Self {
        Self {
            store,
            scheduler,
            completion,
            queue: Vec::new(),
            cursor: 0,
            transcript: Vec::new(),
            awaiting_reply: false,
            halted: false,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.queue.is_empty() {
            Phase::Idle
        } else if self.cursor >= self.queue.len() {
            Phase::Finished
        } else {
            Phase::TopicActive
        }
    }

    pub fn queue(&self) -> &[TopicCard] {
        &self.queue
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn current_topic(&self) -> Option<&TopicCard> {
        self.queue.get(self.cursor)
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Install the topic queue and, if non-empty, immediately issue the
    /// opening tutor turn for the first topic.
    pub async fn load_queue(&mut self, topics: Vec<TopicCard>) -> Fallible<Vec<SessionEvent>> {
        self.queue = topics;
        self.cursor = 0;
        self.transcript.clear();
        self.halted = false;
        if self.queue.is_empty() {
            return Ok(vec![SessionEvent::NothingDue]);
        }
        self.run_tutor_turns().await
    }

    /// Record the student's answer and run the tutor's next turn. Ignored
    /// (empty event list) while no topic is active, while a reply is
    /// outstanding, or after the current topic halted on an error.
    pub async fn submit_student_reply(
        &mut self,
        text: impl Into<String>,
    ) -> Fallible<Vec<SessionEvent>> {
        if self.halted || self.awaiting_reply || self.phase() != Phase::TopicActive {
            return Ok(Vec::new());
        }
        self.transcript.push(TranscriptEntry {
            speaker: Speaker::Student,
            text: text.into(),
            encoded_text: None,
        });
        self.run_tutor_turns().await
    }

    /// Run tutor turns until one leaves the dialogue open (null rating)
    /// or the queue is exhausted. A terminal rating finalizes the topic
    /// synchronously, then the next topic's opening turn follows in the
    /// same pass.
    async fn run_tutor_turns(&mut self) -> Fallible<Vec<SessionEvent>> {
        let mut events = Vec::new();
        loop {
            let verdict = self.tutor_turn().await?;
            events.push(SessionEvent::TutorTurn {
                message: verdict.message.clone(),
                rating: verdict.rating,
            });
            let rating = match verdict.rating {
                None => break,
                Some(rating) => rating,
            };

            // Exactly one scheduling transition per topic.
            let topic = &self.queue[self.cursor];
            let schedule = self.scheduler.next(topic.schedule(), rating, Utc::now());
            if let Err(e) = self.store.persist(topic, &schedule) {
                self.halted = true;
                return Err(e);
            }
            events.push(SessionEvent::TopicFinished {
                name: topic.name().to_string(),
                next_review: schedule.next_review,
                interval: schedule.interval,
            });

            self.cursor += 1;
            self.transcript.clear();
            if self.cursor >= self.queue.len() {
                events.push(SessionEvent::SessionFinished);
                break;
            }
        }
        Ok(events)
    }

    /// One completion call: send the running transcript, decode the reply
    /// into a verdict, append it to the transcript.
    async fn tutor_turn(&mut self) -> Fallible<Verdict> {
        let request = self.build_request();
        self.awaiting_reply = true;
        let result = self.completion.complete(request).await;
        self.awaiting_reply = false;
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                self.halted = true;
                return Err(e);
            }
        };
        let verdict = match verdict::decode(&raw) {
            Ok(verdict) => verdict,
            Err(e) => {
                self.halted = true;
                return Err(e);
            }
        };
        self.transcript.push(TranscriptEntry {
            speaker: Speaker::Tutor,
            text: verdict.message.clone(),
            encoded_text: if raw.trim() == verdict.message {
                None
            } else {
                Some(raw)
            },
        });
        Ok(verdict)
    }

    fn build_request(&self) -> CompletionRequest {
        let topic = &self.queue[self.cursor];
        let mut messages = vec![
            ChatMessage::system(prompt::build_instruction(topic)),
            ChatMessage::user(prompt::KICKOFF),
        ];
        for entry in &self.transcript {
            let payload = entry.encoded_text.as_ref().unwrap_or(&entry.text).clone();
            messages.push(match entry.speaker {
                Speaker::Tutor => ChatMessage::assistant(payload),
                Speaker::Student => ChatMessage::user(payload),
            });
        }
        CompletionRequest {
            messages,
            schema: Some(verdict::schema()),
        }
    }
}
