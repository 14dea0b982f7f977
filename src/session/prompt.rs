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

use crate::types::rating::Rating;
use crate::types::topic::TopicCard;

/// Synthetic opening turn. The Messages API rejects an empty transcript,
/// so the first tutor turn is prompted by this fixed student message. It
/// is never shown to the learner.
pub const KICKOFF: &str = "I'm ready. Ask me the first question.";

/// Build the system instruction for one topic.
///
/// The instruction embeds the full note text as context and calibrates
/// question difficulty against the last rating: easier after again/hard,
/// harder after good/easy, level-gauging for a topic never reviewed. It
/// also pins down the dialogue shape the session state machine depends
/// on: one question, one answer, then a terminal rating.
pub fn build_instruction(topic: &TopicCard) -> String {
    let last_rating = match topic.schedule().rating {
        Some(rating) => rating.as_str(),
        None => "new",
    };
    let calibration = match topic.schedule().rating {
        None => {
            "This topic has never been reviewed, so ask a question that gauges \
             the student's level: neither trivial nor deep, something that \
             reveals how much of the material they hold."
        }
        Some(Rating::Again) | Some(Rating::Hard) => {
            "The student struggled last time, so ask an easier question than a \
             typical one for this material: prerequisites, definitions, or the \
             simplest core idea."
        }
        Some(Rating::Good) | Some(Rating::Easy) => {
            "The student did well last time, so ask a harder question than a \
             typical one for this material: application, synthesis, or an edge \
             case."
        }
    };

    format!(
        "You are a tutor quizzing a student on the topic \"{name}\". The \
         student's notes on this topic are below. Their last rating for it \
         was: {last_rating}.\n\
         \n\
         {calibration}\n\
         \n\
         Rules:\n\
         - Ask exactly one self-contained question per turn. Never a \
         multi-part question.\n\
         - The question must be answerable from understanding of the \
         material. Never ask the student to recall the literal text of \
         their notes, and never assume they can see the notes.\n\
         - Once the student answers, your very next turn MUST deliver a \
         short final assessment of the answer together with a rating. No \
         follow-up questions after an answer.\n\
         - Rate the answer as one of: \"again\" (could not answer), \
         \"hard\" (partially correct or hesitant), \"good\" (correct), \
         \"easy\" (correct, precise, effortless).\n\
         \n\
         Respond only with a JSON object of the form \
         {{\"message\": \"...\", \"rating\": null}} while asking, and \
         {{\"message\": \"...\", \"rating\": \"good\"}} (or another rating) \
         when assessing.\n\
         \n\
         The student's notes:\n\
         \n\
         {content}",
        name = topic.name(),
        last_rating = last_rating,
        calibration = calibration,
        content = topic.content(),
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::schedule::Schedule;

    fn topic(rating: Option<Rating>) -> TopicCard {
        let mut schedule = Schedule::fresh(Utc::now());
        if let Some(rating) = rating {
            schedule.rating = Some(rating);
            schedule.reps = 1;
        }
        TopicCard::new(
            "Ring homomorphisms".to_string(),
            "/notes/algebra.md".into(),
            "> [!topic] Ring homomorphisms\n\nA map preserving both operations.\n".to_string(),
            schedule,
        )
    }

    #[test]
    fn test_instruction_embeds_topic() {
        let instruction = build_instruction(&topic(None));
        assert!(instruction.contains("Ring homomorphisms"));
        assert!(instruction.contains("A map preserving both operations."));
        assert!(instruction.contains("was: new"));
    }

    #[test]
    fn test_calibration_new() {
        let instruction = build_instruction(&topic(None));
        assert!(instruction.contains("gauges"));
    }

    #[test]
    fn test_calibration_easier_after_failure() {
        for rating in [Rating::Again, Rating::Hard] {
            let instruction = build_instruction(&topic(Some(rating)));
            assert!(instruction.contains("easier question"));
        }
    }

    #[test]
    fn test_calibration_harder_after_success() {
        for rating in [Rating::Good, Rating::Easy] {
            let instruction = build_instruction(&topic(Some(rating)));
            assert!(instruction.contains("harder question"));
            assert!(instruction.contains(&format!("was: {}", rating.as_str())));
        }
    }
}
