//! Dialogue manager — coordinates slot filling, routing, persistence,
//! and webhook delivery for each chat turn.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::notify::WebhookNotifier;
use crate::routing;
use crate::session::{DialogueStage, Session, SessionStore};
use crate::store::{Database, QueryRecord};

use super::extract::{MessageExtractor, looks_like_query};
use super::prompts;

/// The reply for one chat turn.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub session_id: Uuid,
    pub response: String,
}

/// What a turn decided, computed inside the session critical section.
#[derive(Debug)]
enum TurnOutcome {
    Reply(String),
    /// The turn completed the form. `submitted` was claimed under the
    /// lock, so the record is persisted and forwarded exactly once.
    Submit {
        record: QueryRecord,
        response: String,
    },
}

/// Coordinates the intake conversation.
pub struct DialogueManager {
    store: Arc<SessionStore>,
    db: Arc<dyn Database>,
    notifier: WebhookNotifier,
    extractor: MessageExtractor,
}

impl DialogueManager {
    pub fn new(store: Arc<SessionStore>, db: Arc<dyn Database>, notifier: WebhookNotifier) -> Self {
        Self {
            store,
            db,
            notifier,
            extractor: MessageExtractor::new(),
        }
    }

    /// Handle one chat turn. A missing or unknown session id starts a
    /// fresh session; the (possibly new) id is always returned so the
    /// client can carry it forward.
    pub async fn handle_message(&self, session_id: Option<Uuid>, message: &str) -> ChatReply {
        let text = message.trim();

        let (session_id, outcome) = self
            .store
            .with_session(session_id, |session| {
                take_turn(session, text, &self.extractor)
            })
            .await;

        let response = match outcome {
            TurnOutcome::Reply(response) => response,
            TurnOutcome::Submit { record, response } => {
                info!(
                    session_id = %session_id,
                    unit = %record.routed_unit,
                    "Query routed and submitted"
                );
                if let Err(e) = self.db.insert_query(&record).await {
                    error!(session_id = %session_id, error = %e, "Failed to persist query record");
                }
                if let Err(e) = self.notifier.send(&record).await {
                    error!(session_id = %session_id, error = %e, "Failed to deliver webhook");
                }
                response
            }
        };

        ChatReply {
            session_id,
            response,
        }
    }
}

/// Run one turn against a session: extract slots from the message, pick
/// the next prompt, and on the completing turn build the record.
fn take_turn(session: &mut Session, message: &str, ex: &MessageExtractor) -> TurnOutcome {
    if session.submitted {
        return TurnOutcome::Reply(prompts::already_submitted().to_string());
    }

    // Explicit start command, or a bare greeting before anything was
    // collected, shows the intro instead of consuming a slot.
    if message == prompts::START_COMMAND
        || (ex.is_greeting(message) && !session.has_any_field())
    {
        return TurnOutcome::Reply(prompts::greeting().to_string());
    }

    // Opportunistic extraction: the student may volunteer name and year
    // in any message, not just when prompted.
    if session.student_name.is_none() {
        if let Some(name) = ex.extract_name(message) {
            session.student_name = Some(name);
        }
    }
    if session.academic_year.is_none() {
        if let Some(year) = ex.extract_year(message) {
            session.academic_year = Some(year.to_string());
        }
    }
    if session.student_query.is_none() && !message.is_empty() && !ex.is_greeting(message) {
        let stripped = ex.strip_query_prefix(message);
        if !stripped.is_empty() && stripped != message {
            // An explicit "my query is ..." prefix always wins.
            session.student_query = Some(stripped.to_string());
        } else if ex.extract_name(message).is_none()
            && ex.extract_year(message).is_none()
            && looks_like_query(message)
        {
            session.student_query = Some(message.to_string());
        }
    }

    session.advance_stage();

    let name = session.student_name.clone().unwrap_or_default();
    match session.stage {
        DialogueStage::AwaitingName => TurnOutcome::Reply(prompts::ask_name().to_string()),
        DialogueStage::AwaitingYear => TurnOutcome::Reply(prompts::ask_year(&name)),
        DialogueStage::AwaitingQuery => TurnOutcome::Reply(prompts::ask_query(&name)),
        DialogueStage::Complete => {
            let query = session.student_query.clone().unwrap_or_default();
            let unit = *session.routed_unit.get_or_insert_with(|| routing::route(&query));

            // Claim the submission before the lock is released; concurrent
            // turns on this session will hit the submitted short-circuit.
            session.submitted = true;

            let record = QueryRecord {
                id: Uuid::new_v4(),
                student_name: name.clone(),
                academic_year: session.academic_year.clone().unwrap_or_default(),
                student_query: query,
                routed_unit: unit,
                timestamp: Utc::now(),
            };
            let response = prompts::confirmation(&name, unit.friendly_name());
            TurnOutcome::Submit { record, response }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::WebhookNotifier;
    use crate::routing::Unit;
    use crate::store::LibSqlBackend;
    use std::time::Duration;

    fn turn(session: &mut Session, message: &str) -> TurnOutcome {
        take_turn(session, message, &MessageExtractor::new())
    }

    fn reply_text(outcome: TurnOutcome) -> String {
        match outcome {
            TurnOutcome::Reply(text) => text,
            TurnOutcome::Submit { .. } => panic!("expected a plain reply"),
        }
    }

    #[test]
    fn start_command_greets() {
        let mut session = Session::new(Uuid::new_v4());
        let text = reply_text(turn(&mut session, "__start__"));
        assert!(text.contains("full name"));
        assert!(!session.has_any_field());
    }

    #[test]
    fn greeting_on_empty_session_greets() {
        let mut session = Session::new(Uuid::new_v4());
        let text = reply_text(turn(&mut session, "hello"));
        assert!(text.contains("full name"));
        assert!(session.student_query.is_none(), "greeting must not become the query");
    }

    #[test]
    fn happy_path_fills_slots_in_order() {
        let mut session = Session::new(Uuid::new_v4());

        let text = reply_text(turn(&mut session, "my name is Alice Smith"));
        assert_eq!(session.student_name.as_deref(), Some("Alice Smith"));
        assert_eq!(session.stage, DialogueStage::AwaitingYear);
        assert!(text.contains("Which education year"));

        let text = reply_text(turn(&mut session, "2nd year"));
        assert_eq!(session.academic_year.as_deref(), Some("2nd_year"));
        assert_eq!(session.stage, DialogueStage::AwaitingQuery);
        assert!(text.contains("describe your question"));

        let outcome = turn(&mut session, "My query is about hostel grievances");
        match outcome {
            TurnOutcome::Submit { record, response } => {
                assert_eq!(record.student_name, "Alice Smith");
                assert_eq!(record.academic_year, "2nd_year");
                // Prefix is stripped before storing
                assert_eq!(record.student_query, "about hostel grievances");
                assert_eq!(record.routed_unit, Unit::StudentWelfare);
                assert!(response.contains("Student Welfare Unit"));
            }
            TurnOutcome::Reply(text) => panic!("expected submit, got reply: {text}"),
        }
        assert!(session.submitted);
        assert_eq!(session.stage, DialogueStage::Complete);
    }

    #[test]
    fn record_only_emitted_when_all_slots_filled() {
        let mut session = Session::new(Uuid::new_v4());
        // A query-looking message with no name/year yet: query slot fills,
        // but no record until the other two arrive.
        let outcome = turn(&mut session, "when is the admission deadline?");
        assert!(matches!(outcome, TurnOutcome::Reply(_)));
        assert!(session.student_query.is_some());
        assert_eq!(session.stage, DialogueStage::AwaitingName);

        let outcome = turn(&mut session, "my name is Bob");
        assert!(matches!(outcome, TurnOutcome::Reply(_)));

        let outcome = turn(&mut session, "1st year");
        match outcome {
            TurnOutcome::Submit { record, .. } => {
                assert_eq!(record.routed_unit, Unit::AdmissionScholarship);
                assert_eq!(record.student_query, "when is the admission deadline?");
            }
            TurnOutcome::Reply(text) => panic!("expected submit, got reply: {text}"),
        }
    }

    #[test]
    fn completed_session_replies_already_submitted() {
        let mut session = Session::new(Uuid::new_v4());
        session.submitted = true;
        session.stage = DialogueStage::Complete;
        let text = reply_text(turn(&mut session, "another question about exams"));
        assert_eq!(text, prompts::already_submitted());
    }

    #[test]
    fn routing_happens_once_per_session() {
        let mut session = Session::new(Uuid::new_v4());
        session.student_name = Some("Alice".into());
        session.academic_year = Some("2nd_year".into());
        session.routed_unit = Some(Unit::CareerSkillDevelopment);

        // Query mentions hostel, but the pre-assigned unit must stick.
        let outcome = turn(&mut session, "hostel issue please help me");
        match outcome {
            TurnOutcome::Submit { record, .. } => {
                assert_eq!(record.routed_unit, Unit::CareerSkillDevelopment);
            }
            TurnOutcome::Reply(text) => panic!("expected submit, got reply: {text}"),
        }
    }

    #[test]
    fn short_noise_does_not_fill_query() {
        let mut session = Session::new(Uuid::new_v4());
        session.student_name = Some("Alice".into());
        let text = reply_text(turn(&mut session, "ok"));
        assert!(session.student_query.is_none());
        // Still waiting on the year
        assert!(text.contains("Which education year"));
    }

    #[tokio::test]
    async fn handle_message_persists_record() {
        let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let store = Arc::new(SessionStore::new(Duration::from_secs(3600)));
        let manager = DialogueManager::new(
            Arc::clone(&store),
            Arc::clone(&db) as Arc<dyn Database>,
            WebhookNotifier::new(None),
        );

        let reply = manager.handle_message(None, "my name is Alice Smith").await;
        let sid = reply.session_id;
        manager.handle_message(Some(sid), "2nd year").await;
        let reply = manager
            .handle_message(Some(sid), "my query is about exam grading")
            .await;
        assert!(reply.response.contains("Academic Support Unit"));

        let records = db.recent_queries(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].student_name, "Alice Smith");
        assert_eq!(records[0].routed_unit, Unit::AcademicSupport);
    }

    #[tokio::test]
    async fn resubmission_does_not_duplicate_record() {
        let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let store = Arc::new(SessionStore::new(Duration::from_secs(3600)));
        let manager = DialogueManager::new(
            Arc::clone(&store),
            Arc::clone(&db) as Arc<dyn Database>,
            WebhookNotifier::new(None),
        );

        let reply = manager.handle_message(None, "my name is Bob").await;
        let sid = reply.session_id;
        manager.handle_message(Some(sid), "3rd year").await;
        manager
            .handle_message(Some(sid), "need help with my resume please")
            .await;

        let reply = manager.handle_message(Some(sid), "one more thing about fees").await;
        assert_eq!(reply.response, prompts::already_submitted());

        let records = db.recent_queries(10).await.unwrap();
        assert_eq!(records.len(), 1);
    }
}
