//! LLM-backed reasoner
//!
//! Renders a prompt per step, calls the model with step-specific tools, and
//! parses the tool calls back into domain types. Tool inputs are treated as
//! untrusted: anything that does not parse cleanly comes back as
//! [`ReasonError::Malformed`] and the step can be retried.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{ClauseRequest, ContextSet, InterpretOutcome, ReasonError, Reasoner};
use crate::candidates::SkeletonCandidate;
use crate::domain::{
    Answer, Clause, Importance, Question, QuestionKind, Section, SectionItem, Session, Skeleton,
    TurnRole,
};
use crate::llm::{CompletionRequest, LlmClient, Message, ToolCall, ToolDefinition};
use crate::prompts::PromptLoader;
use crate::scoring::completion_state;

/// Reasoner that fulfills every step with one LLM completion
pub struct LlmReasoner {
    llm: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    max_tokens: u32,
}

impl LlmReasoner {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: PromptLoader, max_tokens: u32) -> Self {
        Self { llm, prompts, max_tokens }
    }

    fn render<T: Serialize>(&self, template: &str, context: &T) -> Result<String, ReasonError> {
        self.prompts
            .render(template, context)
            .map_err(|e| ReasonError::Prompt(e.to_string()))
    }

    async fn complete_step(
        &self,
        system_prompt: String,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
    ) -> Result<crate::llm::CompletionResponse, ReasonError> {
        let request = CompletionRequest {
            system_prompt,
            messages,
            tools,
            max_tokens: self.max_tokens,
        };
        Ok(self.llm.complete(request).await?)
    }
}

/// Human-ish label for a document type id
fn type_label(id: &str) -> String {
    id.replace('-', " ")
}

fn context_json(session: &Session) -> String {
    serde_json::to_string_pretty(&session.context).unwrap_or_else(|_| "{}".to_string())
}

/// The dialogue as alternating chat messages
fn transcript(session: &Session) -> Vec<Message> {
    session
        .dialogue
        .iter()
        .map(|turn| match turn.role {
            TurnRole::User => Message::user(&turn.text),
            TurnRole::System => Message::assistant(&turn.text),
        })
        .collect()
}

/// Render a skeleton as an indented outline for prompts
fn outline_text(skeleton: &Skeleton) -> String {
    fn walk(section: &Section, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        out.push_str(&format!("{indent}- {} ({})\n", section.title, section.id));
        for item in &section.items {
            out.push_str(&format!("{indent}  * [{}] {}\n", item.importance, item.text));
        }
        for sub in &section.subsections {
            walk(sub, depth + 1, out);
        }
    }

    let mut text = String::new();
    for section in &skeleton.sections {
        walk(section, 0, &mut text);
    }
    text
}

fn candidates_text(candidates: &[SkeletonCandidate]) -> String {
    let mut text = String::new();
    for candidate in candidates {
        text.push_str(&format!("### {} (relevance {:.2})\n", candidate.source_id, candidate.score));
        text.push_str(&outline_text(&candidate.skeleton));
        text.push('\n');
    }
    text
}

fn parse_input<T: serde::de::DeserializeOwned>(call: &ToolCall) -> Result<T, ReasonError> {
    serde_json::from_value(call.input.clone())
        .map_err(|e| ReasonError::Malformed(format!("{} input: {}", call.name, e)))
}

// ---------------------------------------------------------------------------
// Prompt contexts
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct QuestionLine {
    id: String,
    text: String,
    tier: String,
    option_ids: String,
}

#[derive(Serialize)]
struct InterviewPromptContext {
    document_type_name: String,
    questions: Vec<QuestionLine>,
    context_json: String,
    must_answered: usize,
    must_total: usize,
    gate_ready: bool,
}

#[derive(Serialize)]
struct SkeletonPromptContext {
    document_type_name: String,
    context_json: String,
    candidates_text: String,
}

#[derive(Serialize)]
struct ReviewPromptContext {
    document_type_name: String,
    context_json: String,
    outline_text: String,
}

#[derive(Serialize)]
struct RequestLine {
    section_id: String,
    section_title: String,
    items: Vec<String>,
}

#[derive(Serialize)]
struct ClausesPromptContext {
    document_type_name: String,
    context_json: String,
    outline_text: String,
    requests: Vec<RequestLine>,
}

// ---------------------------------------------------------------------------
// Tool input wire types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RecordAnswerInput {
    question_id: String,
    value: Value,
    #[serde(default)]
    selected_option_ids: Vec<String>,
}

#[derive(Deserialize)]
struct SetContextInput {
    path: String,
    value: Value,
}

#[derive(Deserialize)]
struct SetReadinessInput {
    ready: bool,
}

#[derive(Deserialize)]
struct SetDocumentTypeInput {
    document_type: String,
}

#[derive(Deserialize)]
struct SkeletonInput {
    sections: Vec<WireSection>,
}

#[derive(Deserialize)]
struct WireSection {
    id: String,
    title: String,
    #[serde(default)]
    items: Vec<WireItem>,
    #[serde(default)]
    subsections: Vec<WireSection>,
}

/// Items arrive either as plain strings or `{text, importance}` objects
#[derive(Deserialize)]
#[serde(untagged)]
enum WireItem {
    Full {
        text: String,
        #[serde(default)]
        importance: Importance,
    },
    Text(String),
}

#[derive(Deserialize)]
struct ReviewPlanInput {
    questions: Vec<WireQuestion>,
}

#[derive(Deserialize)]
struct WireQuestion {
    #[serde(default)]
    id: Option<String>,
    text: String,
    #[serde(default)]
    kind: QuestionKind,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    options: Vec<WireOption>,
    #[serde(default)]
    affects: Vec<String>,
    #[serde(default)]
    order: Option<u32>,
}

#[derive(Deserialize)]
struct WireOption {
    id: String,
    label: String,
    #[serde(default)]
    value: Option<Value>,
}

#[derive(Deserialize)]
struct ClausesInput {
    clauses: Vec<WireClause>,
}

#[derive(Deserialize)]
struct WireClause {
    section_id: String,
    body: String,
}

fn convert_section(wire: WireSection) -> Section {
    Section {
        id: wire.id,
        title: wire.title,
        items: wire
            .items
            .into_iter()
            .map(|item| match item {
                WireItem::Full { text, importance } => SectionItem { text, importance },
                WireItem::Text(text) => SectionItem::new(text),
            })
            .collect(),
        subsections: wire.subsections.into_iter().map(convert_section).collect(),
    }
}

fn convert_question(wire: WireQuestion, index: usize) -> Question {
    let id = wire
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("rq-{}", index + 1));

    let affects = if wire.affects.is_empty() {
        vec![format!("review.{}", id.replace('-', "_"))]
    } else {
        wire.affects
    };

    Question {
        id: id.clone(),
        text: wire.text,
        kind: wire.kind,
        required: wire.required,
        required_level: None,
        options: wire
            .options
            .into_iter()
            .map(|o| crate::domain::QuestionOption {
                value: o.value.unwrap_or_else(|| Value::String(o.id.clone())),
                id: o.id,
                label: o.label,
            })
            .collect(),
        depends_on: Vec::new(),
        affects,
        order: wire.order,
    }
}

/// Reject proposals whose section ids collide anywhere in the tree
fn check_unique_ids(skeleton: &Skeleton) -> Result<(), ReasonError> {
    let mut seen = HashSet::new();
    for id in skeleton.section_ids() {
        if !seen.insert(id.to_string()) {
            return Err(ReasonError::Malformed(format!("duplicate section id: {id}")));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tool definitions
// ---------------------------------------------------------------------------

fn interview_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "record_answer",
            "Record the user's answer to one interview question. Call once per question answered.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "question_id": {
                        "type": "string",
                        "description": "Id of the question being answered"
                    },
                    "value": {
                        "description": "The answer. For choice questions with a qualification, pass {\"option\": id, \"details\": text}."
                    },
                    "selected_option_ids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Chosen option ids for single/multi questions"
                    }
                },
                "required": ["question_id", "value"]
            }),
        ),
        ToolDefinition::new(
            "set_document_context",
            "Record a fact that matters for drafting but fits no interview question.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Dot-separated context path, e.g. payment.late_fee"
                    },
                    "value": {
                        "description": "Value to store at the path"
                    }
                },
                "required": ["path", "value"]
            }),
        ),
        ToolDefinition::new(
            "set_readiness",
            "Declare whether enough has been gathered to propose the document outline.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "ready": { "type": "boolean" }
                },
                "required": ["ready"]
            }),
        ),
        ToolDefinition::new(
            "set_document_type",
            "Switch the session to a different document type. Only valid before an outline exists.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "document_type": {
                        "type": "string",
                        "description": "Catalog id of the document type"
                    }
                },
                "required": ["document_type"]
            }),
        ),
    ]
}

fn skeleton_tools() -> Vec<ToolDefinition> {
    let section_schema = serde_json::json!({
        "type": "object",
        "properties": {
            "id": { "type": "string", "description": "Stable lowercase-hyphenated id" },
            "title": { "type": "string" },
            "items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "text": { "type": "string" },
                        "importance": { "type": "string", "enum": ["core", "normal", "optional"] }
                    },
                    "required": ["text"]
                }
            },
            "subsections": { "type": "array" }
        },
        "required": ["id", "title"]
    });

    vec![ToolDefinition::new(
        "propose_skeleton",
        "Propose the complete section tree for the document.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "sections": { "type": "array", "items": section_schema }
            },
            "required": ["sections"]
        }),
    )]
}

fn review_tools() -> Vec<ToolDefinition> {
    vec![ToolDefinition::new(
        "propose_review_questions",
        "Propose the questions the user should answer about the outline.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "questions": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "text": { "type": "string" },
                            "kind": { "type": "string", "enum": ["text", "single", "multi"] },
                            "required": { "type": "boolean" },
                            "options": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "id": { "type": "string" },
                                        "label": { "type": "string" },
                                        "value": {}
                                    },
                                    "required": ["id", "label"]
                                }
                            },
                            "affects": { "type": "array", "items": { "type": "string" } },
                            "order": { "type": "integer" }
                        },
                        "required": ["text"]
                    }
                }
            },
            "required": ["questions"]
        }),
    )]
}

fn clause_tools() -> Vec<ToolDefinition> {
    vec![ToolDefinition::new(
        "draft_clauses",
        "Submit drafted bodies for the requested sections.",
        serde_json::json!({
            "type": "object",
            "properties": {
                "clauses": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "section_id": { "type": "string" },
                            "body": { "type": "string" }
                        },
                        "required": ["section_id", "body"]
                    }
                }
            },
            "required": ["clauses"]
        }),
    )]
}

// ---------------------------------------------------------------------------
// Trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl Reasoner for LlmReasoner {
    async fn interpret(
        &self,
        session: &Session,
        questions: &[Question],
    ) -> Result<InterpretOutcome, ReasonError> {
        let completion = completion_state(questions, &session.context);
        let context = InterviewPromptContext {
            document_type_name: type_label(&session.document_type),
            questions: questions
                .iter()
                .map(|q| QuestionLine {
                    id: q.id.clone(),
                    text: q.text.clone(),
                    tier: q.tier().to_string(),
                    option_ids: q
                        .options
                        .iter()
                        .map(|o| o.id.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                })
                .collect(),
            context_json: context_json(session),
            must_answered: completion.must_answered,
            must_total: completion.must_total,
            gate_ready: session.gate.ready_for_skeleton,
        };

        let system_prompt = self.render("interview", &context)?;
        let response = self
            .complete_step(system_prompt, transcript(session), interview_tools())
            .await?;

        let mut outcome = InterpretOutcome {
            reply: response.content.clone().unwrap_or_default(),
            ..Default::default()
        };

        for call in &response.tool_calls {
            match call.name.as_str() {
                "record_answer" => {
                    let input: RecordAnswerInput = parse_input(call)?;
                    outcome.answers.push(Answer {
                        question_id: input.question_id,
                        raw: input.value,
                        selected_option_ids: input.selected_option_ids,
                        normalized: None,
                    });
                }
                "set_document_context" => {
                    let input: SetContextInput = parse_input(call)?;
                    outcome.context_sets.push(ContextSet {
                        path: input.path,
                        value: input.value,
                    });
                }
                "set_readiness" => {
                    let input: SetReadinessInput = parse_input(call)?;
                    outcome.gate_ready = Some(input.ready);
                }
                "set_document_type" => {
                    let input: SetDocumentTypeInput = parse_input(call)?;
                    outcome.document_type = Some(input.document_type);
                }
                other => {
                    debug!(tool = other, "interpret: ignoring unknown tool call");
                }
            }
        }

        if outcome.reply.is_empty() {
            outcome.reply = if outcome.answers.is_empty() {
                "Could you tell me more?".to_string()
            } else {
                "Noted, thank you.".to_string()
            };
        }

        debug!(
            answers = outcome.answers.len(),
            context_sets = outcome.context_sets.len(),
            gate = ?outcome.gate_ready,
            "interpret: parsed outcome"
        );
        Ok(outcome)
    }

    async fn generate_skeleton(
        &self,
        session: &Session,
        candidates: &[SkeletonCandidate],
    ) -> Result<Skeleton, ReasonError> {
        let context = SkeletonPromptContext {
            document_type_name: type_label(&session.document_type),
            context_json: context_json(session),
            candidates_text: candidates_text(candidates),
        };

        let system_prompt = self.render("skeleton", &context)?;
        let response = self
            .complete_step(
                system_prompt,
                vec![Message::user("Propose the skeleton for this document now.")],
                skeleton_tools(),
            )
            .await?;

        let Some(call) = response.tool_call("propose_skeleton") else {
            return Err(ReasonError::Malformed(
                "skeleton step returned no proposal".to_string(),
            ));
        };
        let input: SkeletonInput = parse_input(call)?;
        if input.sections.is_empty() {
            return Err(ReasonError::Malformed("skeleton proposal has no sections".to_string()));
        }

        let skeleton = Skeleton::new(input.sections.into_iter().map(convert_section).collect());
        check_unique_ids(&skeleton)?;
        Ok(skeleton)
    }

    async fn plan_review(&self, session: &Session) -> Result<Vec<Question>, ReasonError> {
        let Some(skeleton) = session.stage.skeleton() else {
            return Err(ReasonError::Prompt("session has no skeleton to review".to_string()));
        };

        let context = ReviewPromptContext {
            document_type_name: type_label(&session.document_type),
            context_json: context_json(session),
            outline_text: outline_text(skeleton),
        };

        let system_prompt = self.render("review-plan", &context)?;
        let response = self
            .complete_step(
                system_prompt,
                vec![Message::user("Propose the review questions now.")],
                review_tools(),
            )
            .await?;

        let Some(call) = response.tool_call("propose_review_questions") else {
            return Err(ReasonError::Malformed(
                "review step returned no questions".to_string(),
            ));
        };
        let input: ReviewPlanInput = parse_input(call)?;
        if input.questions.is_empty() {
            return Err(ReasonError::Malformed("review plan has no questions".to_string()));
        }

        Ok(input
            .questions
            .into_iter()
            .enumerate()
            .map(|(i, q)| convert_question(q, i))
            .collect())
    }

    async fn draft_clauses(
        &self,
        session: &Session,
        requests: &[ClauseRequest],
    ) -> Result<Vec<Clause>, ReasonError> {
        let Some(skeleton) = session.stage.skeleton() else {
            return Err(ReasonError::Prompt("session has no skeleton to draft".to_string()));
        };

        let context = ClausesPromptContext {
            document_type_name: type_label(&session.document_type),
            context_json: context_json(session),
            outline_text: outline_text(skeleton),
            requests: requests
                .iter()
                .map(|r| RequestLine {
                    section_id: r.section_id.clone(),
                    section_title: r.section_title.clone(),
                    items: r.items.clone(),
                })
                .collect(),
        };

        let system_prompt = self.render("clauses", &context)?;
        let response = self
            .complete_step(
                system_prompt,
                vec![Message::user("Draft the requested sections now.")],
                clause_tools(),
            )
            .await?;

        let Some(call) = response.tool_call("draft_clauses") else {
            return Err(ReasonError::Malformed("clause step returned no draft".to_string()));
        };
        let input: ClausesInput = parse_input(call)?;
        if input.clauses.is_empty() {
            return Err(ReasonError::Malformed("clause draft is empty".to_string()));
        }

        let requested: HashSet<&str> = requests.iter().map(|r| r.section_id.as_str()).collect();
        let mut clauses = Vec::new();
        for wire in input.clauses {
            if !requested.contains(wire.section_id.as_str()) {
                warn!(section = %wire.section_id, "draft_clauses: dropping clause for unrequested section");
                continue;
            }
            clauses.push(Clause::new(wire.section_id, wire.body));
        }
        if clauses.is_empty() {
            return Err(ReasonError::Malformed(
                "clause draft covered none of the requested sections".to_string(),
            ));
        }
        Ok(clauses)
    }
}
