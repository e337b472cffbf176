//! Prompt templates
//!
//! Section labels and task order shape the model's answer, so the wording
//! here is fixed. Inputs are inserted verbatim.

/// Feedback on a knowledge-check answer
pub fn build_knowledge_prompt(context: &str, question: &str, answer: &str) -> String {
    format!(
        "
SYSTEM:
You are an academic tutor for Sustainable Digitalization.

CONTEXT:
{context}

QUESTION:
{question}

STUDENT ANSWER:
{answer}

TASK:
1. Say if the answer is correct.
2. Correct it if needed.
3. Ask one follow-up question.
"
    )
}

/// Feedback on a proposed scenario solution
pub fn build_scenario_prompt(scenario: &str, student_response: &str) -> String {
    format!(
        "
SYSTEM:
You are an expert tutor in sustainable digitalization.

SCENARIO:
{scenario}

STUDENT RESPONSE:
{student_response}

TASK:
1. Identify one sustainability benefit
2. Identify one trade-off or risk
3. Ask ONE probing follow-up question
"
    )
}

/// Short summary of a learner's reflection
pub fn build_reflection_prompt(reflection: &str) -> String {
    format!(
        "
SYSTEM:
You are an academic evaluator.

STUDENT REFLECTION:
{reflection}

TASK:
Summarize the key learning in 3–4 lines.
"
    )
}

/// Inputs for one prompt, built per submission and then dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptContext<'a> {
    KnowledgeCheck {
        context: &'a str,
        question: &'a str,
        answer: &'a str,
    },
    Scenario {
        scenario: &'a str,
        response: &'a str,
    },
    Reflection {
        reflection: &'a str,
    },
}

impl PromptContext<'_> {
    pub fn render(&self) -> String {
        match self {
            PromptContext::KnowledgeCheck { context, question, answer } => {
                build_knowledge_prompt(context, question, answer)
            }
            PromptContext::Scenario { scenario, response } => build_scenario_prompt(scenario, response),
            PromptContext::Reflection { reflection } => build_reflection_prompt(reflection),
        }
    }
}
