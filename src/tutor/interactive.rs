//! Terminal tutoring session
//!
//! Mirrors the single-page flow: pick a mode, answer, read feedback. The
//! slash commands `/mode`, `/help` and `/quit` work at any prompt.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::Arc;

use super::session::{SessionController, SessionMode};
use super::{Mode, Tutor};
use crate::error::TutorError;

/// What the learner typed at a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Text(String),
    ChangeMode,
    Help,
    Quit,
}

/// How a round ended
enum Round {
    Continue,
    ChangeMode,
    Quit,
}

fn parse_input(line: &str) -> Input {
    match line.trim() {
        "/quit" | "/exit" | "/q" => Input::Quit,
        "/mode" | "/m" => Input::ChangeMode,
        "/help" | "/h" | "/?" => Input::Help,
        _ => Input::Text(line.to_string()),
    }
}

fn read(rl: &mut DefaultEditor, prompt: &str) -> Result<Input> {
    match rl.readline(prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                let _ = rl.add_history_entry(line.as_str());
            }
            Ok(parse_input(&line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(Input::Quit),
        Err(e) => Err(e.into()),
    }
}

fn print_banner() {
    println!();
    println!("🌱 Sustainable Digitalization – AI Tutor");
    println!();
    println!("This interactive tutor helps you test knowledge and reason through");
    println!("real-world sustainability scenarios.");
    println!();
}

fn print_help() {
    println!();
    println!("Commands:");
    println!("  /mode   Choose a different activity");
    println!("  /help   Show this help");
    println!("  /quit   Leave the tutor");
    println!();
}

fn print_error(err: &TutorError) {
    tracing::warn!("Tutor request failed: {}", err);
    println!("\n⚠️  {}\n", err.user_message());
}

fn print_section(title: &str, body: &str) {
    println!("\n### {}\n", title);
    println!("{}\n", body);
}

/// Run the terminal session until the learner quits
pub async fn run_interactive(tutor: Arc<Tutor>) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut session = SessionController::with_os_rng(tutor);
    let mut choosing = true;

    print_banner();

    loop {
        if choosing || session.mode() == SessionMode::Unset {
            println!("How would you like to proceed?");
            for (i, mode) in Mode::ALL.iter().enumerate() {
                println!("  [{}] {}", i + 1, mode);
            }
            match read(&mut rl, "> ")? {
                Input::Quit => break,
                Input::Help => print_help(),
                Input::ChangeMode => {}
                Input::Text(choice) => match choice.parse::<Mode>() {
                    Ok(mode) => match session.select_mode(mode) {
                        Ok(_) => choosing = false,
                        Err(e) => print_error(&e),
                    },
                    Err(e) => println!("\n{}\n", e),
                },
            }
            continue;
        }

        let round = match session.mode() {
            SessionMode::KnowledgeCheck => knowledge_round(&mut rl, &mut session).await?,
            SessionMode::ScenarioActivity => scenario_round(&mut rl, &mut session).await?,
            SessionMode::Unset => Round::ChangeMode,
        };

        match round {
            Round::Continue => {}
            Round::ChangeMode => choosing = true,
            Round::Quit => break,
        }
    }

    println!("👋 Goodbye!");
    Ok(())
}

/// Read a text field; a command ends the round instead
fn field(rl: &mut DefaultEditor, prompt: &str) -> Result<std::result::Result<String, Round>> {
    loop {
        match read(rl, prompt)? {
            Input::Text(text) => return Ok(Ok(text)),
            Input::ChangeMode => return Ok(Err(Round::ChangeMode)),
            Input::Quit => return Ok(Err(Round::Quit)),
            Input::Help => print_help(),
        }
    }
}

async fn knowledge_round(rl: &mut DefaultEditor, session: &mut SessionController) -> Result<Round> {
    let question = match field(rl, "Enter a sustainability-related question: ")? {
        Ok(text) => text,
        Err(round) => return Ok(round),
    };
    let answer = match field(rl, "Your answer: ")? {
        Ok(text) => text,
        Err(round) => return Ok(round),
    };

    println!("\n⏳ Thinking...");
    match session.submit_answer(&question, &answer).await {
        Ok(feedback) => print_section("AI Feedback", &feedback),
        Err(e) => print_error(&e),
    }
    Ok(Round::Continue)
}

async fn scenario_round(rl: &mut DefaultEditor, session: &mut SessionController) -> Result<Round> {
    if let Some(scenario) = session.scenario() {
        print_section("Business Scenario", &scenario.scenario);
    }

    let solution = match field(rl, "Your proposed solution: ")? {
        Ok(text) => text,
        Err(round) => return Ok(round),
    };

    println!("\n⏳ Thinking...");
    match session.evaluate_solution(&solution).await {
        Ok(feedback) => print_section("AI Feedback", &feedback),
        Err(e) => {
            print_error(&e);
            return Ok(Round::Continue);
        }
    }

    let reflection = match field(rl, "Reflection (optional): ")? {
        Ok(text) => text,
        Err(round) => return Ok(round),
    };
    match session.summarize_reflection(&reflection).await {
        Ok(Some(summary)) => print_section("Learning Summary", &summary),
        Ok(None) => {}
        Err(e) => print_error(&e),
    }

    // Next round presents a new scenario
    if let Err(e) = session.select_mode(Mode::ScenarioActivity) {
        print_error(&e);
    }
    Ok(Round::Continue)
}
