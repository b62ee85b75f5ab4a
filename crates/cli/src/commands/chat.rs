use std::io::{self, BufRead, Write};

use anyhow::Context;
use shopdesk_agent::AgentRuntime;
use shopdesk_core::config::LoadOptions;
use tracing::info;

use crate::commands::{bootstrap, CommandResult};

pub const WELCOME_BANNER: &str = "Welcome to E-Commerce Support Chatbot!";
pub const EXIT_HINT: &str = "Type 'exit' to quit.";
pub const FAREWELL: &str = "Thank you! Have a great day! 👋";
const PROMPT: &str = "You: ";

pub fn run(options: &LoadOptions) -> CommandResult {
    let runtime = match bootstrap("chat", options) {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    match run_session(&runtime, stdin.lock(), stdout.lock()) {
        Ok(turns) => {
            info!(event_name = "system.cli.chat_finished", turns, "chat session ended");
            CommandResult { exit_code: 0, output: String::new() }
        }
        Err(error) => CommandResult::failure("chat", "io", format!("{error:#}"), 3),
    }
}

/// Drives one conversation until `exit`, `quit` or end of input and returns
/// the number of answered turns.
pub fn run_session<R, W>(
    runtime: &AgentRuntime,
    mut input: R,
    mut output: W,
) -> anyhow::Result<usize>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "{WELCOME_BANNER}\n{EXIT_HINT}\n").context("failed to write banner")?;

    let mut turns = 0;
    let mut line = String::new();
    loop {
        write!(output, "{PROMPT}").context("failed to write prompt")?;
        output.flush().context("failed to flush prompt")?;

        line.clear();
        let read = input.read_line(&mut line).context("failed to read message")?;
        if read == 0 {
            writeln!(output).context("failed to write farewell")?;
            break;
        }

        let message = line.trim_end_matches(&['\r', '\n'][..]);
        if is_exit_command(message) {
            break;
        }

        let reply = runtime.respond(message);
        writeln!(output, "Chatbot: {reply}\n").context("failed to write reply")?;
        turns += 1;
    }

    writeln!(output, "Chatbot: {FAREWELL}").context("failed to write farewell")?;
    output.flush().context("failed to flush farewell")?;
    Ok(turns)
}

fn is_exit_command(message: &str) -> bool {
    let message = message.trim();
    message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit")
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use shopdesk_agent::AgentRuntime;
    use shopdesk_core::{Intent, IntentLexicon, KnowledgeBase, ReferenceData};

    use super::{is_exit_command, run_session, FAREWELL, WELCOME_BANNER};

    fn runtime() -> AgentRuntime {
        let lexicon = IntentLexicon::new(vec![(Intent::ReturnPolicy, vec!["refund".to_string()])]);
        AgentRuntime::new(ReferenceData::new(lexicon, KnowledgeBase::default()))
            .expect("runtime should build")
    }

    fn transcript(input: &str) -> (usize, String) {
        let mut output = Vec::new();
        let turns =
            run_session(&runtime(), Cursor::new(input), &mut output).expect("session runs");
        (turns, String::from_utf8(output).expect("utf-8 transcript"))
    }

    #[test]
    fn exit_words_ignore_case_and_whitespace() {
        for word in ["exit", "QUIT", "  Exit  ", "quit\t"] {
            assert!(is_exit_command(word), "{word}");
        }
        assert!(!is_exit_command("exit now"));
        assert!(!is_exit_command("quitting"));
    }

    #[test]
    fn session_answers_until_quit() {
        let (turns, transcript) = transcript("hello\nQuit\nrefund\n");

        assert_eq!(turns, 1);
        assert!(transcript.starts_with(WELCOME_BANNER));
        assert!(transcript.contains("You: Chatbot: Hello!"));
        assert!(!transcript.contains("Return/Refund"));
        assert!(transcript.trim_end().ends_with(&format!("Chatbot: {FAREWELL}")));
    }

    #[test]
    fn end_of_input_says_goodbye() {
        let (turns, transcript) = transcript("refund\n");
        assert_eq!(turns, 1);
        assert!(transcript.contains("Chatbot: 📦 Return/Refund Info:\n"));
        assert!(transcript.trim_end().ends_with(&format!("Chatbot: {FAREWELL}")));
    }

    #[test]
    fn rejected_input_still_gets_a_reply_and_keeps_going() {
        let (turns, transcript) = transcript("???\nexit\n");
        assert_eq!(turns, 1);
        assert!(transcript.contains("Chatbot: ⚠️ Sorry, I didn't understand that."));
    }
}
