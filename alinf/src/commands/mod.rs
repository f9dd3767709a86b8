//! Host-facing operations and the interactive pieces they need.

pub mod add_aliases;

use alinf_types::InflectionOptions;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

/// Lets the user review the run options before a note is inflected.
pub trait OptionsPrompt: Send + Sync {
    /// Return the options to run with, or `None` if the user backed out.
    fn confirm(&self, note_name: &str, proposed: InflectionOptions) -> Option<InflectionOptions>;
}

/// Takes the proposed options as-is (`--yes`, or confirmation turned off).
pub struct AcceptDefaults;

impl OptionsPrompt for AcceptDefaults {
    fn confirm(&self, _note_name: &str, proposed: InflectionOptions) -> Option<InflectionOptions> {
        Some(proposed)
    }
}

/// Line-based yes/no questions over a reader/writer pair (stdin/stdout in the binary).
pub struct LinePrompt<R, W> {
    io: Mutex<(R, W)>,
}

enum Answer {
    Yes,
    No,
    Default,
    Quit,
}

fn parse_answer(line: &str) -> Option<Answer> {
    match line.trim().to_lowercase().as_str() {
        "" => Some(Answer::Default),
        "y" | "yes" | "д" | "да" => Some(Answer::Yes),
        "n" | "no" | "н" | "нет" => Some(Answer::No),
        "q" | "quit" => Some(Answer::Quit),
        _ => None,
    }
}

impl LinePrompt<io::BufReader<io::Stdin>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead + Send, W: Write + Send> LinePrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }

    /// Ask until a recognised answer arrives. `None` on quit or end of input.
    fn ask(reader: &mut R, writer: &mut W, question: &str, default: bool) -> Option<bool> {
        let hint = if default { "[Y/n/q]" } else { "[y/N/q]" };
        loop {
            write!(writer, "{} {} ", question, hint).ok()?;
            writer.flush().ok()?;

            let mut line = String::new();
            if reader.read_line(&mut line).ok()? == 0 {
                return None;
            }
            match parse_answer(&line) {
                Some(Answer::Yes) => return Some(true),
                Some(Answer::No) => return Some(false),
                Some(Answer::Default) => return Some(default),
                Some(Answer::Quit) => return None,
                None => {
                    writeln!(writer, "Please answer y, n or q.").ok()?;
                }
            }
        }
    }
}

impl<R: BufRead + Send, W: Write + Send> OptionsPrompt for LinePrompt<R, W> {
    fn confirm(&self, note_name: &str, proposed: InflectionOptions) -> Option<InflectionOptions> {
        let mut guard = self.io.lock().ok()?;
        let (reader, writer) = &mut *guard;

        writeln!(writer, "Add aliases with inflections to \"{}\"", note_name).ok()?;
        let inflect_filename =
            Self::ask(reader, writer, "Inflect file name?", proposed.inflect_filename)?;
        let include_plural = Self::ask(reader, writer, "Plural?", proposed.include_plural)?;

        Some(InflectionOptions {
            include_plural,
            inflect_filename,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompt(input: &str) -> LinePrompt<Cursor<Vec<u8>>, Vec<u8>> {
        LinePrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn transcript(prompt: LinePrompt<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        let (_, out) = prompt.io.into_inner().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_answers_keep_proposal() {
        let proposed = InflectionOptions {
            include_plural: false,
            inflect_filename: true,
        };
        let p = prompt("\n\n");
        assert_eq!(p.confirm("стол", proposed), Some(proposed));

        let out = transcript(p);
        assert!(out.contains("\"стол\""));
        assert!(out.contains("Inflect file name? [Y/n/q]"));
        assert!(out.contains("Plural? [y/N/q]"));
    }

    #[test]
    fn test_explicit_answers_and_retry() {
        let p = prompt("maybe\nn\nyes\n");
        let chosen = p.confirm("стол", InflectionOptions::default()).unwrap();
        assert!(!chosen.inflect_filename);
        assert!(chosen.include_plural);
        assert!(transcript(p).contains("Please answer y, n or q."));
    }

    #[test]
    fn test_quit_or_eof_cancels() {
        assert_eq!(prompt("q\n").confirm("стол", InflectionOptions::default()), None);
        assert_eq!(prompt("y\n").confirm("стол", InflectionOptions::default()), None);
    }

    #[test]
    fn test_accept_defaults() {
        let proposed = InflectionOptions {
            include_plural: false,
            inflect_filename: false,
        };
        assert_eq!(AcceptDefaults.confirm("стол", proposed), Some(proposed));
    }
}
