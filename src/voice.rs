// Speech input: turn a recognizer transcript into an item field bundle

use crate::error::LedgerError;
use crate::fields::ItemFields;
use eyre::{Context, Result};
use std::io::BufRead;
use tracing::debug;

/// A speech recognizer that yields one final transcript per call
pub trait SpeechSource {
    /// Wait for a transcript. `None` means the recognizer was aborted or
    /// timed out without hearing anything.
    fn listen(&mut self) -> Result<Option<String>>;
}

/// Reads transcripts line by line, e.g. piped from an external dictation tool
pub struct LineSource<R> {
    reader: R,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> SpeechSource for LineSource<R> {
    fn listen(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).context("Failed to read transcript")?;
        if read == 0 || line.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Listen once and parse the result.
///
/// Passing no source reports [`LedgerError::Unsupported`] so the caller can
/// tell the user voice input is unavailable.
pub fn capture(source: Option<&mut dyn SpeechSource>) -> Result<Option<ItemFields>> {
    let source = source.ok_or(LedgerError::Unsupported("voice input"))?;
    Ok(source.listen()?.map(|transcript| parse_transcript(&transcript)))
}

/// Parse phrases like "milk 60 rupees" or "eggs 40 to list".
///
/// The first run of digits is the price. The item name is what remains after
/// removing that price, the word "rupees" and the phrase "to list". Any
/// mention of "list" files the item as planned rather than bought. Quantity
/// and unit are left for the ledger's defaults.
pub fn parse_transcript(transcript: &str) -> ItemFields {
    let text = transcript.to_lowercase();

    let price = first_digit_run(&text);
    let mut name = match price {
        Some(p) => text.replacen(p, "", 1),
        None => text.clone(),
    };
    name = name.replacen("rupees", "", 1).replacen("to list", "", 1);
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");

    let status = if text.contains("list") { "planned" } else { "bought" };

    debug!(%transcript, %name, ?price, status, "Parsed transcript");
    ItemFields::new(name).price(price.unwrap_or("0")).status(status)
}

fn first_digit_run(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let len = text[start..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len() - start);
    Some(&text[start..start + len])
}
