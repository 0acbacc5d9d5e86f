use arcstd_protocol::{sentence_text, SentenceId, Token};
use nom::{
    branch::alt,
    character::complete::{char, digit1},
    combinator::{all_consuming, map, map_res},
    sequence::separated_pair,
    IResult,
};
use thiserror::Error;

/// ID, FORM, LEMMA, UPOS are the columns the parser needs.
const REQUIRED_COLUMNS: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConlluError {
    #[error("line {line}: expected at least 4 tab-separated columns, found {found}")]
    MissingColumns { line: usize, found: usize },

    #[error("line {line}: invalid token id {id:?}")]
    BadId { line: usize, id: String },

    #[error("line {line}: token id {found} out of sequence, expected {expected}")]
    OutOfSequence { line: usize, expected: u32, found: u32 },
}

/// One input sentence, tokens in id order starting at 1.
#[derive(Debug, Clone)]
pub struct Sentence {
    pub id: SentenceId,
    pub tokens: Vec<Token>,
}

impl Sentence {
    pub fn text(&self) -> String {
        sentence_text(&self.tokens)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowId {
    Word(u32),
    /// Multiword token range such as `1-2`.
    Range,
    /// Empty node such as `3.1`.
    Empty,
}

fn row_id(input: &str) -> IResult<&str, RowId> {
    alt((
        map(separated_pair(digit1, char('-'), digit1), |_| RowId::Range),
        map(separated_pair(digit1, char('.'), digit1), |_| RowId::Empty),
        map_res(digit1, |d: &str| d.parse::<u32>().map(RowId::Word)),
    ))(input)
}

/// Reads a CoNLL-U corpus. Sentences are numbered from 1 in file order.
pub fn parse_corpus(source: &str) -> Result<Vec<Sentence>, ConlluError> {
    let mut sentences = Vec::new();
    let mut tokens: Vec<Token> = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let row = raw.trim_end_matches('\r');

        if row.trim().is_empty() {
            flush(&mut tokens, &mut sentences);
            continue;
        }
        if row.starts_with('#') {
            continue;
        }

        let columns: Vec<&str> = row.split('\t').collect();
        if columns.len() < REQUIRED_COLUMNS {
            return Err(ConlluError::MissingColumns {
                line,
                found: columns.len(),
            });
        }

        let id = match all_consuming(row_id)(columns[0]) {
            Ok((_, RowId::Word(id))) => id,
            Ok((_, RowId::Range | RowId::Empty)) => continue,
            Err(_) => {
                return Err(ConlluError::BadId {
                    line,
                    id: columns[0].to_string(),
                })
            }
        };

        let expected = tokens.len() as u32 + 1;
        if id != expected {
            return Err(ConlluError::OutOfSequence {
                line,
                expected,
                found: id,
            });
        }

        tokens.push(Token::new(id, columns[1], columns[2], columns[3]));
    }
    flush(&mut tokens, &mut sentences);

    Ok(sentences)
}

fn flush(tokens: &mut Vec<Token>, sentences: &mut Vec<Sentence>) {
    if !tokens.is_empty() {
        let id = SentenceId(sentences.len() as u32 + 1);
        sentences.push(Sentence {
            id,
            tokens: std::mem::take(tokens),
        });
    }
}
