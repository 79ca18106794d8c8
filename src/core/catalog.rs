//! Catalog number prefix extraction
//!
//! Manufacturers issue a new catalog number for every running number or
//! livery variant of the same tooling. The prefix computed here is the
//! shared "family" part of those numbers, so `R2290D` and `R2290` group
//! together, as do `4D-022-001S` and `4D-022-004`.
//!
//! The catalog number is split into chunks of same-class characters and
//! the first matching rule decides how many chunks survive:
//!
//! | Rule | Example |
//! |------|---------|
//! | more than one `-`: cut after the last `-` | `4D-006-000` → `4D-006-` |
//! | a `-` and a leading number of 3+ digits: cut after the first `-` | `143-212` → `143-` |
//! | trailing chunk starts with a letter: drop it | `R3390TTS` → `R3390` |
//! | digits, letters, 4+ digits: keep 3 trailing digits | `76CONT00124` → `76CONT001` |
//! | anything else | unchanged |

/// Character class used to split catalog numbers into chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Whitespace,
    Letter,
    Digit,
    Punctuation,
}

impl CharClass {
    /// Classify a single character
    ///
    /// Symbols that are neither letters, digits nor whitespace are treated
    /// as punctuation.
    pub fn of(c: char) -> Self {
        if c.is_whitespace() {
            CharClass::Whitespace
        } else if c.is_alphabetic() {
            CharClass::Letter
        } else if c.is_numeric() {
            CharClass::Digit
        } else {
            CharClass::Punctuation
        }
    }
}

/// A maximal run of same-class characters within a catalog number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub class: CharClass,
    pub text: &'a str,
}

impl<'a> Chunk<'a> {
    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn is_dash(&self) -> bool {
        self.text == "-"
    }

    fn starts_with_letter(&self) -> bool {
        self.text
            .chars()
            .next()
            .is_some_and(|c| CharClass::of(c) == CharClass::Letter)
    }
}

/// Split a catalog number into maximal runs of same-class characters
///
/// The chunks cover the whole input in order, with no gaps or overlap.
pub fn chunks(catalog_number: &str) -> Vec<Chunk<'_>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut current: Option<CharClass> = None;

    for (idx, c) in catalog_number.char_indices() {
        let class = CharClass::of(c);
        match current {
            Some(prev) if prev == class => {}
            Some(prev) => {
                chunks.push(Chunk {
                    class: prev,
                    text: &catalog_number[start..idx],
                });
                start = idx;
                current = Some(class);
            }
            None => current = Some(class),
        }
    }

    if let Some(class) = current {
        chunks.push(Chunk {
            class,
            text: &catalog_number[start..],
        });
    }

    chunks
}

/// Derive the family prefix of a manufacturer catalog number
///
/// Never fails; an empty catalog number yields an empty prefix and the
/// result is never longer than the input.
pub fn catalog_number_prefix(catalog_number: &str) -> String {
    let chunks = chunks(catalog_number);
    let dashes: Vec<usize> = chunks
        .iter()
        .enumerate()
        .filter(|(_, chunk)| chunk.is_dash())
        .map(|(idx, _)| idx)
        .collect();

    // Multi-dash: the final segment carries the variant
    if dashes.len() > 1 {
        let last = dashes[dashes.len() - 1];
        return join(&chunks[..=last]);
    }

    // Numeric-led schemes such as 143-212
    if let Some(&first_dash) = dashes.first() {
        let first = &chunks[0];
        if first.class == CharClass::Digit && first.len() > 2 {
            return join(&chunks[..=first_dash]);
        }
    }

    if chunks.len() > 1 {
        if let Some(last) = chunks.last() {
            if last.starts_with_letter() {
                return join(&chunks[..chunks.len() - 1]);
            }
        }
    }

    if let [a, b, c] = chunks.as_slice() {
        if a.class == CharClass::Digit
            && b.class == CharClass::Letter
            && c.class == CharClass::Digit
            && c.len() > 3
        {
            let kept: String = c.text.chars().take(3).collect();
            return format!("{}{}{}", a.text, b.text, kept);
        }
    }

    join(&chunks)
}

fn join(chunks: &[Chunk<'_>]) -> String {
    chunks.iter().map(|chunk| chunk.text).collect()
}
