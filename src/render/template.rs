//! Placeholder state machine.
//!
//! [`step`] is a pure transition `(state, byte) -> (state, actions)`; the engine
//! applies the actions. A byte that ends an `OpenBrace` run without continuing it is
//! handed back to `Normal` inside the same call, so nothing has to be pushed back into
//! the input.

use smallvec::{smallvec, SmallVec};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TemplateState {
    #[default]
    Normal,
    /// Seen `n` opening braces (1 or 2).
    OpenBrace(u8),
    /// Inside `{{…` or `{{{…`, accumulating key text.
    Placeholder {
        raw: Vec<u8>,
        /// Closing braces seen so far
        closing: u8,
        triple: bool,
    },
}

/// What the engine should do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Pass one byte through.
    Emit(u8),
    /// Emit bytes verbatim (a brace run or an abandoned placeholder).
    Literal(Vec<u8>),
    /// A placeholder closed. `literal` is the original token, used when the
    /// resolver declines the key.
    Resolve {
        key: String,
        raw: bool,
        literal: Vec<u8>,
    },
}

pub type Actions = SmallVec<[Action; 2]>;

fn open_literal(triple: bool) -> &'static [u8] {
    if triple {
        b"{{{"
    } else {
        b"{{"
    }
}

fn token_literal(raw: &[u8], closing: u8, triple: bool) -> Vec<u8> {
    let mut literal = Vec::with_capacity(raw.len() + 6);
    literal.extend_from_slice(open_literal(triple));
    literal.extend_from_slice(raw);
    literal.extend(std::iter::repeat(b'}').take(usize::from(closing)));
    literal
}

/// Advance the machine by one byte.
///
/// `max_len` bounds the key text of a placeholder. A placeholder that grows past it is
/// emitted verbatim and scanning resumes in `Normal`.
#[must_use]
pub fn step(state: TemplateState, byte: u8, max_len: usize) -> (TemplateState, Actions) {
    match state {
        TemplateState::Normal => {
            if byte == b'{' {
                (TemplateState::OpenBrace(1), Actions::new())
            } else {
                (TemplateState::Normal, smallvec![Action::Emit(byte)])
            }
        }
        TemplateState::OpenBrace(1) if byte == b'{' => (TemplateState::OpenBrace(2), Actions::new()),
        TemplateState::OpenBrace(2) if byte == b'{' => (
            TemplateState::Placeholder {
                raw: Vec::new(),
                closing: 0,
                triple: true,
            },
            Actions::new(),
        ),
        TemplateState::OpenBrace(2) => {
            // `{{` followed by the first key byte
            let start = TemplateState::Placeholder {
                raw: Vec::new(),
                closing: 0,
                triple: false,
            };
            step(start, byte, max_len)
        }
        TemplateState::OpenBrace(n) => {
            let mut actions: Actions = smallvec![Action::Literal(vec![b'{'; usize::from(n)])];
            let (next, more) = step(TemplateState::Normal, byte, max_len);
            actions.extend(more);
            (next, actions)
        }
        TemplateState::Placeholder {
            mut raw,
            closing,
            triple,
        } => {
            let needed = if triple { 3 } else { 2 };
            if byte == b'}' {
                let closing = closing + 1;
                if closing == needed {
                    let key = String::from_utf8_lossy(&raw).trim().to_string();
                    let literal = token_literal(&raw, closing, triple);
                    return (
                        TemplateState::Normal,
                        smallvec![Action::Resolve {
                            key,
                            raw: triple,
                            literal,
                        }],
                    );
                }
                return (
                    TemplateState::Placeholder {
                        raw,
                        closing,
                        triple,
                    },
                    Actions::new(),
                );
            }

            // A partial closing run is part of the key text after all.
            raw.extend(std::iter::repeat(b'}').take(usize::from(closing)));
            raw.push(byte);
            if raw.len() > max_len {
                let mut literal = Vec::with_capacity(raw.len() + 3);
                literal.extend_from_slice(open_literal(triple));
                literal.extend_from_slice(&raw);
                return (TemplateState::Normal, smallvec![Action::Literal(literal)]);
            }
            (
                TemplateState::Placeholder {
                    raw,
                    closing: 0,
                    triple,
                },
                Actions::new(),
            )
        }
    }
}

/// Bytes to emit when input ends in `state`, if any.
#[must_use]
pub fn finish(state: TemplateState) -> Option<Vec<u8>> {
    match state {
        TemplateState::Normal => None,
        TemplateState::OpenBrace(n) => Some(vec![b'{'; usize::from(n)]),
        TemplateState::Placeholder {
            raw,
            closing,
            triple,
        } => Some(token_literal(&raw, closing, triple)),
    }
}
