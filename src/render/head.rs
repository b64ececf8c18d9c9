//! Finds the end of the first `<head …>` tag in a byte stream.

const HEAD_TAG: &[u8] = b"<head";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadState {
    /// Matched this many bytes of `<head` (case-insensitive)
    Matching(usize),
    /// Matched `<head`; the next byte decides whether this is the head tag
    AwaitingTagClose,
    /// Inside the head tag's attributes, waiting for `>`
    WaitingFinalClose,
    Done,
}

/// Byte-fed matcher that reports the `>` closing the first `<head>` tag.
///
/// `<header>` and similar names do not match. Once the tag has been seen the injector
/// stays done for the rest of the document.
#[derive(Debug, Clone)]
pub struct HeadInjector {
    state: HeadState,
}

impl Default for HeadInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadInjector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: HeadState::Matching(0),
        }
    }

    /// The snippet has been placed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == HeadState::Done
    }

    /// Feed one emitted byte. Returns `true` when the snippet goes right after it.
    pub fn feed(&mut self, byte: u8) -> bool {
        let (next, insert) = match self.state {
            HeadState::Done => (HeadState::Done, false),
            HeadState::Matching(n) => {
                if byte.to_ascii_lowercase() == HEAD_TAG[n] {
                    if n + 1 == HEAD_TAG.len() {
                        (HeadState::AwaitingTagClose, false)
                    } else {
                        (HeadState::Matching(n + 1), false)
                    }
                } else {
                    (restart(byte), false)
                }
            }
            HeadState::AwaitingTagClose => match byte {
                b'>' => (HeadState::Done, true),
                b'/' => (HeadState::WaitingFinalClose, false),
                b if b.is_ascii_whitespace() => (HeadState::WaitingFinalClose, false),
                _ => (restart(byte), false),
            },
            HeadState::WaitingFinalClose => {
                if byte == b'>' {
                    (HeadState::Done, true)
                } else {
                    (HeadState::WaitingFinalClose, false)
                }
            }
        };
        self.state = next;
        insert
    }
}

fn restart(byte: u8) -> HeadState {
    if byte == b'<' {
        HeadState::Matching(1)
    } else {
        HeadState::Matching(0)
    }
}
