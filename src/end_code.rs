//! End-code decoding.
//!
//! Every FINS response carries a two-byte end code immediately after the
//! command echo. `e0`'s top bit flags a network relay error; `e1`'s top two
//! bits flag fatal/non-fatal CPU unit errors. The remaining 7+6 bits address
//! an optional descriptive sub-code, which is informational only: the
//! decoder still reports success in that branch, since the PLC accepted the
//! request well enough to describe what happened to it.

use std::fmt;

/// The classification of a decoded end code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// `e0 == 0 && e1 == 0`: full success.
    Ok,
    /// Bit 7 of `e0` was set: the request failed somewhere along a network
    /// relay hop.
    NetworkRelayError,
    /// Bit 7 of `e1` was set: the destination CPU unit reported a fatal
    /// error.
    FatalCpuUnitError,
    /// Bit 6 of `e1` was set: the destination CPU unit reported a
    /// non-fatal error.
    NonFatalCpuUnitError,
    /// Neither relay nor CPU-unit error bit was set, but the main/sub code
    /// pair was non-zero. The operation is still treated as having
    /// completed; `sub_code_text` may describe what happened.
    Informational,
}

/// A decoded end code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// How the end code was classified.
    pub category: Category,
    /// `e0 & 0x7F`: the main code, with the relay-error bit masked off.
    pub main_code: u8,
    /// `e1 & 0x3F`: the sub code, with the CPU-error bits masked off.
    pub sub_code: u8,
}

impl Outcome {
    /// Returns whether the category is [`Category::Ok`] or
    /// [`Category::Informational`] — i.e. no error bit was set.
    pub fn is_ok(&self) -> bool {
        matches!(self.category, Category::Ok | Category::Informational)
    }

    /// Returns the static descriptive text for `(main_code, sub_code)`, if
    /// any is known.
    pub fn sub_code_text(&self) -> Option<&'static str> {
        sub_code_text(self.main_code, self.sub_code)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category {
            Category::Ok => write!(f, "ok"),
            Category::NetworkRelayError => write!(f, "network relay error"),
            Category::FatalCpuUnitError => write!(f, "fatal CPU unit error"),
            Category::NonFatalCpuUnitError => write!(f, "non-fatal CPU unit error"),
            Category::Informational => match self.sub_code_text() {
                Some(text) => write!(
                    f,
                    "main 0x{:02X} sub 0x{:02X}: {text}",
                    self.main_code, self.sub_code
                ),
                None => write!(f, "main 0x{:02X} sub 0x{:02X}", self.main_code, self.sub_code),
            },
        }
    }
}

/// Decodes a raw `(e0, e1)` end-code pair.
///
/// This is a pure function of the two bytes alone: it never returns an
/// error. Callers that want the informational branch to be treated as a
/// hard failure should check `outcome.category` themselves.
///
/// # Example
///
/// ```
/// use fins_link::end_code::{decode, Category};
///
/// assert_eq!(decode(0x00, 0x00).category, Category::Ok);
/// assert_eq!(decode(0xA1, 0x01).category, Category::NetworkRelayError);
/// assert_eq!(decode(0x21, 0x01).category, Category::Informational);
/// ```
pub fn decode(e0: u8, e1: u8) -> Outcome {
    let main_code = e0 & 0x7F;
    let sub_code = e1 & 0x3F;

    let category = if e0 == 0 && e1 == 0 {
        Category::Ok
    } else if e0 & 0x80 != 0 {
        Category::NetworkRelayError
    } else if e1 & 0x80 != 0 {
        Category::FatalCpuUnitError
    } else if e1 & 0x40 != 0 {
        Category::NonFatalCpuUnitError
    } else {
        Category::Informational
    };

    Outcome {
        category,
        main_code,
        sub_code,
    }
}

/// Static descriptive text for a `(main_code, sub_code)` pair, per the
/// OMRON end-code reference table. Only a representative subset is
/// reproduced; an unmatched pair yields `None`, not an error.
fn sub_code_text(main_code: u8, sub_code: u8) -> Option<&'static str> {
    match (main_code, sub_code) {
        (0x00, 0x01) => Some("service canceled"),
        (0x01, 0x01) => Some("local node not in network"),
        (0x01, 0x02) => Some("token timeout"),
        (0x01, 0x03) => Some("retries failed"),
        (0x01, 0x04) => Some("too many send frames"),
        (0x01, 0x05) => Some("node address range error"),
        (0x01, 0x06) => Some("node address duplication"),
        (0x02, 0x01) => Some("destination node not in network"),
        (0x02, 0x02) => Some("unit missing"),
        (0x02, 0x03) => Some("third node missing"),
        (0x02, 0x04) => Some("destination node busy"),
        (0x02, 0x05) => Some("response timeout"),
        (0x10, _) => Some("command format error"),
        (0x11, _) => Some("parameter error"),
        (0x20, _) => Some("read not possible"),
        (0x21, _) => Some("write not possible"),
        (0x22, _) => Some("not executable in current mode"),
        (0x23, _) => Some("no such device"),
        (0x24, _) => Some("cannot start/stop"),
        (0x25, _) => Some("unit error"),
        (0x26, _) => Some("command error"),
        (0x30, _) => Some("access right error"),
        (0x40, _) => Some("abort"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_ok() {
        let outcome = decode(0x00, 0x00);
        assert_eq!(outcome.category, Category::Ok);
        assert!(outcome.is_ok());
    }

    #[test]
    fn network_relay_bit() {
        let outcome = decode(0xA1, 0x01);
        assert_eq!(outcome.category, Category::NetworkRelayError);
        assert!(!outcome.is_ok());
        assert_eq!(outcome.main_code, 0x21);
    }

    #[test]
    fn fatal_cpu_bit() {
        let outcome = decode(0x00, 0x80);
        assert_eq!(outcome.category, Category::FatalCpuUnitError);
    }

    #[test]
    fn non_fatal_cpu_bit() {
        let outcome = decode(0x00, 0x40);
        assert_eq!(outcome.category, Category::NonFatalCpuUnitError);
    }

    #[test]
    fn informational_is_still_ok() {
        // main code 0x21 "WriteNotPossible", no relay/cpu error bit set.
        let outcome = decode(0x21, 0x01);
        assert_eq!(outcome.category, Category::Informational);
        assert!(outcome.is_ok());
        assert_eq!(outcome.sub_code_text(), Some("write not possible"));
    }

    #[test]
    fn informational_with_no_known_text() {
        let outcome = decode(0x7E, 0x3E);
        assert_eq!(outcome.category, Category::Informational);
        assert_eq!(outcome.sub_code_text(), None);
    }

    #[test]
    fn decode_is_pure_over_all_byte_pairs() {
        for e0 in 0..=255u8 {
            for e1 in 0..=255u8 {
                assert_eq!(decode(e0, e1), decode(e0, e1));
            }
        }
    }

    #[test]
    fn masks_strip_flag_bits() {
        let outcome = decode(0x80, 0x00);
        assert_eq!(outcome.main_code, 0x00);
        let outcome = decode(0x00, 0xC0);
        assert_eq!(outcome.sub_code, 0x00);
    }
}
