use log::warn;

use super::{Kind, Op};

/// Operation kind for a SAM CIGAR symbol.
pub fn kind(symbol: u8) -> Option<Kind> {
    let kind = match symbol {
        b'M' => Kind::Match,
        b'I' => Kind::Insertion,
        b'D' => Kind::Deletion,
        b'N' => Kind::Skip,
        b'S' => Kind::SoftClip,
        b'H' => Kind::HardClip,
        b'P' => Kind::Pad,
        b'=' => Kind::SequenceMatch,
        b'X' => Kind::SequenceMismatch,
        _ => return None,
    };
    Some(kind)
}

/// Parse a textual CIGAR string, e.g. `5M2I3M`. Operations with unknown symbols or missing lengths
/// are logged and skipped, `*` is an empty CIGAR.
pub fn parse(text: &str) -> Vec<Op> {
    let mut ops = Vec::new();
    if text == "*" {
        return ops;
    }

    let mut length: Option<usize> = None;
    for symbol in text.bytes() {
        if symbol.is_ascii_digit() {
            let digit = (symbol - b'0') as usize;
            length = Some(length.unwrap_or(0).saturating_mul(10).saturating_add(digit));
            continue;
        }

        match (kind(symbol), length.take()) {
            (Some(kind), Some(len)) => ops.push(Op::new(kind, len)),
            (Some(_), None) => warn!(
                "CIGAR operation {} without a length in {text}, skipping",
                symbol as char
            ),
            (None, _) => warn!(
                "Unknown CIGAR operation {:?} in {text}, skipping",
                symbol as char
            ),
        }
    }
    if length.is_some() {
        warn!("Trailing CIGAR length without an operation in {text}");
    }
    ops
}

/// Number of read bases described by the operations.
pub fn read_length(ops: &[Op]) -> usize {
    ops.iter()
        .filter(|op| op.kind().consumes_read())
        .map(|op| op.len())
        .sum()
}

/// Number of reference bases described by the operations.
pub fn reference_span(ops: &[Op]) -> usize {
    ops.iter()
        .filter(|op| op.kind().consumes_reference())
        .map(|op| op.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        for (text, expected) in [
            ("*", vec![]),
            ("", vec![]),
            ("10M", vec![Op::new(Kind::Match, 10)]),
            (
                "2S5M2I3M100N4M1H",
                vec![
                    Op::new(Kind::SoftClip, 2),
                    Op::new(Kind::Match, 5),
                    Op::new(Kind::Insertion, 2),
                    Op::new(Kind::Match, 3),
                    Op::new(Kind::Skip, 100),
                    Op::new(Kind::Match, 4),
                    Op::new(Kind::HardClip, 1),
                ],
            ),
            (
                "3=1X2D1P",
                vec![
                    Op::new(Kind::SequenceMatch, 3),
                    Op::new(Kind::SequenceMismatch, 1),
                    Op::new(Kind::Deletion, 2),
                    Op::new(Kind::Pad, 1),
                ],
            ),
            // Unknown symbols and missing lengths are skipped
            ("5M3Q2M", vec![Op::new(Kind::Match, 5), Op::new(Kind::Match, 2)]),
            ("M5M", vec![Op::new(Kind::Match, 5)]),
            ("5M7", vec![Op::new(Kind::Match, 5)]),
        ] {
            assert_eq!(parse(text), expected, "{text}");
        }
    }

    #[test]
    fn test_lengths() {
        let ops = parse("2S5M2I3M100N4M1H");
        assert_eq!(read_length(&ops), 16);
        assert_eq!(reference_span(&ops), 112);
    }
}
