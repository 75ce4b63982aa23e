//! Pattern-directed string synthesis.
//!
//! Parses a regular expression into `regex-syntax`'s HIR and walks it
//! emitting random matching text. `confound()` yields a variant generator
//! whose output is expected NOT to match: one literal or character class per
//! emission is replaced with text outside it, and callers re-verify against
//! the compiled pattern before trusting the result.

use anyhow::Context;
use rand::Rng;
use regex::Regex;
use regex_syntax::hir::{Class, Hir, HirKind};

/// Cap on unbounded repetition counts and emitted run lengths.
const MAX_REPEAT: u32 = 32;

/// Extra repetitions allowed above a repetition's minimum when no maximum is
/// declared.
const UNBOUNDED_SLACK: u32 = 4;

pub struct Xeger {
    pattern: String,
    re: Regex,
    hir: Hir,
    mutable_nodes: usize,
}

impl Xeger {
    /// Build a generator for `pattern`. Leading `^` and trailing `$` are
    /// stripped for generation; verification always anchors the full string.
    pub fn new(pattern: &str) -> anyhow::Result<Self> {
        let trimmed = trim_anchors(pattern);
        let hir = regex_syntax::parse(trimmed)
            .with_context(|| format!("unsupported pattern {pattern:?}"))?;
        let re = Regex::new(&anchored(pattern))
            .with_context(|| format!("invalid pattern {pattern:?}"))?;
        let mutable_nodes = count_mutable(&hir);
        Ok(Xeger {
            pattern: pattern.to_string(),
            re,
            hir,
            mutable_nodes,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Full-string match check, the same semantics generated validation uses.
    pub fn matches(&self, text: &str) -> bool {
        self.re.is_match(text)
    }

    /// Emit text that should match; not guaranteed for every pattern shape.
    pub fn emit(&self, rng: &mut impl Rng) -> String {
        let mut out = String::new();
        emit_node(&self.hir, rng, &mut out, &mut Mutation::none());
        out
    }

    /// Emit and verify, retrying up to `attempts` times. `None` means this
    /// pattern is out of reach for the generator, a coverage gap rather than
    /// an error.
    pub fn emit_checked(&self, rng: &mut impl Rng, attempts: usize) -> Option<String> {
        for _ in 0..attempts {
            let candidate = self.emit(rng);
            if self.matches(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    /// A confounded variant, when the pattern has anything to mutate.
    pub fn confound(&self) -> Option<Confounded<'_>> {
        if self.mutable_nodes == 0 {
            return None;
        }
        Some(Confounded { xeger: self })
    }
}

/// Generator of near-misses: each emission picks one literal or class node
/// and emits text outside it. Callers must re-verify with [`Xeger::matches`];
/// a mutation elsewhere in the string can still leave a full match intact.
pub struct Confounded<'x> {
    xeger: &'x Xeger,
}

impl Confounded<'_> {
    pub fn emit(&self, rng: &mut impl Rng) -> String {
        let target = rng.gen_range(0..self.xeger.mutable_nodes);
        let mut out = String::new();
        emit_node(&self.xeger.hir, rng, &mut out, &mut Mutation::at(target));
        out
    }

    /// Emit until the result verifiably does not match, with bounded retries.
    pub fn emit_checked(&self, rng: &mut impl Rng, attempts: usize) -> Option<String> {
        for _ in 0..attempts {
            let candidate = self.emit(rng);
            if !self.xeger.matches(&candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

struct Mutation {
    target: Option<usize>,
    seen: usize,
}

impl Mutation {
    fn none() -> Self {
        Mutation {
            target: None,
            seen: 0,
        }
    }

    fn at(target: usize) -> Self {
        Mutation {
            target: Some(target),
            seen: 0,
        }
    }

    /// True exactly once: when visiting the chosen node.
    fn claims(&mut self) -> bool {
        let hit = self.target == Some(self.seen);
        self.seen += 1;
        hit
    }
}

fn count_mutable(hir: &Hir) -> usize {
    match hir.kind() {
        HirKind::Literal(_) | HirKind::Class(_) => 1,
        HirKind::Repetition(rep) => count_mutable(&rep.sub),
        HirKind::Capture(cap) => count_mutable(&cap.sub),
        HirKind::Concat(parts) | HirKind::Alternation(parts) => {
            parts.iter().map(count_mutable).sum()
        }
        HirKind::Empty | HirKind::Look(_) => 0,
    }
}

fn emit_node(hir: &Hir, rng: &mut impl Rng, out: &mut String, mutation: &mut Mutation) {
    match hir.kind() {
        HirKind::Empty | HirKind::Look(_) => {}
        HirKind::Literal(lit) => {
            let text = String::from_utf8_lossy(&lit.0);
            if mutation.claims() {
                mutate_literal(&text, rng, out);
            } else {
                out.push_str(&text);
            }
        }
        HirKind::Class(class) => {
            if mutation.claims() {
                out.push(complement_char(class, rng));
            } else {
                out.push(sample_class(class, rng));
            }
        }
        HirKind::Repetition(rep) => {
            let min = rep.min.min(MAX_REPEAT);
            let max = rep
                .max
                .unwrap_or(rep.min.saturating_add(UNBOUNDED_SLACK))
                .min(rep.min.saturating_add(MAX_REPEAT))
                .max(min);
            let mut times = rng.gen_range(min..=max);
            // A mutation inside a zero-count repetition would vanish.
            if times == 0 && subtree_claims(&rep.sub, mutation) {
                times = 1;
            }
            let before = mutation.seen;
            if times == 0 {
                mutation.seen = before + count_mutable(&rep.sub);
                return;
            }
            // Only the first iteration tracks mutation indices; repeats of
            // the body must not advance them past the counting walk.
            emit_node(&rep.sub, rng, out, mutation);
            for _ in 1..times {
                emit_node(&rep.sub, rng, out, &mut Mutation::none());
            }
        }
        HirKind::Capture(cap) => emit_node(&cap.sub, rng, out, mutation),
        HirKind::Concat(parts) => {
            for part in parts {
                emit_node(part, rng, out, mutation);
            }
        }
        HirKind::Alternation(parts) => {
            if parts.is_empty() {
                return;
            }
            let pick = rng.gen_range(0..parts.len());
            // Skipped branches still consume their mutable-node budget so the
            // target index stays aligned with the counting walk.
            for (i, part) in parts.iter().enumerate() {
                if i == pick {
                    emit_node(part, rng, out, mutation);
                } else {
                    mutation.seen += count_mutable(part);
                }
            }
        }
    }
}

/// Whether the chosen mutation target lies inside this subtree, without
/// consuming it.
fn subtree_claims(hir: &Hir, mutation: &Mutation) -> bool {
    match mutation.target {
        Some(t) => {
            let count = count_mutable(hir);
            t >= mutation.seen && t < mutation.seen + count
        }
        None => false,
    }
}

fn mutate_literal(text: &str, rng: &mut impl Rng, out: &mut String) {
    if text.is_empty() {
        out.push('!');
        return;
    }
    let victim = rng.gen_range(0..text.chars().count());
    for (i, c) in text.chars().enumerate() {
        if i == victim {
            out.push(shifted_char(c));
        } else {
            out.push(c);
        }
    }
}

fn shifted_char(c: char) -> char {
    match c {
        'z' | 'Z' | '9' => '.',
        c if c.is_ascii_alphanumeric() => (c as u8 + 1) as char,
        _ => 'q',
    }
}

/// Draw a random member of a character class, preferring printable ASCII
/// ranges when the class offers any.
fn sample_class(class: &Class, rng: &mut impl Rng) -> char {
    match class {
        Class::Unicode(cls) => {
            let ranges: Vec<(u32, u32)> = cls
                .ranges()
                .iter()
                .map(|r| (r.start() as u32, r.end() as u32))
                .collect();
            sample_ranges(&ranges, rng)
        }
        Class::Bytes(cls) => {
            let ranges: Vec<(u32, u32)> = cls
                .ranges()
                .iter()
                .map(|r| (r.start() as u32, r.end() as u32))
                .collect();
            sample_ranges(&ranges, rng)
        }
    }
}

fn sample_ranges(ranges: &[(u32, u32)], rng: &mut impl Rng) -> char {
    if ranges.is_empty() {
        return '?';
    }
    let printable: Vec<(u32, u32)> = ranges
        .iter()
        .filter_map(|&(lo, hi)| {
            let lo = lo.max(0x21);
            let hi = hi.min(0x7e);
            (lo <= hi).then_some((lo, hi))
        })
        .collect();
    let pool = if printable.is_empty() { ranges } else { &printable };
    let (lo, hi) = pool[rng.gen_range(0..pool.len())];
    for _ in 0..8 {
        let code = rng.gen_range(lo..=hi);
        if let Some(c) = char::from_u32(code) {
            return c;
        }
    }
    char::from_u32(lo).unwrap_or('?')
}

/// A printable character outside the class, when one exists.
fn complement_char(class: &Class, rng: &mut impl Rng) -> char {
    let contains = |c: char| match class {
        Class::Unicode(cls) => cls.ranges().iter().any(|r| r.start() <= c && c <= r.end()),
        Class::Bytes(cls) => {
            c.is_ascii() && cls.ranges().iter().any(|r| {
                let b = c as u8;
                r.start() <= b && b <= r.end()
            })
        }
    };
    let offset = rng.gen_range(0..94u32);
    for i in 0..94u32 {
        let code = 0x21 + (offset + i) % 94;
        if let Some(c) = char::from_u32(code) {
            if !contains(c) {
                return c;
            }
        }
    }
    // Class covers all printable ASCII; emission verification will discard.
    ' '
}

fn trim_anchors(pattern: &str) -> &str {
    let pattern = pattern.strip_prefix('^').unwrap_or(pattern);
    pattern.strip_suffix('$').unwrap_or(pattern)
}

/// Anchor a pattern for full-string matching unless already anchored.
pub fn anchored(pattern: &str) -> String {
    let trimmed = trim_anchors(pattern);
    format!("^(?:{trimmed})$")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(0x5eed)
    }

    #[test]
    fn emits_matching_uuids() {
        let x = Xeger::new("^[0-9a-f]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$")
            .unwrap();
        let mut rng = rng();
        for _ in 0..20 {
            let sample = x.emit_checked(&mut rng, 15).unwrap();
            assert!(x.matches(&sample), "{sample:?} should match");
            assert_eq!(sample.len(), 36);
        }
    }

    #[test]
    fn emits_alternations_and_repetitions() {
        let x = Xeger::new("(cat|dog)s?( and (cat|dog)s?)*").unwrap();
        let mut rng = rng();
        for _ in 0..20 {
            let sample = x.emit_checked(&mut rng, 15).unwrap();
            assert!(x.matches(&sample), "{sample:?} should match");
        }
    }

    #[test]
    fn confounded_output_does_not_match() {
        let x = Xeger::new("[a-z]{4}-[0-9]{3}").unwrap();
        let confounded = x.confound().unwrap();
        let mut rng = rng();
        for _ in 0..20 {
            let sample = confounded.emit_checked(&mut rng, 10).unwrap();
            assert!(!x.matches(&sample), "{sample:?} should not match");
        }
    }

    #[test]
    fn confound_gives_up_gracefully() {
        // Matches any single char; every printable mutation still matches.
        let x = Xeger::new(".").unwrap();
        let mut rng = rng();
        if let Some(confounded) = x.confound() {
            assert!(confounded.emit_checked(&mut rng, 10).is_none());
        }
    }

    #[test]
    fn anchoring_is_idempotent_about_existing_anchors() {
        assert_eq!(anchored("^abc$"), "^(?:abc)$");
        assert_eq!(anchored("abc"), "^(?:abc)$");
    }
}
