//! Expression formatter for scientific notation in option and solution text.
//!
//! Rules, applied in order:
//! 1. `[M L T] 1 -2 0`  → `[M^1 L^-2]`  (zero or missing exponents drop the symbol)
//! 2. `m-2`             → `m^-2`
//! 3. `3 x 10`, `2×3`, `N.m` → `3 * 10`, `2 * 3`, `N * m`
//!    (`.` only when every joined piece is a unit symbol, so `U.S.A` stays)
//! 4. `m/s`             → `m / s`
//!
//! Rule 1 output is already in `S^E` form, so rule 2 never matches inside it. The
//! `.` joins of rule 3 are rewritten last, once operators have settled token
//! boundaries. The composition is idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

static DIMENSION_BRACKET: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"\[\s*(\p{Lu}(?:\s*\p{Lu})*)\s*\]").unwrap());

/// A compound unit written with `.` joins, e.g. `N.m` or `kg.m^2.s^-2`.
static UNIT_PRODUCT: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^[A-Za-z]{1,3}(?:\^-?\d+)?(?:\.[A-Za-z]{1,3}(?:\^-?\d+)?)+$").unwrap());

static NON_SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());

/// SI symbols and the common prefixed or non-SI units met in physics chapters.
const UNIT_SYMBOLS: &[&str] = &[
  "m", "cm", "mm", "km", "g", "mg", "kg", "s", "ms", "h", "min", "A", "mA", "K", "mol", "cd",
  "N", "kN", "J", "kJ", "MJ", "eV", "W", "kW", "MW", "Pa", "kPa", "atm", "bar", "Hz", "C", "V",
  "kV", "F", "H", "T", "Wb", "rad", "sr", "L", "cal",
];

const UNICODE_MINUS: char = '\u{2212}';

pub fn format_expression(text: &str) -> String {
  let text = rewrite_dimensions(text);
  let text = rewrite_implicit_exponents(&text);
  let text = rewrite_operators(&text);
  rewrite_unit_products(&text)
}

fn rewrite_dimensions(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut cursor = 0;

  for cap in DIMENSION_BRACKET.captures_iter(text) {
    let Some(whole) = cap.get(0) else { continue };
    if whole.start() < cursor {
      continue;
    }
    let symbols: Vec<char> = cap[1].chars().filter(|c| !c.is_whitespace()).collect();
    let (exponents, consumed) = leading_integers(&text[whole.end()..], symbols.len());
    if exponents.is_empty() {
      continue;
    }

    let terms: Vec<String> = symbols
      .iter()
      .zip(exponents.iter().map(Some).chain(std::iter::repeat(None)))
      .filter_map(|(sym, exp)| match exp {
        Some(e) if *e != 0 => Some(format!("{sym}^{e}")),
        _ => None,
      })
      .collect();

    out.push_str(&text[cursor..whole.start()]);
    out.push('[');
    out.push_str(&terms.join(" "));
    out.push(']');
    cursor = whole.end() + consumed;
  }
  out.push_str(&text[cursor..]);
  out
}

/// Up to `max` whitespace-separated signed integers at the start of `s`, and the
/// number of bytes they span. An integer running into `^`, letters or a decimal
/// fraction ends the run.
fn leading_integers(s: &str, max: usize) -> (Vec<i64>, usize) {
  let indexed: Vec<(usize, char)> = s.char_indices().collect();
  let chars: Vec<char> = indexed.iter().map(|(_, c)| *c).collect();
  let mut values = Vec::new();
  let mut consumed = 0;
  let mut i = 0;

  while values.len() < max {
    let mut j = i;
    while j < chars.len() && matches!(chars[j], ' ' | '\t') {
      j += 1;
    }
    let negative = j < chars.len() && matches!(chars[j], '-' | UNICODE_MINUS);
    if j < chars.len() && matches!(chars[j], '-' | '+' | UNICODE_MINUS) {
      j += 1;
    }
    let digits_start = j;
    while j < chars.len() && chars[j].is_ascii_digit() {
      j += 1;
    }
    if j == digits_start || !exponent_ends(&chars, j) {
      break;
    }

    let digits: String = chars[digits_start..j].iter().collect();
    let Ok(magnitude) = digits.parse::<i64>() else { break };
    values.push(if negative { -magnitude } else { magnitude });
    consumed = indexed.get(j).map(|(at, _)| *at).unwrap_or(s.len());
    i = j;
  }
  (values, consumed)
}

fn rewrite_implicit_exponents(text: &str) -> String {
  let chars: Vec<char> = text.chars().collect();
  let mut out = String::with_capacity(text.len() + 8);
  let mut i = 0;

  while i < chars.len() {
    let c = chars[i];
    let eligible = c.is_ascii_alphabetic()
      && !(i > 0 && (chars[i - 1].is_ascii_digit() || chars[i - 1] == '^'))
      && !is_infix_x(&chars, i);
    if !eligible {
      out.push(c);
      i += 1;
      continue;
    }

    let mut j = i + 1;
    let negative = j < chars.len() && matches!(chars[j], '-' | UNICODE_MINUS);
    if negative {
      j += 1;
    }
    let digits_start = j;
    while j < chars.len() && chars[j].is_ascii_digit() {
      j += 1;
    }
    if j == digits_start || !exponent_ends(&chars, j) {
      out.push(c);
      i += 1;
      continue;
    }

    out.push(c);
    out.push('^');
    if negative {
      out.push('-');
    }
    out.extend(&chars[digits_start..j]);
    i = j;
  }
  out
}

fn exponent_ends(chars: &[char], j: usize) -> bool {
  match chars.get(j).copied() {
    None => true,
    Some('x') => is_infix_x(chars, j),
    Some(c) if c.is_alphanumeric() || c == '^' || c == '_' => false,
    Some('.') => !chars.get(j + 1).is_some_and(|c| c.is_ascii_digit()),
    Some(_) => true,
  }
}

/// `x` standing between two quantities: `3 x 10`, `2x3`, `(a) x [b]`.
fn is_infix_x(chars: &[char], i: usize) -> bool {
  if chars.get(i) != Some(&'x') {
    return false;
  }
  let near_ok = |c: Option<&char>, extra: [char; 2]| c.is_some_and(|c| c.is_whitespace() || c.is_ascii_digit() || extra.contains(c));
  if i == 0 || !near_ok(chars.get(i - 1), [')', ']']) || !near_ok(chars.get(i + 1), ['(', '[']) {
    return false;
  }
  let before = chars[..i].iter().rev().find(|c| !c.is_whitespace());
  let after = chars[i + 1..].iter().find(|c| !c.is_whitespace());
  before.is_some_and(|c| c.is_ascii_digit() || matches!(*c, ')' | ']'))
    && after.is_some_and(|c| c.is_ascii_digit() || matches!(*c, '(' | '['))
}

fn rewrite_unit_products(text: &str) -> String {
  NON_SPACE_RUN
    .replace_all(text, |cap: &regex::Captures| {
      let token = &cap[0];
      if is_unit_product(token) { token.replace('.', " * ") } else { token.to_string() }
    })
    .into_owned()
}

fn is_unit_product(token: &str) -> bool {
  UNIT_PRODUCT.is_match(token)
    && token.split('.').all(|piece| {
      let symbol = piece.split('^').next().unwrap_or(piece);
      UNIT_SYMBOLS.contains(&symbol)
    })
}

fn rewrite_operators(text: &str) -> String {
  let chars: Vec<char> = text.chars().collect();
  let mut out = String::with_capacity(text.len() + 8);
  let mut i = 0;

  while i < chars.len() {
    let op = match chars[i] {
      '\u{00D7}' => Some('*'),
      'x' if is_infix_x(&chars, i) => Some('*'),
      '/' => Some('/'),
      _ => None,
    };
    let Some(op) = op else {
      out.push(chars[i]);
      i += 1;
      continue;
    };

    let trimmed = out.trim_end_matches(|c: char| c == ' ' || c == '\t').len();
    out.truncate(trimmed);
    if !out.is_empty() {
      out.push(' ');
    }
    out.push(op);

    i += 1;
    while i < chars.len() && matches!(chars[i], ' ' | '\t') {
      i += 1;
    }
    if i < chars.len() {
      out.push(' ');
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  #[test]
  fn dimensional_formula_drops_zero_exponents() {
    assert_eq!(format_expression("[M L T] 1 -2 0"), "[M^1 L^-2]");
    assert_eq!(format_expression("[MLT] 1 1 -2"), "[M^1 L^1 T^-2]");
    assert_eq!(format_expression("is [M L T] 0 1 −1 here"), "is [L^1 T^-1] here");
  }

  #[test]
  fn dimensional_formula_missing_exponent_drops_symbol() {
    assert_eq!(format_expression("[M L T] 1 -2"), "[M^1 L^-2]");
  }

  #[test]
  fn dimensional_formula_consumes_one_exponent_per_symbol() {
    assert_eq!(format_expression("[M] 2 3"), "[M^2] 3");
  }

  #[test]
  fn bracket_without_exponents_is_untouched() {
    assert_eq!(format_expression("see [A] above"), "see [A] above");
  }

  #[test]
  fn implicit_exponents() {
    assert_eq!(format_expression("4 m-2"), "4 m^-2");
    assert_eq!(format_expression("kg m2 s-3"), "kg m^2 s^-3");
    assert_eq!(format_expression("H2O"), "H2O");
    assert_eq!(format_expression("3.5e10"), "3.5e10");
  }

  #[test]
  fn multiplication_symbols() {
    assert_eq!(format_expression("3 x 10^8"), "3 * 10^8");
    assert_eq!(format_expression("2×3"), "2 * 3");
    assert_eq!(format_expression("3 x10"), "3 * 10");
    assert_eq!(format_expression("N.m"), "N * m");
    assert_eq!(format_expression("kg.m2.s-2"), "kg * m^2 * s^-2");
    assert_eq!(format_expression("a box of 3.5 kg, e.g. sand"), "a box of 3.5 kg, e.g. sand");
  }

  #[test]
  fn dotted_abbreviations_are_not_unit_products() {
    assert_eq!(format_expression("made in U.S.A today"), "made in U.S.A today");
    assert_eq!(format_expression("points a.b.c"), "points a.b.c");
    assert_eq!(format_expression("J.mol-1.K-1"), "J * mol^-1 * K^-1");
    assert_eq!(format_expression("kW.h"), "kW * h");
  }

  #[test]
  fn compact_dimensional_form_is_left_as_written() {
    assert_eq!(format_expression("[ML2T-2]"), "[ML2T-2]");
    assert_eq!(format_expression("[M L2 T-2]"), "[M L^2 T^-2]");
  }

  #[test]
  fn division_is_padded() {
    assert_eq!(format_expression("m/s2"), "m / s^2");
    assert_eq!(format_expression("1 /  2"), "1 / 2");
    assert_eq!(format_expression("a/"), "a /");
  }

  fn fragment() -> impl Strategy<Value = &'static str> {
    prop_oneof![
      Just("m-2"), Just("kg"), Just("3"), Just("x"), Just("×"), Just("/"), Just("N.m"),
      Just("[M L T] 1 -2 0"), Just("[MLT]"), Just("10^8"), Just("kg.m2.s-2"), Just("H2O"),
      Just("3.5"), Just("a2x3"), Just("e.g."), Just("(a)"), Just("U.S.A"), Just("[ML2T-2]"),
    ]
  }

  proptest! {
    #[test]
    fn format_is_idempotent(parts in prop::collection::vec(fragment(), 0..8), glue in prop::sample::select(vec!["", " ", "  "])) {
      let text = parts.join(glue);
      let once = format_expression(&text);
      prop_assert_eq!(format_expression(&once), once);
    }
  }
}
