//! This module provides the parser for machine descriptions, utilizing the `pest` crate.
//! It reads the line-oriented format produced by [`crate::encode`] back into a [`Description`].

use crate::{
    analyzer::analyze,
    types::{
        Description, Direction, Next, Read, Transition, TuringMachineError, Write, MAX_RANGE_LEN,
        WILDCARD,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;

/// Derives a `PestParser` for the description grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct DescriptionParser;

/// Parses the given input string into a `Description`.
///
/// This is the main entry point for reading machine descriptions. The input is parsed with
/// the `DescriptionParser`, the parse tree is turned into a `Description`, and the result is
/// analyzed before being returned.
///
/// # Arguments
///
/// * `input` - A string slice containing the machine description.
///
/// # Returns
///
/// * `Ok(Description)` if the input is successfully parsed and validated.
/// * `Err(TuringMachineError::ParseError)` if there are any syntax errors.
/// * `Err(TuringMachineError::ValidationError)` if the description fails validation.
pub fn parse(input: &str) -> Result<Description, TuringMachineError> {
    let root = DescriptionParser::parse(Rule::description, input)
        .map_err(|e| TuringMachineError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| TuringMachineError::ValidationError("Empty description".to_string()))?;

    let description = parse_description(root)?;

    analyze(&description)?;

    Ok(description)
}

/// Parses the top-level structure of a description from a `Pair<Rule::description>`.
///
/// Header lines may come in any order but each may appear only once. A comment is kept only
/// when it precedes every header.
fn parse_description(pair: Pair<Rule>) -> Result<Description, TuringMachineError> {
    let mut comment: Option<String> = None;
    let mut states: Option<Vec<String>> = None;
    let mut symbols: Option<Vec<String>> = None;
    let mut blank: Option<String> = None;
    let mut initial_state: Option<String> = None;
    let mut final_states: Option<Vec<String>> = None;
    let mut table: Option<Vec<Transition>> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_rule(rule, span, &mut seen)?;

        match rule {
            Rule::comment if seen.is_empty() && comment.is_none() => {
                comment = Some(parse_comment(p));
            }
            Rule::states => states = Some(parse_tokens(p)),
            Rule::syms => symbols = Some(parse_symbols(p)?),
            Rule::blank => blank = Some(parse_inner_string(p)),
            Rule::initstate => initial_state = Some(parse_inner_string(p)),
            Rule::finalstates => final_states = Some(parse_tokens(p)),
            Rule::table => {
                table = Some(parse_table(
                    p,
                    states.as_deref().unwrap_or_default(),
                    symbols.as_deref().unwrap_or_default(),
                )?)
            }
            _ => {} // Later comments and EOI
        }
    }

    Ok(Description {
        comment,
        states: check_required_rule(states, "states")?,
        symbols: check_required_rule(symbols, "syms")?,
        blank,
        initial_state: check_required_rule(initial_state, "initstate")?,
        final_states: check_required_rule(final_states, "finalstates")?,
        table: check_required_rule(table, "table")?,
    })
}

/// Parses the `syms` header, expanding numeric ranges such as `0-9`.
fn parse_symbols(pair: Pair<Rule>) -> Result<Vec<String>, TuringMachineError> {
    let mut symbols = Vec::new();

    for token in pair.into_inner() {
        let expanded =
            expand_range(token.as_str()).map_err(|msg| parse_error(&msg, token.as_span()))?;
        symbols.extend(expanded);
    }

    Ok(symbols)
}

/// Parses the transition table from a `Pair<Rule::table>`, skipping comment lines.
///
/// `states` and `symbols` are the declarations seen so far; they resolve lists and ranges
/// in the state and read fields.
fn parse_table(
    pair: Pair<Rule>,
    states: &[String],
    symbols: &[String],
) -> Result<Vec<Transition>, TuringMachineError> {
    let mut table = Vec::new();

    for p in pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::transition)
    {
        table.extend(parse_transition(p, states, symbols)?);
    }

    Ok(table)
}

/// Parses a single `state read next write direction` line.
///
/// The state and read fields may hold comma-separated lists and `a-b` ranges over the
/// declaration order, and the state field may be `*` for every declared state. One rule is
/// produced per (state, symbol) pair, states first.
fn parse_transition(
    pair: Pair<Rule>,
    states: &[String],
    symbols: &[String],
) -> Result<Vec<Transition>, TuringMachineError> {
    let mut pairs = pair.into_inner();

    let state_field = next_pair(&mut pairs)?;
    let read_field = next_pair(&mut pairs)?;
    let next = Next::from(parse_string(&mut pairs).as_str());
    let write = Write::from(parse_string(&mut pairs).as_str());
    let direction = parse_direction(&mut pairs)?;

    let sources = match state_field.as_str() {
        WILDCARD => states.to_vec(),
        _ => expand_field(&state_field, states)?,
    };
    let reads = expand_field(&read_field, symbols)?;

    let mut transitions = Vec::with_capacity(sources.len() * reads.len());
    for state in &sources {
        for read in &reads {
            transitions.push(Transition {
                state: state.clone(),
                read: Read::from(read.as_str()),
                next: next.clone(),
                write: write.clone(),
                direction,
            });
        }
    }

    Ok(transitions)
}

/// Expands a state or read field against the declared names.
///
/// A field (or list element) that is itself declared is taken literally. Otherwise an
/// element `a-b` whose ends are both declared covers every name declared from `a` to `b`.
/// Anything else is kept as written and left to the analyzer.
fn expand_field(
    pair: &Pair<Rule>,
    declared: &[String],
) -> Result<Vec<String>, TuringMachineError> {
    let field = pair.as_str();
    if declared.iter().any(|name| name == field) {
        return Ok(vec![field.to_string()]);
    }

    let mut names = Vec::new();
    for element in field.split(',') {
        let expanded =
            expand_element(element, declared).map_err(|msg| parse_error(&msg, pair.as_span()))?;
        names.extend(expanded);
    }

    Ok(names)
}

fn expand_element(element: &str, declared: &[String]) -> Result<Vec<String>, String> {
    if element.is_empty() {
        return Err("Empty element in list".to_string());
    }

    let position = |name: &str| declared.iter().position(|d| d == name);

    if position(element).is_none() {
        if let Some((first, last)) = element.split_once('-') {
            if let (Some(start), Some(end)) = (position(first), position(last)) {
                if start > end {
                    return Err(format!("Empty range: {element}"));
                }
                return Ok(declared[start..=end].to_vec());
            }
        }
    }

    Ok(vec![element.to_string()])
}

/// Takes the next field of a transition.
fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>) -> Result<Pair<'i, Rule>, TuringMachineError> {
    pairs
        .next()
        .ok_or_else(|| TuringMachineError::ValidationError("Incomplete transition".to_string()))
}

/// Parses the direction field, reporting the offending token's span on failure.
fn parse_direction(pairs: &mut Pairs<Rule>) -> Result<Direction, TuringMachineError> {
    let pair = pairs
        .next()
        .ok_or_else(|| TuringMachineError::ValidationError("Missing direction".to_string()))?;

    pair.as_str()
        .parse::<Direction>()
        .map_err(|msg: String| parse_error(&msg, pair.as_span()))
}

/// Returns the bounds of a `<digits>-<digits>` token with an ascending range.
pub(crate) fn numeric_range(token: &str) -> Option<(u64, u64)> {
    let is_number = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    let (start, end) = token.split_once('-')?;
    if !is_number(start) || !is_number(end) {
        return None;
    }

    match (start.parse::<u64>(), end.parse::<u64>()) {
        (Ok(start), Ok(end)) if start <= end => Some((start, end)),
        _ => None,
    }
}

/// Expands a numeric range such as `0-9` into every number it covers.
///
/// Anything that is not a numeric range is returned unchanged. Ranges longer than
/// [`MAX_RANGE_LEN`] are rejected.
fn expand_range(token: &str) -> Result<Vec<String>, String> {
    match numeric_range(token) {
        Some((start, end)) if end - start >= MAX_RANGE_LEN => Err(format!(
            "Symbol range {token} covers more than {MAX_RANGE_LEN} symbols"
        )),
        Some((start, end)) => Ok((start..=end).map(|n| n.to_string()).collect()),
        None => Ok(vec![token.to_string()]),
    }
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

fn parse_comment(pair: Pair<Rule>) -> String {
    parse_inner_string(pair).trim().to_string()
}

/// Collects every token of a list header (`states`, `finalstates`).
fn parse_tokens(pair: Pair<Rule>) -> Vec<String> {
    pair.into_inner().map(|p| p.as_str().to_string()).collect()
}

/// Extracts the inner string content from a `Pair`.
fn parse_inner_string(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

/// Extracts the string content from the current `Pair` in a `Pairs` iterator.
fn parse_string(pairs: &mut Pairs<Rule>) -> String {
    pairs
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

/// Checks if a header has already been declared.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), TuringMachineError> {
    if !matches!(
        rule,
        Rule::states | Rule::syms | Rule::blank | Rule::initstate | Rule::finalstates
    ) {
        return Ok(());
    };

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{}\" declaration", keyword(rule)),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, TuringMachineError> {
    value.ok_or_else(|| TuringMachineError::ValidationError(format!("Missing '{name}' section")))
}

/// The keyword a header rule is written with.
fn keyword(rule: Rule) -> &'static str {
    match rule {
        Rule::states => "states",
        Rule::syms => "syms",
        Rule::blank => "blank",
        Rule::initstate => "initstate",
        Rule::finalstates => "finalstates",
        _ => "table",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;
    use crate::generator::{copy_left, StateNaming};

    #[test]
    fn test_parse_simple_description() {
        let input = "\
# moves right once
states start
syms _ a
initstate start
finalstates HALT
table
start a HALT . R
";

        let result = parse(input);
        assert!(result.is_ok());

        let description = result.unwrap();
        assert_eq!(description.comment.as_deref(), Some("moves right once"));
        assert_eq!(description.states, vec!["start"]);
        assert_eq!(description.symbols, vec!["_", "a"]);
        assert_eq!(description.initial_state, "start");
        assert_eq!(description.final_states, vec!["HALT"]);
        assert_eq!(
            description.table,
            vec![Transition {
                state: "start".into(),
                read: Read::Symbol("a".into()),
                next: Next::State("HALT".into()),
                write: Write::Keep,
                direction: Direction::Right,
            }]
        );
    }

    #[test]
    fn test_parse_generated_description() {
        for naming in [StateNaming::Index, StateNaming::Symbol] {
            let description = copy_left(&["0", "1"], naming);
            let parsed = parse(&encode(&description)).unwrap();

            assert_eq!(parsed, description);
        }
    }

    #[test]
    fn test_parse_headers_in_any_order() {
        let input = "\
finalstates HALT
initstate s
syms _
states s
table
s _ HALT _ S";

        let description = parse(input).unwrap();
        assert_eq!(description.initial_state, "s");
        assert_eq!(description.comment, None);
        assert_eq!(description.table[0].direction, Direction::Stay);
    }

    #[test]
    fn test_parse_comments_and_blank_lines() {
        let input = "\

# first
states s

# second
syms _ a
initstate s
finalstates HALT
table
# a rule
s a HALT _ L

s * . . R
";

        let description = parse(input).unwrap();
        assert_eq!(description.comment.as_deref(), Some("first"));
        assert_eq!(description.table.len(), 2);
        assert_eq!(description.table[1].read, Read::Any);
        assert_eq!(description.table[1].next, Next::Same);
        assert_eq!(description.table[1].write, Write::Keep);
    }

    #[test]
    fn test_parse_symbol_range() {
        let input = "\
states s
syms _ 0-3 a-b 5-2
initstate s
finalstates HALT
table
";

        let description = parse(input).unwrap();
        assert_eq!(
            description.symbols,
            vec!["_", "0", "1", "2", "3", "a-b", "5-2"]
        );
        assert!(description.table.is_empty());
    }

    #[test]
    fn test_parse_explicit_blank() {
        let input = "states s\nsyms B a\nblank B\ninitstate s\nfinalstates HALT\ntable\n";

        let description = parse(input).unwrap();
        assert_eq!(description.blank.as_deref(), Some("B"));
        assert_eq!(description.blank_symbol(), "B");
    }

    #[test]
    fn test_parse_duplicate_header() {
        let input = "states s\nstates t\nsyms _\ninitstate s\nfinalstates HALT\ntable\n";

        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error.to_string().contains("Duplicate \"states\" declaration"));
    }

    #[test]
    fn test_parse_missing_header() {
        let input = "states s\nsyms _\nfinalstates HALT\ntable\n";

        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ValidationError(_)));
        assert_eq!(
            error.to_string(),
            "Description validation error: Missing 'initstate' section"
        );
    }

    #[test]
    fn test_parse_missing_table() {
        let input = "states s\nsyms _\ninitstate s\nfinalstates HALT\n";

        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
    }

    #[test]
    fn test_parse_short_transition() {
        let input = "states s\nsyms _\ninitstate s\nfinalstates HALT\ntable\ns _ HALT _\n";

        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
    }

    #[test]
    fn test_parse_long_transition() {
        let input = "states s\nsyms _\ninitstate s\nfinalstates HALT\ntable\ns _ HALT _ R R\n";

        assert!(parse(input).is_err());
    }

    #[test]
    fn test_parse_unsupported_direction() {
        let input = "states s\nsyms _\ninitstate s\nfinalstates HALT\ntable\ns _ HALT _ X\n";

        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error.to_string().contains("Unsupported direction: X"));
    }

    #[test]
    fn test_parse_runs_analysis() {
        let input = "states s\nsyms _\ninitstate s\nfinalstates HALT\ntable\ns a HALT _ R\n";

        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ValidationError(_)));
    }

    #[test]
    fn test_expand_range() {
        assert_eq!(expand_range("1-2"), Ok(vec!["1".to_string(), "2".to_string()]));
        assert_eq!(expand_range("7-7"), Ok(vec!["7".to_string()]));
        assert_eq!(expand_range("-1"), Ok(vec!["-1".to_string()]));
        assert_eq!(expand_range("x"), Ok(vec!["x".to_string()]));
        assert_eq!(numeric_range("3-1"), None);
        assert_eq!(numeric_range("0-9"), Some((0, 9)));
    }

    #[test]
    fn test_parse_oversized_symbol_range() {
        let input =
            "states s\nsyms _ 0-18446744073709551615\ninitstate s\nfinalstates HALT\ntable\n";

        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error.to_string().contains("covers more than 65536 symbols"));
    }

    #[test]
    fn test_parse_largest_allowed_range() {
        let input = "states s\nsyms 0-65535\ninitstate s\nfinalstates HALT\ntable\n";

        let description = parse(input).unwrap();
        assert_eq!(description.symbols.len(), 65536);
        assert_eq!(description.symbols.last().map(String::as_str), Some("65535"));
    }

    #[test]
    fn test_parse_read_list_fans_out() {
        let input = "states s\nsyms _ a b\ninitstate s\nfinalstates HALT\ntable\ns a,b HALT _ R\n";

        let description = parse(input).unwrap();
        let reads: Vec<&Read> = description.table.iter().map(|t| &t.read).collect();
        assert_eq!(
            reads,
            vec![&Read::Symbol("a".into()), &Read::Symbol("b".into())]
        );
        assert!(description
            .table
            .iter()
            .all(|t| t.state == "s" && t.write == Write::Symbol("_".into())));
    }

    #[test]
    fn test_parse_ranges_and_lists_in_state_and_read() {
        let input = "\
states s0 s1 s2 t
syms _ 0-3
initstate s0
finalstates HALT
table
s0-s1,t 1-2 HALT . L
";

        let description = parse(input).unwrap();
        let pairs: Vec<(&str, &str)> = description
            .table
            .iter()
            .map(|t| (t.state.as_str(), t.read.symbol().unwrap_or("*")))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("s0", "1"),
                ("s0", "2"),
                ("s1", "1"),
                ("s1", "2"),
                ("t", "1"),
                ("t", "2"),
            ]
        );
    }

    #[test]
    fn test_parse_wildcard_state() {
        let input = "states a b\nsyms _\ninitstate a\nfinalstates HALT\ntable\n* _ HALT . R\n";

        let description = parse(input).unwrap();
        let states: Vec<&str> = description.table.iter().map(|t| t.state.as_str()).collect();
        assert_eq!(states, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_first_rule_wins() {
        let input = "\
states s
syms _ a b
initstate s
finalstates HALT
table
s a HALT _ R
s a,b s . L
";

        let description = parse(input).unwrap();
        assert_eq!(description.table.len(), 3);
        assert_eq!(
            description.rule_for("s", "a").map(|t| t.direction),
            Some(Direction::Right)
        );
        assert_eq!(
            description.rule_for("s", "b").map(|t| t.direction),
            Some(Direction::Left)
        );
        assert!(description.rule_for("s", "_").is_none());
    }

    #[test]
    fn test_parse_declared_names_win_over_list_syntax() {
        let input = "\
states s
syms _ a b a,b x-y
initstate s
finalstates HALT
table
s a,b HALT x-y R
";

        let description = parse(input).unwrap();
        assert_eq!(description.table.len(), 1);
        assert_eq!(description.table[0].read, Read::Symbol("a,b".into()));
        assert_eq!(description.table[0].write, Write::Symbol("x-y".into()));
    }

    #[test]
    fn test_parse_empty_range() {
        let input = "states s\nsyms _ a b\ninitstate s\nfinalstates HALT\ntable\ns b-a HALT _ R\n";

        let error = parse(input).unwrap_err();
        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error.to_string().contains("Empty range: b-a"));
    }

    #[test]
    fn test_parse_empty_list_element() {
        let input = "states s\nsyms _ a\ninitstate s\nfinalstates HALT\ntable\ns a,,_ HALT _ R\n";

        let error = parse(input).unwrap_err();
        assert!(error.to_string().contains("Empty element in list"));
    }

    #[test]
    fn test_parse_generated_numeric_range_token() {
        // `0-2` declares 0, 1 and 2, so the read field fans out, and the written `0-2`
        // names no declared symbol.
        let output = encode(&copy_left(&["0-2"], StateNaming::Index));

        let error = parse(&output).unwrap_err();
        assert!(matches!(error, TuringMachineError::ValidationError(_)));
        assert!(error.to_string().contains("\"0-2\""));
    }

    #[test]
    fn test_parse_generated_dashed_and_listed_tokens() {
        for naming in [StateNaming::Index, StateNaming::Symbol] {
            let description = copy_left(&["a-b", "x,y", "1-z"], naming);
            let parsed = parse(&encode(&description)).unwrap();

            assert_eq!(parsed, description);
        }
    }
}
