//! Flat s-expression reader shared by facts and procedural forms.
//!
//! Shapes:
//! - atom: a maximal run of characters other than whitespace, `(` and `)`;
//! - list: `(HEAD arg*)`, e.g. `(ATIME VJ1 HUE 13:30HR)`;
//! - form: `(COMMAND OUT list*)`, e.g. `(PRINT-ALL ?m1 (MÁY_BAY ?m1)(ATIME ?m1 HUE ?))`.
//!
//! Dependency arcs `label(head, dependent)` go through the same reader. Their
//! tokens may hold spaces and punctuation, so the head runs to the first `, `
//! and the dependent to the final `)`.
//!
//! Nesting deeper than a form is never needed, so none is accepted.

use nom::{
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{char as pchar, multispace0, multispace1},
    combinator::{all_consuming, map_opt, rest},
    multi::many0,
    sequence::{delimited, preceded},
    IResult,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SexprError {
    #[error("expected `(HEAD arg ...)`, found `{0}`")]
    List(String),
    #[error("expected `(COMMAND OUT (COND ...) ...)`, found `{0}`")]
    Form(String),
    #[error("expected `label(head, dependent)`, found `{0}`")]
    Arc(String),
}

/// `(head args...)` with borrowed atoms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SList<'a> {
    pub head: &'a str,
    pub args: Vec<&'a str>,
}

/// `(command output lists...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SForm<'a> {
    pub command: &'a str,
    pub output: &'a str,
    pub lists: Vec<SList<'a>>,
}

fn is_atom_char(c: char) -> bool {
    !c.is_whitespace() && c != '(' && c != ')'
}

fn atom(input: &str) -> IResult<&str, &str> {
    take_while1(is_atom_char)(input)
}

fn list(input: &str) -> IResult<&str, SList<'_>> {
    let (input, _) = multispace0(input)?;
    let (input, _) = pchar('(')(input)?;
    let (input, _) = multispace0(input)?;
    let (input, head) = atom(input)?;
    let (input, args) = many0(preceded(multispace1, atom))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = pchar(')')(input)?;
    Ok((input, SList { head, args }))
}

fn form(input: &str) -> IResult<&str, SForm<'_>> {
    let (input, _) = multispace0(input)?;
    let (input, _) = pchar('(')(input)?;
    let (input, _) = multispace0(input)?;
    let (input, command) = atom(input)?;
    let (input, output) = preceded(multispace1, atom)(input)?;
    let (input, lists) = many0(list)(input)?;
    let (input, _) = delimited(multispace0, pchar(')'), multispace0)(input)?;
    Ok((input, SForm { command, output, lists }))
}

/// `label(head, dependent)`, borrowed and trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SArc<'a> {
    pub label: &'a str,
    pub head: &'a str,
    pub dependent: &'a str,
}

fn arc(input: &str) -> IResult<&str, SArc<'_>> {
    let (input, label) = take_while1(|c: char| c.is_alphanumeric() || c == '-')(input)?;
    let (input, _) = pchar('(')(input)?;
    let (input, head) = take_until(", ")(input)?;
    let (input, _) = tag(", ")(input)?;
    let (input, dependent) = map_opt(rest, |r: &str| r.strip_suffix(')'))(input)?;
    Ok((
        input,
        SArc {
            label,
            head: head.trim(),
            dependent: dependent.trim(),
        },
    ))
}

/// Read exactly one arc. Empty head or dependent is an error.
pub fn parse_arc(text: &str) -> Result<SArc<'_>, SexprError> {
    all_consuming(arc)(text.trim())
        .map(|(_, v)| v)
        .ok()
        .filter(|a| !a.head.is_empty() && !a.dependent.is_empty())
        .ok_or_else(|| SexprError::Arc(text.to_string()))
}

/// Read exactly one list; trailing text is an error.
pub fn parse_list(text: &str) -> Result<SList<'_>, SexprError> {
    all_consuming(delimited(multispace0, list, multispace0))(text)
        .map(|(_, v)| v)
        .map_err(|_| SexprError::List(text.to_string()))
}

/// Read exactly one form; trailing text is an error.
pub fn parse_form(text: &str) -> Result<SForm<'_>, SexprError> {
    all_consuming(form)(text)
        .map(|(_, v)| v)
        .map_err(|_| SexprError::Form(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_fact_lists() {
        let list = parse_list("  (RUN-TIME VN1 HN HUE 2:00HR) ").expect("list");
        assert_eq!(list.head, "RUN-TIME");
        assert_eq!(list.args, vec!["VN1", "HN", "HUE", "2:00HR"]);
        assert_eq!(parse_list("(MÁY_BAY VN1)").expect("list").head, "MÁY_BAY");
    }

    #[test]
    fn reads_forms_with_and_without_spacing() {
        let form = parse_form("(PRINT-ALL ?m1 (MÁY_BAY ?m1)(ATIME ?m1 HUE 13:30HR))").expect("form");
        assert_eq!(form.command, "PRINT-ALL");
        assert_eq!(form.output, "?m1");
        assert_eq!(form.lists.len(), 2);
        assert_eq!(form.lists[1].args, vec!["?m1", "HUE", "13:30HR"]);

        let spaced = parse_form("( TEST ?m1 ( DTIME VN4 ĐN ? ) )").expect("form");
        assert_eq!(spaced.lists[0].args, vec!["VN4", "ĐN", "?"]);
    }

    #[test]
    fn reads_arcs_with_spaced_and_punctuation_tokens() {
        let arc = parse_arc(" nmod(từ, TP. Hồ Chí Minh) ").expect("arc");
        assert_eq!((arc.label, arc.head, arc.dependent), ("nmod", "từ", "TP. Hồ Chí Minh"));
        assert_eq!(parse_arc("punctuation(bay, ))").expect("arc").dependent, ")");
        assert_eq!(parse_arc("punctuation(bay, ,)").expect("arc").dependent, ",");
        assert!(matches!(parse_arc("nsubj bay máy bay"), Err(SexprError::Arc(_))));
        assert!(matches!(parse_arc("nsubj(bay, )"), Err(SexprError::Arc(_))));
        assert!(matches!(parse_arc("nsubj(bay máy bay)"), Err(SexprError::Arc(_))));
    }

    #[test]
    fn rejects_nesting_and_trailing_text() {
        assert!(matches!(parse_list("(A (B C))"), Err(SexprError::List(_))));
        assert!(matches!(parse_list("(A B) extra"), Err(SexprError::List(_))));
        assert!(matches!(parse_list("A B"), Err(SexprError::List(_))));
        assert!(matches!(parse_form("(PRINT-ALL)"), Err(SexprError::Form(_))));
        assert!(parse_form("Invalid query").is_err());
    }
}
