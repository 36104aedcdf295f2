use pest::{
    Parser,
    iterators::{Pair, Pairs},
};
use pest_derive::Parser;

use crate::{
    error::{ParserError, Result},
    types::{RequestLine, StatusLine},
};

#[derive(Parser)]
#[grammar = "./grammar/message.pest"]
pub struct LineParser;

fn parse_single<'i>(rule: Rule, input: &'i str, what: &str) -> Result<Pair<'i, Rule>> {
    LineParser::parse(rule, input)
        .map_err(|e| ParserError::InvalidSyntax(format!("Failed to parse {what}: {e}")))?
        .next()
        .ok_or_else(|| ParserError::InvalidSyntax(format!("Empty {what}")))
}

fn assert_rule(pair: &Pair<'_, Rule>, expected: Rule, name: &'static str) -> Result<()> {
    if pair.as_rule() == expected {
        Ok(())
    } else {
        Err(ParserError::InvalidSyntax(format!(
            "Expected {name}, found {:?}",
            pair.as_rule()
        )))
    }
}

fn take<'i>(
    inner: &mut Pairs<'i, Rule>,
    expected: Rule,
    name: &'static str,
) -> Result<Pair<'i, Rule>> {
    let pair = inner.next().ok_or(ParserError::MissingField(name))?;
    assert_rule(&pair, expected, name)?;
    Ok(pair)
}

/// Parses `<METHOD> <target> <version>`.
pub fn parse_request_line(input: &str) -> Result<RequestLine> {
    let pair = parse_single(Rule::request_line, input, "request line")?;
    let mut inner = pair.into_inner();

    let method = take(&mut inner, Rule::method, "method")?;
    let target = take(&mut inner, Rule::target, "request target")?;
    let version = take(&mut inner, Rule::http_version, "protocol version")?;

    Ok(RequestLine {
        method: method.as_str().to_string(),
        target: target.as_str().to_string(),
        version: version.as_str().to_string(),
    })
}

/// Parses `<version> <code> [<reason>]`. The reason phrase is trimmed.
pub fn parse_status_line(input: &str) -> Result<StatusLine> {
    let pair = parse_single(Rule::status_line, input, "status line")?;
    let mut inner = pair.into_inner();

    let version = take(&mut inner, Rule::http_version, "protocol version")?;
    let code = take(&mut inner, Rule::status_code, "status code")?;
    let code = code
        .as_str()
        .parse::<u16>()
        .map_err(|_| ParserError::InvalidStatusCode(code.as_str().to_string()))?;

    let reason = inner
        .next()
        .filter(|p| p.as_rule() == Rule::reason)
        .map(|p| p.as_str().trim().to_string())
        .unwrap_or_default();

    Ok(StatusLine {
        version: version.as_str().to_string(),
        code,
        reason,
    })
}

/// Parses `<name>: <value>`.
///
/// Whitespace around the value is optional whitespace in HTTP and is dropped:
/// `X-A:  v  ` yields `("X-A", "v")`.
pub fn parse_header_line(input: &str) -> Result<(String, String)> {
    let pair = parse_single(Rule::header, input, "header")?;
    let mut inner = pair.into_inner();

    let name = take(&mut inner, Rule::header_name, "header name")?;
    let value = take(&mut inner, Rule::header_value, "header value")?;

    Ok((name.as_str().to_string(), value.as_str().trim().to_string()))
}
