//! Pulling usable fragments out of free-form generator replies.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::multispace0,
    combinator::opt,
    IResult,
};

/// Inner content of the first ```json fenced block (language tag optional).
pub fn fenced_json(input: &str) -> Option<&str> {
    json_fence(input).ok().map(|(_, inner)| inner)
}

/// Inner content of the first ```sql fenced block (language tag optional,
/// upper or lower case).
pub fn fenced_sql(input: &str) -> Option<&str> {
    sql_fence(input).ok().map(|(_, inner)| inner)
}

/// Substring from the first `{` to the last `}`, when both exist in order.
pub fn brace_span(input: &str) -> Option<&str> {
    let start = input.find('{')?;
    let end = input.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&input[start..=end])
}

fn json_fence(input: &str) -> IResult<&str, &str> {
    let (input, _) = take_until("```")(input)?;
    let (input, _) = tag("```")(input)?;
    let (input, _) = opt(tag("json"))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, inner) = take_until("```")(input)?;
    let (input, _) = tag("```")(input)?;
    Ok((input, inner))
}

fn sql_fence(input: &str) -> IResult<&str, &str> {
    let (input, _) = take_until("```")(input)?;
    let (input, _) = tag("```")(input)?;
    let (input, _) = opt(alt((tag("sql"), tag("SQL"))))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, inner) = take_until("```")(input)?;
    let (input, _) = tag("```")(input)?;
    Ok((input, inner))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_json_with_tag() {
        let text = "Here is the chart:\n```json\n{\"type\": \"bar\"}\n```\nDone.";
        assert_eq!(fenced_json(text), Some("{\"type\": \"bar\"}\n"));
    }

    #[test]
    fn test_fenced_json_without_tag() {
        let text = "```\n{\"a\": 1}\n```";
        assert_eq!(fenced_json(text), Some("{\"a\": 1}\n"));
    }

    #[test]
    fn test_fenced_sql_accepts_both_cases() {
        assert_eq!(fenced_sql("```sql\nSELECT 1\n```"), Some("SELECT 1\n"));
        assert_eq!(fenced_sql("```SQL\nSELECT 2\n```"), Some("SELECT 2\n"));
    }

    #[test]
    fn test_first_block_wins() {
        let text = "```\nfirst\n```\nand\n```\nsecond\n```";
        assert_eq!(fenced_json(text), Some("first\n"));
    }

    #[test]
    fn test_unclosed_fence_is_none() {
        assert_eq!(fenced_json("```json\n{\"a\": 1}"), None);
        assert_eq!(fenced_sql("no fence here"), None);
    }

    #[test]
    fn test_brace_span() {
        assert_eq!(brace_span("text {\"a\": 1} trailing"), Some("{\"a\": 1}"));
        assert_eq!(brace_span("} reversed {"), None);
        assert_eq!(brace_span("no braces"), None);
    }
}
