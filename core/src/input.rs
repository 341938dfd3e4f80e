use chrono::NaiveDateTime;

use crate::model::task::normalize_title;
use crate::time::DateExpressionParser;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInput {
    pub title: String,
    pub due_date: Option<NaiveDateTime>,
}

/// Splits raw task input into a title and an optional due date.
///
/// Only the span the parser matched is removed, so identical text elsewhere
/// in the input survives. The title never comes back empty.
pub fn interpret(raw: &str, parser: &dyn DateExpressionParser, now: NaiveDateTime) -> ParsedInput {
    let Some(found) = parser.parse(raw, now) else {
        return ParsedInput {
            title: normalize_title(raw),
            due_date: None,
        };
    };

    let remainder = format!("{}{}", &raw[..found.start], &raw[found.end..]);
    let collapsed = remainder.split_whitespace().collect::<Vec<_>>().join(" ");

    ParsedInput {
        title: normalize_title(&collapsed),
        due_date: Some(found.value),
    }
}
