//! English date/time grammar.
//!
//! Finds expressions like `tomorrow at 4pm`, `next friday`, `oct 20`,
//! `in 3 days`, `9am on monday` or `2026-10-20 16:00` anywhere inside a line
//! of text. Only the leftmost expression is returned.

use std::sync::OnceLock;

use chrono::{Datelike, Days, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::{Captures, Regex};
use tracing::debug;

use crate::time::{DateExpressionParser, DateMatch};

const MONTH: &str = r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";
const WEEKDAY: &str = r"monday|mon|tuesday|tues|tue|wednesday|wed|thursday|thurs|thur|thu|friday|fri|saturday|sat|sunday|sun";
const COUNT: &str = r"\d+|an?|one|two|three|four|five|six|seven|eight|nine|ten";
const UNIT: &str = r"minute|hour|day|week|month|year";
const YEAR: &str = r"(?:19|20)\d{2}";

const TONIGHT_HOUR: u32 = 22;

struct DatePatterns {
    date: Regex,
    time: Regex,
    // Anchored at the start of the text that follows a match.
    date_suffix: Regex,
    time_suffix: Regex,
    // "at 3": only a time when a date follows.
    bare_hour: Regex,
}

fn patterns() -> &'static DatePatterns {
    static PATTERNS: OnceLock<DatePatterns> = OnceLock::new();
    PATTERNS.get_or_init(DatePatterns::new)
}

impl DatePatterns {
    fn new() -> Self {
        let date_body = format!(
            r"(?P<iso>(?P<iso_y>\d{{4}})-(?P<iso_m>\d{{1,2}})-(?P<iso_d>\d{{1,2}}))
            |(?P<slash>(?P<sl_m>\d{{1,2}})/(?P<sl_d>\d{{1,2}})(?:/(?P<sl_y>\d{{4}}|\d{{2}}))?)
            |(?P<md>(?P<md_m>{MONTH})\.?\s+(?P<md_d>\d{{1,2}})(?:st|nd|rd|th)?(?:,?\s+(?P<md_y>{YEAR}))?)
            |(?P<dm>(?P<dm_d>\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?(?P<dm_m>{MONTH})(?:,?\s+(?P<dm_y>{YEAR}))?)
            |(?P<next>next\s+(?P<next_u>week|month|year))
            |(?P<within>in\s+(?P<in_n>{COUNT})\s+(?P<in_u>{UNIT})s?)
            |(?P<hence>(?P<fn_n>{COUNT})\s+(?P<fn_u>{UNIT})s?\s+from\s+now)
            |(?P<casual>today|tonight|tomorrow|tmrw|tmr|yesterday)
            |(?P<wd>(?:(?P<wd_mod>on|this|next|last)\s+)?(?P<wd_day>{WEEKDAY}))"
        );
        let time_body = r"(?P<t12_h>\d{1,2})(?::(?P<t12_m>\d{2}))?\s*(?P<t12_ap>am|pm)
            |(?P<t24_h>\d{1,2}):(?P<t24_m>\d{2})
            |(?P<named>noon|midnight)";

        let compile = |pattern: String| Regex::new(&pattern).expect("date grammar must compile");

        Self {
            date: compile(format!(r"(?ix)\b(?:{date_body})\b")),
            time: compile(format!(r"(?ix)(?:\bat\s+|@\s*|\b)(?:{time_body})\b")),
            date_suffix: compile(format!(r"(?ix)^\s+(?:on\s+)?(?:{date_body})\b")),
            time_suffix: compile(format!(
                r"(?ix)^\s+(?:(?:at\s+|@\s*)?(?:{time_body})|(?:at\s+|@\s*)(?P<bare_h>\d{{1,2}}))\b"
            )),
            bare_hour: compile(r"(?ix)(?:\bat\s+|@\s*)(?P<bare_h>\d{1,2})\b".to_string()),
        }
    }
}

/// A resolved date expression before any time of day is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
enum DateValue {
    Day {
        date: NaiveDate,
        implied: Option<NaiveTime>,
    },
    // Offsets like "in 2 hours" already carry a clock time.
    Instant(NaiveDateTime),
}

/// The bundled [`DateExpressionParser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishDateParser;

impl EnglishDateParser {
    pub fn new() -> Self {
        Self
    }

    fn find_date(&self, text: &str, now: NaiveDateTime) -> Option<(usize, usize, DateValue)> {
        let mut at = 0;
        while at <= text.len() {
            let caps = patterns().date.captures_at(text, at)?;
            let whole = caps.get(0)?;
            if let Some(value) = resolve_date(&caps, now) {
                return Some((whole.start(), whole.end(), value));
            }
            at = next_char_boundary(text, whole.start());
        }
        None
    }

    fn find_time(&self, text: &str) -> Option<(usize, usize, NaiveTime)> {
        let mut at = 0;
        while at <= text.len() {
            let caps = patterns().time.captures_at(text, at)?;
            let whole = caps.get(0)?;
            if let Some(time) = resolve_time(&caps) {
                return Some((whole.start(), whole.end(), time));
            }
            at = next_char_boundary(text, whole.start());
        }
        None
    }

    /// "at 3 tomorrow": a bare hour followed by a day.
    fn find_hour_before_date(
        &self,
        text: &str,
        now: NaiveDateTime,
    ) -> Option<(usize, usize, NaiveDateTime)> {
        let mut at = 0;
        while at <= text.len() {
            let caps = patterns().bare_hour.captures_at(text, at)?;
            let whole = caps.get(0)?;
            let day = resolve_time(&caps).and_then(|t| {
                let tail = patterns().date_suffix.captures(&text[whole.end()..])?;
                match resolve_date(&tail, now)? {
                    DateValue::Day { date, .. } => Some((tail.get(0)?.end(), date.and_time(t))),
                    DateValue::Instant(_) => None,
                }
            });
            if let Some((len, value)) = day {
                return Some((whole.start(), whole.end() + len, value));
            }
            at = next_char_boundary(text, whole.start());
        }
        None
    }
}

impl DateExpressionParser for EnglishDateParser {
    fn parse(&self, text: &str, now: NaiveDateTime) -> Option<DateMatch> {
        let date = self.find_date(text, now);
        let time = self.find_time(text);
        let hour = self.find_hour_before_date(text, now);

        let hour_first = match (&hour, &date, &time) {
            (None, _, _) => false,
            (Some((hs, _, _)), d, t) => {
                d.as_ref().map_or(true, |(ds, _, _)| hs < ds)
                    && t.as_ref().map_or(true, |(ts, _, _)| hs < ts)
            }
        };
        if hour_first {
            let (start, end, value) = hour?;
            return Some(self.matched(text, start, end, value, true));
        }

        let date_first = match (&date, &time) {
            (None, None) => return None,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some((ds, de, _)), Some((ts, te, _))) => ds < ts || (ds == ts && de >= te),
        };

        let (start, end, value, has_time) = if date_first {
            let (start, mut end, value) = date?;
            match value {
                DateValue::Instant(at) => (start, end, at, true),
                DateValue::Day { date, implied } => {
                    let rest = &text[end..];
                    let explicit = patterns()
                        .time_suffix
                        .captures(rest)
                        .and_then(|caps| Some((caps.get(0)?.end(), resolve_time(&caps)?)));
                    match explicit {
                        Some((len, t)) => {
                            end += len;
                            (start, end, date.and_time(t), true)
                        }
                        None => (
                            start,
                            end,
                            date.and_time(implied.unwrap_or(NaiveTime::MIN)),
                            implied.is_some(),
                        ),
                    }
                }
            }
        } else {
            let (start, mut end, t) = time?;
            let rest = &text[end..];
            let day = patterns()
                .date_suffix
                .captures(rest)
                .and_then(|caps| Some((caps.get(0)?.end(), resolve_date(&caps, now)?)));
            match day {
                Some((len, DateValue::Day { date, .. })) => {
                    end += len;
                    (start, end, date.and_time(t), true)
                }
                _ => (start, end, now.date().and_time(t), true),
            }
        };

        Some(self.matched(text, start, end, value, has_time))
    }
}

impl EnglishDateParser {
    fn matched(
        &self,
        text: &str,
        start: usize,
        end: usize,
        value: NaiveDateTime,
        has_time: bool,
    ) -> DateMatch {
        let matched = DateMatch {
            value,
            start,
            end,
            text: text[start..end].to_string(),
            has_time,
        };
        debug!(expression = %matched.text, resolved = %matched.value, "date expression matched");
        matched
    }
}

fn next_char_boundary(text: &str, from: usize) -> usize {
    text[from..]
        .chars()
        .next()
        .map(|c| from + c.len_utf8())
        .unwrap_or(text.len() + 1)
}

fn resolve_date(caps: &Captures<'_>, now: NaiveDateTime) -> Option<DateValue> {
    let today = now.date();
    let day = |date: NaiveDate| DateValue::Day { date, implied: None };

    if caps.name("iso").is_some() {
        let date = NaiveDate::from_ymd_opt(
            number(caps, "iso_y")? as i32,
            number(caps, "iso_m")?,
            number(caps, "iso_d")?,
        )?;
        return Some(day(date));
    }

    if caps.name("slash").is_some() {
        let month = number(caps, "sl_m")?;
        let dom = number(caps, "sl_d")?;
        let date = match caps.name("sl_y") {
            Some(y) => {
                let mut year: i32 = y.as_str().parse().ok()?;
                if y.as_str().len() == 2 {
                    year += 2000;
                }
                NaiveDate::from_ymd_opt(year, month, dom)?
            }
            None => closest_date(month, dom, today)?,
        };
        return Some(day(date));
    }

    if caps.name("md").is_some() || caps.name("dm").is_some() {
        let (m, d, y) = if caps.name("md").is_some() {
            ("md_m", "md_d", "md_y")
        } else {
            ("dm_m", "dm_d", "dm_y")
        };
        let month = month_number(caps.name(m)?.as_str())?;
        let dom = number(caps, d)?;
        let date = match caps.name(y) {
            Some(year) => NaiveDate::from_ymd_opt(year.as_str().parse().ok()?, month, dom)?,
            None => closest_date(month, dom, today)?,
        };
        return Some(day(date));
    }

    if let Some(unit) = caps.name("next_u") {
        let date = match unit.as_str().to_lowercase().as_str() {
            "week" => today + Duration::weeks(1),
            "month" => today.checked_add_months(Months::new(1))?,
            _ => today.checked_add_months(Months::new(12))?,
        };
        return Some(day(date));
    }

    let offset = if caps.name("within").is_some() {
        Some(("in_n", "in_u"))
    } else if caps.name("hence").is_some() {
        Some(("fn_n", "fn_u"))
    } else {
        None
    };
    if let Some((n, u)) = offset {
        let count = count(caps.name(n)?.as_str())?;
        return match caps.name(u)?.as_str().to_lowercase().as_str() {
            "minute" => Some(DateValue::Instant(
                now.checked_add_signed(Duration::try_minutes(count as i64)?)?,
            )),
            "hour" => Some(DateValue::Instant(
                now.checked_add_signed(Duration::try_hours(count as i64)?)?,
            )),
            "day" => Some(day(today.checked_add_days(Days::new(count as u64))?)),
            "week" => Some(day(today.checked_add_days(Days::new(count as u64 * 7))?)),
            "month" => Some(day(today.checked_add_months(Months::new(count))?)),
            _ => Some(day(today.checked_add_months(Months::new(count.checked_mul(12)?))?)),
        };
    }

    if let Some(word) = caps.name("casual") {
        return match word.as_str().to_lowercase().as_str() {
            "today" => Some(day(today)),
            "tonight" => Some(DateValue::Day {
                date: today,
                implied: NaiveTime::from_hms_opt(TONIGHT_HOUR, 0, 0),
            }),
            "yesterday" => Some(day(today.pred_opt()?)),
            _ => Some(day(today.succ_opt()?)),
        };
    }

    if let Some(name) = caps.name("wd_day") {
        let name = name.as_str().to_lowercase();
        let modifier = caps.name("wd_mod").map(|m| m.as_str().to_lowercase());
        let (weekday, abbreviated) = parse_weekday(&name)?;
        // "sat", "sun", "wed" are ordinary words; abbreviations need a modifier.
        if abbreviated && modifier.is_none() {
            return None;
        }
        return Some(day(weekday_date(today, weekday, modifier.as_deref())));
    }

    None
}

fn resolve_time(caps: &Captures<'_>) -> Option<NaiveTime> {
    if caps.name("t12_h").is_some() {
        let hour = number(caps, "t12_h")?;
        let minute = caps.name("t12_m").map_or(Some(0), |m| m.as_str().parse().ok())?;
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = caps.name("t12_ap")?.as_str().eq_ignore_ascii_case("pm");
        let hour = match (pm, hour) {
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, 12) => 0,
            (false, h) => h,
        };
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    if caps.name("t24_h").is_some() {
        return NaiveTime::from_hms_opt(number(caps, "t24_h")?, number(caps, "t24_m")?, 0);
    }

    if caps.name("bare_h").is_some() {
        return NaiveTime::from_hms_opt(number(caps, "bare_h")?, 0, 0);
    }

    match caps.name("named")?.as_str().to_lowercase().as_str() {
        "noon" => NaiveTime::from_hms_opt(12, 0, 0),
        _ => Some(NaiveTime::MIN),
    }
}

fn number(caps: &Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name)?.as_str().parse().ok()
}

fn count(word: &str) -> Option<u32> {
    let n = match word.to_lowercase().as_str() {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        digits => digits.parse().ok()?,
    };
    Some(n)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.to_lowercase().chars().take(3).collect();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn parse_weekday(name: &str) -> Option<(Weekday, bool)> {
    let weekday = match name {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tues" | "tue" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thurs" | "thur" | "thu" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some((weekday, !name.ends_with("day")))
}

/// Picks the year that puts `month`/`day` closest to `today`.
///
/// Feb 29 can be more than a year away; it falls forward to the next leap year.
fn closest_date(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    [today.year(), today.year() + 1, today.year() - 1]
        .into_iter()
        .filter_map(|y| NaiveDate::from_ymd_opt(y, month, day))
        .min_by_key(|d| (*d - today).num_days().abs())
        .or_else(|| (2..=8).find_map(|n| NaiveDate::from_ymd_opt(today.year() + n, month, day)))
}

fn weekday_date(today: NaiveDate, target: Weekday, modifier: Option<&str>) -> NaiveDate {
    let from_monday = today.weekday().num_days_from_monday() as i64;
    let ahead = (target.num_days_from_monday() as i64 - from_monday).rem_euclid(7);

    let offset = match modifier {
        Some("next") => {
            let ahead = if ahead == 0 { 7 } else { ahead };
            // Still inside the current week: "next" means the week after.
            if from_monday + ahead <= 6 {
                ahead + 7
            } else {
                ahead
            }
        }
        Some("last") => {
            let back = (from_monday - target.num_days_from_monday() as i64).rem_euclid(7);
            -(if back == 0 { 7 } else { back })
        }
        _ => ahead,
    };
    today + Duration::days(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Sunday.
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap().and_hms_opt(10, 30, 0).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    fn parse(text: &str) -> Option<DateMatch> {
        EnglishDateParser::new().parse(text, now())
    }

    #[test]
    fn test_date_then_time() {
        let m = parse("Sync tomorrow at 4pm").unwrap();
        assert_eq!(m.value, at(2026, 10, 19, 16, 0));
        assert_eq!(m.text, "tomorrow at 4pm");
        assert_eq!(m.span(), 5..20);
        assert!(m.has_time);
    }

    #[test]
    fn test_time_then_date() {
        let m = parse("Standup 9:15am on monday").unwrap();
        assert_eq!(m.value, at(2026, 10, 19, 9, 15));
        assert_eq!(m.text, "9:15am on monday");

        let m = parse("call 4pm tomorrow please").unwrap();
        assert_eq!(m.value, at(2026, 10, 19, 16, 0));
        assert_eq!(m.text, "4pm tomorrow");
    }

    #[test]
    fn test_date_without_time_is_midnight() {
        let m = parse("Pay rent tomorrow").unwrap();
        assert_eq!(m.value, at(2026, 10, 19, 0, 0));
        assert!(!m.has_time);
    }

    #[test]
    fn test_bare_time_is_today() {
        let m = parse("Lunch at noon").unwrap();
        assert_eq!(m.value, at(2026, 10, 18, 12, 0));
        assert_eq!(m.text, "at noon");

        let m = parse("Deploy at 16:45").unwrap();
        assert_eq!(m.value, at(2026, 10, 18, 16, 45));
    }

    #[test]
    fn test_tonight_implies_evening() {
        let m = parse("Read tonight").unwrap();
        assert_eq!(m.value, at(2026, 10, 18, 22, 0));

        let m = parse("Read tonight at 9pm").unwrap();
        assert_eq!(m.value, at(2026, 10, 18, 21, 0));
    }

    #[test]
    fn test_calendar_dates() {
        assert_eq!(parse("Ship 2026-11-02").unwrap().value, at(2026, 11, 2, 0, 0));
        assert_eq!(parse("Ship 2026-11-02 14:00").unwrap().value, at(2026, 11, 2, 14, 0));
        assert_eq!(parse("Review oct 20").unwrap().value, at(2026, 10, 20, 0, 0));
        assert_eq!(parse("Review October 20th, 2027").unwrap().value, at(2027, 10, 20, 0, 0));
        assert_eq!(parse("Review 20th of october").unwrap().value, at(2026, 10, 20, 0, 0));
        assert_eq!(parse("Taxes 4/15").unwrap().value, at(2027, 4, 15, 0, 0));
        assert_eq!(parse("Taxes 4/15/26").unwrap().value, at(2026, 4, 15, 0, 0));
    }

    #[test]
    fn test_month_day_picks_closest_year() {
        assert_eq!(parse("Plan jan 5").unwrap().value, at(2027, 1, 5, 0, 0));
        assert_eq!(parse("Recap sep 30").unwrap().value, at(2026, 9, 30, 0, 0));
    }

    #[test]
    fn test_leap_day_falls_forward() {
        let m = parse("Leap party feb 29").unwrap();
        assert_eq!(m.value, at(2028, 2, 29, 0, 0));
        assert_eq!(m.text, "feb 29");

        let m = parse("Leap party 2/29").unwrap();
        assert_eq!(m.value, at(2028, 2, 29, 0, 0));
    }

    #[test]
    fn test_bare_hour_next_to_a_date() {
        let m = parse("Meeting at 3 tomorrow").unwrap();
        assert_eq!(m.value, at(2026, 10, 19, 3, 0));
        assert_eq!(m.text, "at 3 tomorrow");
        assert!(m.has_time);

        let m = parse("Meeting tomorrow at 15").unwrap();
        assert_eq!(m.value, at(2026, 10, 19, 15, 0));
        assert_eq!(m.text, "tomorrow at 15");

        let m = parse("Dinner @ 19 on friday").unwrap();
        assert_eq!(m.value, at(2026, 10, 23, 19, 0));
    }

    #[test]
    fn test_bare_hour_alone_is_not_a_time() {
        assert!(parse("Table at 3").is_none());
        let m = parse("Table at 3 seats tomorrow").unwrap();
        assert_eq!(m.text, "tomorrow");
        assert_eq!(parse("Meet at 25 tomorrow").unwrap().text, "tomorrow");
    }

    #[test]
    fn test_at_sign_prefix() {
        let m = parse("Call mom @4pm").unwrap();
        assert_eq!(m.value, at(2026, 10, 18, 16, 0));
        assert_eq!(m.text, "@4pm");
    }

    #[test]
    fn test_relative_offsets() {
        assert_eq!(parse("Follow up in 3 days").unwrap().value, at(2026, 10, 21, 0, 0));
        assert_eq!(parse("Follow up in two weeks").unwrap().value, at(2026, 11, 1, 0, 0));
        assert_eq!(parse("Check oven in 2 hours").unwrap().value, at(2026, 10, 18, 12, 30));
        assert_eq!(parse("Renew a month from now").unwrap().value, at(2026, 11, 18, 0, 0));
        assert_eq!(parse("Retro next week").unwrap().value, at(2026, 10, 25, 0, 0));
    }

    #[test]
    fn test_weekdays() {
        // From a Sunday.
        assert_eq!(parse("Gym friday").unwrap().value, at(2026, 10, 23, 0, 0));
        assert_eq!(parse("Gym on friday").unwrap().text, "on friday");
        assert_eq!(parse("Gym next fri").unwrap().value, at(2026, 10, 23, 0, 0));
        assert_eq!(parse("Gym last friday").unwrap().value, at(2026, 10, 16, 0, 0));
        assert_eq!(parse("Gym sunday").unwrap().value, at(2026, 10, 18, 0, 0));
        assert_eq!(parse("Gym next sunday").unwrap().value, at(2026, 10, 25, 0, 0));
    }

    #[test]
    fn test_next_weekday_inside_current_week() {
        let monday = at(2026, 10, 19, 8, 0);
        let m = EnglishDateParser::new().parse("Demo next friday", monday).unwrap();
        assert_eq!(m.value, at(2026, 10, 30, 0, 0));
    }

    #[test]
    fn test_plain_words_are_not_dates() {
        assert!(parse("Buy sun cream").is_none());
        assert!(parse("I may call the bank").is_none());
        assert!(parse("March forward").is_none());
        assert!(parse("Refactor the parser").is_none());
        assert!(parse("").is_none());
    }

    #[test]
    fn test_invalid_values_are_skipped() {
        assert!(parse("Meet at 25:00").is_none());
        let m = parse("Fix 2/31 bug by friday").unwrap();
        assert_eq!(m.text, "friday");
    }

    #[test]
    fn test_only_leftmost_match_is_used() {
        let m = parse("Draft today, send tomorrow").unwrap();
        assert_eq!(m.text, "today");
        assert_eq!(m.value, at(2026, 10, 18, 0, 0));
    }

    #[test]
    fn test_case_insensitive() {
        let m = parse("Sync TOMORROW At 4PM").unwrap();
        assert_eq!(m.value, at(2026, 10, 19, 16, 0));
    }
}
