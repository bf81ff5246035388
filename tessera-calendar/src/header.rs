//! Header and label text for calendar surfaces.
//!
//! Formatting and translation are supplied by the host through
//! [`DateFormatter`] and [`Translator`]. [`EnglishFormatter`] and
//! [`FallbackTranslator`] are used when the host has nothing better.
use chrono::{NaiveDate, Weekday};
use derive_setters::Setters;

use crate::{
    date::{DAYS_PER_WEEK, WeekStart, YearMonth},
    selection::{SelectionMode, SelectionValue},
};

/// Formats dates for display.
pub trait DateFormatter {
    /// Formats a day as weekday, month and day of month.
    fn format_day(&self, locale: Option<&str>, date: NaiveDate) -> String;

    /// Formats a month title.
    fn format_month(&self, locale: Option<&str>, month: YearMonth) -> String;

    /// Formats the narrow weekday name shown above a day column.
    fn format_weekday(&self, _locale: Option<&str>, weekday: Weekday) -> String {
        weekday.to_string().chars().take(1).collect()
    }
}

/// Looks up translated strings.
pub trait Translator {
    /// Returns the string for `key`, or `None` when the locale lacks it.
    fn translate(&self, locale: Option<&str>, key: TranslationKey) -> Option<String>;
}

/// Strings a calendar surface asks a [`Translator`] for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranslationKey {
    /// Header label in single mode.
    SelectSingle,
    /// Header label in range mode.
    SelectRange,
    /// Header label in multiple mode.
    SelectMultiple,
    /// Confirm button.
    Save,
    /// Dismiss button.
    Close,
}

impl TranslationKey {
    /// Returns the lookup key.
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationKey::SelectSingle => "selectSingle",
            TranslationKey::SelectRange => "selectRange",
            TranslationKey::SelectMultiple => "selectMultiple",
            TranslationKey::Save => "save",
            TranslationKey::Close => "close",
        }
    }

    /// Returns the header label key for `mode`.
    pub fn for_mode(mode: SelectionMode) -> Self {
        match mode {
            SelectionMode::Single => TranslationKey::SelectSingle,
            SelectionMode::Range => TranslationKey::SelectRange,
            SelectionMode::Multiple => TranslationKey::SelectMultiple,
        }
    }
}

/// English formatting through `chrono`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishFormatter;

impl DateFormatter for EnglishFormatter {
    fn format_day(&self, _locale: Option<&str>, date: NaiveDate) -> String {
        date.format("%a, %b %-d").to_string()
    }

    fn format_month(&self, _locale: Option<&str>, month: YearMonth) -> String {
        match month.first_day() {
            Some(day) => day.format("%B %Y").to_string(),
            None => month.to_string(),
        }
    }
}

/// English strings for every key.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackTranslator;

impl Translator for FallbackTranslator {
    fn translate(&self, _locale: Option<&str>, key: TranslationKey) -> Option<String> {
        let text = match key {
            TranslationKey::SelectSingle => "Select date",
            TranslationKey::SelectRange => "Select period",
            TranslationKey::SelectMultiple => "Select dates",
            TranslationKey::Save => "Save",
            TranslationKey::Close => "Close",
        };
        Some(text.to_owned())
    }
}

/// Placeholder text used by [`selection_summary`].
#[derive(Debug, Clone, PartialEq, Eq, Setters)]
#[setters(into)]
pub struct HeaderLabels {
    /// Locale passed to the formatter and translator.
    pub locale: Option<String>,
    /// Shown when nothing is selected.
    pub empty_label: String,
    /// Shown in place of a missing range start.
    pub start_label: String,
    /// Shown in place of a missing range end.
    pub end_label: String,
    /// Placed between range start and end.
    pub separator: String,
    /// Suffix of the "more dates" count.
    pub more_label: String,
}

impl Default for HeaderLabels {
    fn default() -> Self {
        Self {
            locale: None,
            empty_label: " ".to_owned(),
            start_label: "Start".to_owned(),
            end_label: "End".to_owned(),
            separator: "-".to_owned(),
            more_label: "more".to_owned(),
        }
    }
}

/// Returns the header label for `mode`.
///
/// A label configured by the host wins; a key missing from `translator` falls
/// back to English.
pub fn selection_label(
    mode: SelectionMode,
    configured: Option<&str>,
    translator: &dyn Translator,
    locale: Option<&str>,
) -> String {
    if let Some(label) = configured {
        return label.to_owned();
    }
    let key = TranslationKey::for_mode(mode);
    translator
        .translate(locale, key)
        .or_else(|| FallbackTranslator.translate(locale, key))
        .unwrap_or_default()
}

/// Returns the header text describing `value`.
pub fn selection_summary(
    value: &SelectionValue,
    labels: &HeaderLabels,
    formatter: &dyn DateFormatter,
) -> String {
    let locale = labels.locale.as_deref();
    let format = |date: NaiveDate| formatter.format_day(locale, date);
    match value {
        SelectionValue::Single(date) => date
            .map(|d| format(d.date()))
            .unwrap_or_else(|| labels.empty_label.clone()),
        SelectionValue::Range(range) => {
            let start = range
                .start_day()
                .map(format)
                .unwrap_or_else(|| labels.start_label.clone());
            let end = range
                .end_day()
                .map(format)
                .unwrap_or_else(|| labels.end_label.clone());
            format!("{start} {} {end}", labels.separator)
        }
        SelectionValue::Multiple(dates) => match dates.len() {
            0 => labels.empty_label.clone(),
            1 | 2 => dates.days().map(format).collect::<Vec<_>>().join(", "),
            count => {
                let first = dates
                    .first()
                    .map(|d| format(d.date()))
                    .unwrap_or_default();
                format!("{first} (+ {} {})", count - 1, labels.more_label)
            }
        },
    }
}

/// Returns the weekday names in column order.
pub fn weekday_labels(
    formatter: &dyn DateFormatter,
    locale: Option<&str>,
    week_start: WeekStart,
) -> [String; DAYS_PER_WEEK as usize] {
    week_start
        .weekdays()
        .map(|weekday| formatter.format_weekday(locale, weekday))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::{
        date::{end_of_day, start_of_day},
        selection::{DateRange, MultiSelection},
    };

    fn day(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    struct GermanLabels;

    impl Translator for GermanLabels {
        fn translate(&self, _locale: Option<&str>, key: TranslationKey) -> Option<String> {
            match key {
                TranslationKey::SelectRange => Some("Zeitraum wählen".to_owned()),
                _ => None,
            }
        }
    }

    #[test]
    fn test_selection_label() {
        assert_eq!(
            selection_label(SelectionMode::Range, None, &GermanLabels, Some("de")),
            "Zeitraum wählen"
        );
        assert_eq!(
            selection_label(SelectionMode::Multiple, None, &GermanLabels, Some("de")),
            "Select dates"
        );
        assert_eq!(
            selection_label(SelectionMode::Single, Some("Birthday"), &GermanLabels, None),
            "Birthday"
        );
        assert_eq!(TranslationKey::SelectSingle.as_str(), "selectSingle");
    }

    #[test]
    fn test_single_summary() {
        let labels = HeaderLabels::default();
        let value = SelectionValue::Single(Some(start_of_day(day(6, 3))));
        assert_eq!(
            selection_summary(&value, &labels, &EnglishFormatter),
            "Mon, Jun 3"
        );
        let empty = SelectionValue::Single(None::<NaiveDateTime>);
        assert_eq!(selection_summary(&empty, &labels, &EnglishFormatter), " ");
    }

    #[test]
    fn test_range_summary_uses_placeholders() {
        let labels = HeaderLabels::default();
        let open = SelectionValue::Range(DateRange::new(Some(start_of_day(day(6, 1))), None));
        assert_eq!(
            selection_summary(&open, &labels, &EnglishFormatter),
            "Sat, Jun 1 - End"
        );
        let full = SelectionValue::Range(DateRange::new(
            Some(start_of_day(day(6, 1))),
            Some(end_of_day(day(6, 5))),
        ));
        assert_eq!(
            selection_summary(&full, &labels.clone().separator("to"), &EnglishFormatter),
            "Sat, Jun 1 to Wed, Jun 5"
        );
        let empty = SelectionValue::Range(DateRange::default());
        assert_eq!(
            selection_summary(&empty, &labels, &EnglishFormatter),
            "Start - End"
        );
    }

    #[test]
    fn test_multiple_summary() {
        let labels = HeaderLabels::default();
        let two: MultiSelection = [day(6, 5), day(6, 3)].into_iter().map(start_of_day).collect();
        assert_eq!(
            selection_summary(&SelectionValue::Multiple(two), &labels, &EnglishFormatter),
            "Mon, Jun 3, Wed, Jun 5"
        );
        let four: MultiSelection = [day(6, 3), day(6, 4), day(6, 5), day(6, 9)]
            .into_iter()
            .map(start_of_day)
            .collect();
        assert_eq!(
            selection_summary(&SelectionValue::Multiple(four), &labels, &EnglishFormatter),
            "Mon, Jun 3 (+ 3 more)"
        );
    }

    #[test]
    fn test_month_and_weekday_labels() {
        assert_eq!(
            EnglishFormatter.format_month(None, YearMonth::new(2024, 3).unwrap()),
            "March 2024"
        );
        let labels = weekday_labels(&EnglishFormatter, None, WeekStart::Monday);
        assert_eq!(labels.join(""), "MTWTFSS");
    }
}
