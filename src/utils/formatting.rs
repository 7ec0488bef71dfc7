use chrono::NaiveDate;

use crate::model::EntityId;

const MAX_LABEL_LEN: usize = 80;
const DATE_FORMAT: &str = "%d/%m/%Y";

/// Label of an examination node: `"02/03/2020, baseline (id=10)"`.
pub fn examination_label(id: EntityId, date: Option<NaiveDate>, comment: Option<&str>) -> String {
    let mut parts = Vec::with_capacity(2);
    if let Some(date) = date {
        parts.push(format_date(date));
    }
    if let Some(comment) = comment.map(str::trim).filter(|comment| !comment.is_empty()) {
        parts.push(truncate(comment));
    }

    if parts.is_empty() {
        format!("Examination n° {id}")
    } else {
        format!("{} (id={id})", parts.join(", "))
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_flag(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

pub fn truncate(value: &str) -> String {
    if value.chars().count() > MAX_LABEL_LEN {
        let mut truncated = value.chars().take(MAX_LABEL_LEN).collect::<String>();
        truncated.push('…');
        truncated
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn examination_label_combines_date_comment_and_id() {
        let date = NaiveDate::from_ymd_opt(2020, 3, 2);
        assert_eq!(
            examination_label(10, date, Some("baseline")),
            "02/03/2020, baseline (id=10)"
        );
        assert_eq!(examination_label(10, date, Some("  ")), "02/03/2020 (id=10)");
        assert_eq!(examination_label(11, None, Some("follow-up")), "follow-up (id=11)");
        assert_eq!(examination_label(12, None, None), "Examination n° 12");
    }

    #[test]
    fn long_comments_are_truncated() {
        let comment = "x".repeat(MAX_LABEL_LEN + 10);
        let label = truncate(&comment);
        assert_eq!(label.chars().count(), MAX_LABEL_LEN + 1);
        assert!(label.ends_with('…'));
    }
}
