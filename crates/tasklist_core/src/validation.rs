pub const TITLE_LENGTH: (usize, usize) = (5, 25);
pub const DESCRIPTION_LENGTH: (usize, usize) = (20, 100);

pub const TITLE_ERROR: &str = "Judul harus antara 5-25 karakter";
pub const DESCRIPTION_ERROR: &str = "Deskripsi harus antara 20-100 karakter";
pub const DEADLINE_ERROR: &str = "Deadline harus diisi";

/// Per-field messages, `None` when the field passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub title: Option<&'static str>,
    pub description: Option<&'static str>,
    pub deadline: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.deadline.is_none()
    }

    /// `(field, message)` pairs in form order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        [
            ("title", self.title),
            ("description", self.description),
            ("deadline", self.deadline),
        ]
        .into_iter()
        .filter_map(|(field, message)| message.map(|message| (field, message)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub field_errors: FieldErrors,
}

/// Checks all three form fields and collects every violation.
///
/// Lengths are counted in UTF-16 code units. Input is taken verbatim, and the
/// deadline is only required to be non-empty.
pub fn validate(title: &str, description: &str, deadline: &str) -> ValidationResult {
    let field_errors = FieldErrors {
        title: (!within(title, TITLE_LENGTH)).then_some(TITLE_ERROR),
        description: (!within(description, DESCRIPTION_LENGTH)).then_some(DESCRIPTION_ERROR),
        deadline: deadline.is_empty().then_some(DEADLINE_ERROR),
    };

    ValidationResult {
        valid: field_errors.is_empty(),
        field_errors,
    }
}

fn within(value: &str, (min, max): (usize, usize)) -> bool {
    (min..=max).contains(&value.encode_utf16().count())
}

#[cfg(test)]
mod tests {
    use super::{DEADLINE_ERROR, DESCRIPTION_ERROR, TITLE_ERROR, validate};

    const DESCRIPTION: &str = "Buy milk, eggs, bread and vegetables";

    #[test]
    fn accepts_values_inside_bounds() {
        let result = validate("Buy groceries", DESCRIPTION, "2025-01-01T10:00");

        assert!(result.valid);
        assert!(result.field_errors.is_empty());
    }

    #[test]
    fn title_bounds_are_inclusive() {
        assert!(validate("abcde", DESCRIPTION, "x").valid);
        assert!(validate(&"a".repeat(25), DESCRIPTION, "x").valid);

        for title in ["", "abcd", "a".repeat(26).as_str()] {
            let result = validate(title, DESCRIPTION, "x");
            assert!(!result.valid, "title {title:?} should be rejected");
            assert_eq!(result.field_errors.title, Some(TITLE_ERROR));
            assert_eq!(result.field_errors.description, None);
        }
    }

    #[test]
    fn description_bounds_are_inclusive() {
        assert!(validate("Title", &"d".repeat(20), "x").valid);
        assert!(validate("Title", &"d".repeat(100), "x").valid);

        for description in ["d".repeat(19), "d".repeat(101)] {
            let result = validate("Title", &description, "x");
            assert!(!result.valid);
            assert_eq!(result.field_errors.description, Some(DESCRIPTION_ERROR));
            assert_eq!(result.field_errors.title, None);
        }
    }

    #[test]
    fn deadline_is_required() {
        let result = validate("Title", DESCRIPTION, "");

        assert!(!result.valid);
        assert_eq!(result.field_errors.deadline, Some(DEADLINE_ERROR));
    }

    #[test]
    fn deadline_is_not_parsed() {
        assert!(validate("Title", DESCRIPTION, "whenever").valid);
    }

    #[test]
    fn collects_every_violation() {
        let result = validate("abc", "short", "");
        let fields: Vec<&str> = result.field_errors.iter().map(|(field, _)| field).collect();

        assert!(!result.valid);
        assert_eq!(fields, vec!["title", "description", "deadline"]);
    }

    #[test]
    fn whitespace_counts_toward_length() {
        assert!(validate("  ab  ", DESCRIPTION, "x").valid);
    }

    #[test]
    fn length_counts_utf16_units() {
        // Each emoji is two UTF-16 units.
        assert!(validate("😀😀😀", DESCRIPTION, "x").valid);
        assert!(!validate("😀😀", DESCRIPTION, "x").valid);
    }
}
