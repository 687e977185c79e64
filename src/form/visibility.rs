//! Visibility, required and read-only gating, and section navigation.
//!
//! An empty or missing condition means "no condition".

use super::{Field, Form, Section};
use crate::evaluator::{evaluate_condition, State};

/// Direction of travel between sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

fn condition(expr: Option<&str>, state: &State) -> Option<bool> {
    match expr {
        Some(expr) if !expr.is_empty() => Some(evaluate_condition(expr, state)),
        _ => None,
    }
}

pub fn section_visible(section: &Section, state: &State) -> bool {
    condition(section.display_condition.as_deref(), state).unwrap_or(true)
}

pub fn field_visible(field: &Field, state: &State) -> bool {
    !field.hidden && condition(field.display_condition.as_deref(), state).unwrap_or(true)
}

/// The required condition decides when there is one; otherwise the static flag
pub fn field_required(field: &Field, state: &State) -> bool {
    condition(field.required_condition.as_deref(), state).unwrap_or(field.required)
}

pub fn field_read_only(field: &Field, state: &State) -> bool {
    condition(field.read_only_condition.as_deref(), state).unwrap_or(field.read_only)
}

/// Visible sections with their indices
pub fn visible_sections<'a>(form: &'a Form, state: &State) -> Vec<(usize, &'a Section)> {
    form.sections
        .iter()
        .enumerate()
        .filter(|(_, section)| section_visible(section, state))
        .collect()
}

pub fn visible_fields<'a>(section: &'a Section, state: &State) -> Vec<&'a Field> {
    section
        .fields
        .iter()
        .filter(|field| field_visible(field, state))
        .collect()
}

/// First visible section strictly after (or before) `current`. Stays on
/// `current` when there is none.
pub fn nearest_visible_section(
    form: &Form,
    current: usize,
    direction: Direction,
    state: &State,
) -> usize {
    let visible = |index: &usize| {
        form.sections
            .get(*index)
            .is_some_and(|section| section_visible(section, state))
    };

    let found = match direction {
        Direction::Next => (current.saturating_add(1)..form.sections.len()).find(visible),
        Direction::Previous => (0..current.min(form.sections.len())).rev().find(visible),
    };

    found.unwrap_or(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FieldKind;

    fn section(id: &str, display_condition: Option<&str>) -> Section {
        Section {
            id: id.to_string(),
            title: id.to_uppercase(),
            display_condition: display_condition.map(str::to_string),
            fields: Vec::new(),
        }
    }

    fn field(data_name: &str) -> Field {
        Field {
            id: data_name.to_string(),
            label: data_name.to_string(),
            data_name: data_name.to_string(),
            hidden: false,
            display_condition: None,
            help_text: None,
            default_value: None,
            read_only: false,
            required: false,
            read_only_condition: None,
            required_condition: None,
            validation_condition: None,
            kind: FieldKind::Text {
                minimum_length: None,
                maximum_length: None,
            },
        }
    }

    fn navigation_form() -> Form {
        Form {
            title: "nav".to_string(),
            description: None,
            sections: vec![
                section("a", None),
                section("b", Some("{show_b} equals 'yes'")),
                section("c", Some("")),
                section("d", Some("{never} equals 'x'")),
            ],
        }
    }

    #[test]
    fn test_section_visibility() {
        let form = navigation_form();
        let state = State::new();
        let visible: Vec<_> = visible_sections(&form, &state)
            .into_iter()
            .map(|(i, s)| (i, s.id.as_str()))
            .collect();
        assert_eq!(visible, vec![(0, "a"), (2, "c")]);
    }

    #[test]
    fn test_nearest_visible_section() {
        let form = navigation_form();
        let mut state = State::new();

        assert_eq!(nearest_visible_section(&form, 0, Direction::Next, &state), 2);
        assert_eq!(nearest_visible_section(&form, 2, Direction::Next, &state), 2);
        assert_eq!(nearest_visible_section(&form, 2, Direction::Previous, &state), 0);
        assert_eq!(nearest_visible_section(&form, 0, Direction::Previous, &state), 0);

        state.set("show_b", "Yes");
        assert_eq!(nearest_visible_section(&form, 0, Direction::Next, &state), 1);
        assert_eq!(nearest_visible_section(&form, 2, Direction::Previous, &state), 1);
    }

    #[test]
    fn test_field_visibility() {
        let state: State = [("a", "x")].into_iter().collect();

        let mut f = field("f");
        assert!(field_visible(&f, &state));

        f.display_condition = Some("{a} equals 'y'".to_string());
        assert!(!field_visible(&f, &state));

        f.display_condition = Some("{a} equals 'x'".to_string());
        f.hidden = true;
        assert!(!field_visible(&f, &state));
    }

    #[test]
    fn test_malformed_condition_hides() {
        let mut f = field("f");
        f.display_condition = Some("{a} icontains".to_string());
        assert!(!field_visible(&f, &State::new()));
    }

    #[test]
    fn test_required_and_read_only() {
        let state: State = [("role", "admin")].into_iter().collect();

        let mut f = field("f");
        f.required = true;
        assert!(field_required(&f, &state));

        f.required_condition = Some("{role} equals 'guest'".to_string());
        assert!(!field_required(&f, &state));

        f.required_condition = Some(String::new());
        assert!(field_required(&f, &state));

        assert!(!field_read_only(&f, &state));
        f.read_only_condition = Some("{role} icontains 'ADMIN'".to_string());
        assert!(field_read_only(&f, &state));
    }

    #[test]
    fn test_visible_fields() {
        let mut s = section("s", None);
        let mut hidden = field("h");
        hidden.hidden = true;
        s.fields = vec![field("a"), hidden, field("b")];

        let names: Vec<_> = visible_fields(&s, &State::new())
            .into_iter()
            .map(|f| f.data_name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
