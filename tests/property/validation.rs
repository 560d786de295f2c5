//! Property-based tests for the task validator.
//!
//! Uses proptest to verify:
//! 1. Any field map with a blank title reports a `title` error.
//! 2. Any well-formed task passes validation.
//! 3. Validation is deterministic and reports each field at most once.
//! 4. Arbitrary field maps never cause a panic.

#![allow(clippy::expect_used)]

use proptest::prelude::*;
use taskdesk_proto::form::{FieldMap, FormData};
use taskdesk_proto::task::{MAX_TASK_TITLE_LENGTH, TaskStatus};
use taskdesk_proto::validation::{EntityKind, REQUIRED_MESSAGE, validate_many_fields};

/// Strategy for generating a valid `TaskStatus` wire name.
fn arb_status() -> impl Strategy<Value = String> {
    prop::sample::select(TaskStatus::ALL.to_vec()).prop_map(|s| s.to_string())
}

/// Strategy for non-blank text of bounded length.
fn arb_text(max: usize) -> impl Strategy<Value = String> {
    prop::string::string_regex(&format!("[a-zA-Z0-9][a-zA-Z0-9 ]{{0,{}}}", max - 1))
        .expect("valid regex")
}

/// Strategy for blank strings (empty or whitespace only).
fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t]{0,8}"
}

/// Strategy for a syntactically valid task form.
fn arb_valid_form() -> impl Strategy<Value = FormData> {
    (arb_text(MAX_TASK_TITLE_LENGTH), arb_text(512), arb_status()).prop_map(
        |(title, description, status)| FormData {
            title,
            description,
            status,
        },
    )
}

proptest! {
    #[test]
    fn blank_title_always_reported(
        title in arb_blank(),
        description in arb_text(64),
        status in arb_status(),
    ) {
        let form = FormData { title, description, status };
        let errors = validate_many_fields(EntityKind::Task, &form.to_field_map());
        prop_assert!(errors.iter().any(|e| e.field == "title" && e.err == REQUIRED_MESSAGE));
    }

    #[test]
    fn valid_forms_pass(form in arb_valid_form()) {
        let errors = validate_many_fields(EntityKind::Task, &form.to_field_map());
        prop_assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn at_most_one_error_per_field_and_deterministic(
        fields in prop::collection::btree_map(
            prop::sample::select(vec!["title", "description", "status", "extra"]),
            ".{0,300}",
            0..4,
        )
    ) {
        let fields: FieldMap = fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let first = validate_many_fields(EntityKind::Task, &fields);
        let second = validate_many_fields(EntityKind::Task, &fields);
        prop_assert_eq!(&first, &second);

        let mut names: Vec<&str> = first.iter().map(|e| e.field.as_str()).collect();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        prop_assert_eq!(before, names.len());
        prop_assert!(names.iter().all(|n| *n != "extra"));
    }
}
