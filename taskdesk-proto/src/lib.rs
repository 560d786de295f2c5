//! Shared task model and validation rules for `TaskDesk`.

pub mod form;
pub mod task;
pub mod validation;
