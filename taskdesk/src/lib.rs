//! `TaskDesk`: terminal client for a task-tracking REST backend.
//!
//! The add/update form ([`form::TaskForm`]) and the task list
//! ([`task_list::TaskList`]) are synchronous controllers. They talk to the
//! backend only through [`gateway::FetchGateway`], driven by the request
//! worker in [`api`].

pub mod api;
pub mod app;
pub mod config;
pub mod form;
pub mod gateway;
pub mod route;
pub mod session;
pub mod task_list;
pub mod ui;
