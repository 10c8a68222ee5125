//! UI module for consistent CLI output
//!
//! Styled output in interactive terminals, plain bracketed prefixes in
//! CI and when piped.

mod context;
mod output;

pub use context::UiContext;
pub use output::{
    key_value, key_value_status, remark, section, step_info, step_ok, step_ok_detail, step_warn,
    step_warn_hint,
};
