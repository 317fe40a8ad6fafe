// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use dw_core::{JobState, StepState};
use std::io::IsTerminal;

pub mod codes {
    /// Section headers: steel blue
    pub const HEADER: u8 = 74;
    /// Commands and literals: light grey
    pub const LITERAL: u8 = 250;
    /// Descriptions and context: medium grey
    pub const CONTEXT: u8 = 245;
    /// Pending steps, placeholders
    pub const MUTED: u8 = 240;
    pub const SUCCESS: u8 = 114;
    pub const FAILURE: u8 = 174;
    /// Running and retrying work
    pub const ACTIVE: u8 = 179;
}

/// Determine if color output should be enabled.
///
/// Priority: `NO_COLOR=1` disables → `COLOR=1` forces → TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Build clap `Styles` using the project palette.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
        .literal(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::LITERAL)))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::CONTEXT)))))
}

const RESET: &str = "\x1b[0m";

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;{code}m{text}{RESET}")
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

pub fn context(text: &str) -> String {
    paint(codes::CONTEXT, text)
}

pub fn muted(text: &str) -> String {
    paint(codes::MUTED, text)
}

/// Color `text` by overall job state.
pub fn job_state(state: Option<JobState>, text: &str) -> String {
    match state {
        Some(JobState::Succeeded) => paint(codes::SUCCESS, text),
        Some(JobState::Failed) => paint(codes::FAILURE, text),
        Some(JobState::Running) => paint(codes::ACTIVE, text),
        Some(JobState::Cancelled) | None => paint(codes::MUTED, text),
        Some(JobState::Queued | JobState::Pending) => paint(codes::LITERAL, text),
    }
}

/// Color `text` by step state.
pub fn step_state(state: StepState, text: &str) -> String {
    match state {
        StepState::Succeeded => paint(codes::SUCCESS, text),
        StepState::Failed => paint(codes::FAILURE, text),
        StepState::Running | StepState::Retrying => paint(codes::ACTIVE, text),
        StepState::Pending | StepState::Queued | StepState::Cancelled | StepState::Unknown => {
            paint(codes::MUTED, text)
        }
    }
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
