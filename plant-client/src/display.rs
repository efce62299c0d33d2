//! Terminal rendering of a session state.

use crate::session::SessionState;
use std::fmt::Write;

pub const LOADING_MESSAGE: &str = "Analyzing your plant...";
pub const IDLE_MESSAGE: &str = "Upload a plant image";

pub fn render(state: &SessionState) -> String {
    match state {
        SessionState::Idle => IDLE_MESSAGE.to_string(),
        SessionState::Busy => LOADING_MESSAGE.to_string(),
        SessionState::Failed { message } => format!("Error: {}", message),
        SessionState::Identified { image, info } => {
            let mut out = String::new();
            // Writing to a String cannot fail
            let _ = writeln!(out, "{}", info.common_name);
            let _ = writeln!(out, "{}", info.scientific_name);
            for (heading, body) in [
                ("Description", &info.description),
                ("Care Instructions", &info.care_instructions),
                ("Ideal Conditions", &info.ideal_conditions),
            ] {
                let _ = write!(out, "\n{}\n{}\n", heading, body);
            }
            let _ = write!(
                out,
                "\nImage: {} ({}, {} bytes)",
                image.file_name, image.mime_type, image.byte_len
            );
            out
        }
    }
}
