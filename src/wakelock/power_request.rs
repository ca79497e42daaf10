//! Parser for the Windows `powercfg /requests` report.
//!
//! The report is a line-based text format:
//! - A section header like `SYSTEM:` or `DISPLAY:` names the request type
//!   for the entries that follow
//! - `[PROCESS] \Device\...\app.exe` opens an entry; the bracketed token is
//!   the requester type, the rest of the line the requester name
//! - The plain line after an entry, if any, is the request's reason text
//! - `None.` marks an empty section
//!
//! Unknown or malformed lines are skipped rather than failing the parse.
//! This parser is used to observe and assert wake-lock effects; it is not
//! on the runtime execution path.

/// One power request reported by `powercfg /requests`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerRequestEntry {
    /// Section the entry appeared under (e.g. `SYSTEM`, `DISPLAY`).
    pub request_type: String,
    /// Bracketed requester kind (e.g. `PROCESS`, `DRIVER`, `SERVICE`).
    pub requester_type: String,
    /// Requester identity, typically a device path to the executable.
    pub requester_name: String,
    /// Free-text reason supplied when the request was created; may be empty.
    pub reason: String,
}

/// Parse a `powercfg /requests` report into structured entries.
///
/// Pure text transform; never fails. Lines that fit no known shape are
/// skipped.
pub fn parse_power_requests(report: &str) -> Vec<PowerRequestEntry> {
    let mut entries = Vec::new();
    let mut section: Option<String> = None;
    // Index of the entry still waiting for its reason line, if any.
    let mut open_entry: Option<usize> = None;

    for raw_line in report.lines() {
        let line = raw_line.trim_end();

        if line.trim().is_empty() {
            open_entry = None;
            continue;
        }

        if let Some(header) = parse_section_header(line) {
            section = Some(header.to_string());
            open_entry = None;
            continue;
        }

        if line.trim() == "None." {
            open_entry = None;
            continue;
        }

        let Some(ref request_type) = section else {
            // Preamble before the first section header.
            continue;
        };

        if let Some((requester_type, requester_name)) = parse_entry_line(line) {
            entries.push(PowerRequestEntry {
                request_type: request_type.clone(),
                requester_type: requester_type.to_string(),
                requester_name: requester_name.to_string(),
                reason: String::new(),
            });
            open_entry = Some(entries.len() - 1);
            continue;
        }

        // A plain line directly under an entry is its reason text.
        if let Some(index) = open_entry.take() {
            entries[index].reason = line.trim().to_string();
        }
    }

    entries
}

/// Matches `NAME:` headers where NAME is all uppercase letters.
fn parse_section_header(line: &str) -> Option<&str> {
    let name = line.strip_suffix(':')?;
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_uppercase()) {
        Some(name)
    } else {
        None
    }
}

/// Matches `[TYPE] name` entry lines.
fn parse_entry_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim_start().strip_prefix('[')?;
    let (requester_type, name) = rest.split_once(']')?;
    if requester_type.is_empty() {
        return None;
    }
    Some((requester_type, name.trim()))
}
