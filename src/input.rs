//! Link declaration file parser.
//!
//! ```text
//! name: lab1
//! r1 e0/0 r2 e0/0
//! r1 e0/1 s1 e0/0
//! ```
//!
//! The first line names the lab. Every following line with exactly four
//! whitespace-separated tokens declares one link; other lines are ignored.

use std::path::Path;

use crate::error::InputError;
use crate::topology::{InterfaceToken, LinkDecl, LinkSet};

/// Parsed input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabInput {
    pub name: String,
    pub links: LinkSet,
}

/// Read and parse an input file.
pub fn parse_input_file(path: &Path) -> Result<LabInput, InputError> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_input(&content)
}

/// Parse input file content.
pub fn parse_input(content: &str) -> Result<LabInput, InputError> {
    let mut lines = content.lines().enumerate();

    let name = lines
        .find(|(_, line)| !line.trim().is_empty())
        .and_then(|(_, line)| line.split_once(':'))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("name"))
        .map(|(_, value)| value.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or(InputError::MissingLabName)?;

    let mut links = Vec::new();
    for (index, line) in lines {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 4 {
            if !parts.is_empty() {
                log::debug!("Ignoring line {}: '{}'", index + 1, line.trim());
            }
            continue;
        }

        let token = |raw: &str| -> Result<InterfaceToken, InputError> {
            raw.parse().map_err(|_| InputError::InvalidInterface {
                line: index + 1,
                token: raw.to_string(),
            })
        };

        links.push(LinkDecl::new(parts[0], token(parts[1])?, parts[2], token(parts[3])?));
    }

    log::info!("Parsed lab '{}' with {} links", name, links.len());

    Ok(LabInput {
        name,
        links: LinkSet::new(links),
    })
}
