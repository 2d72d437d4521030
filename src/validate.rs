//! Character-level checks for FASTA-like text files.
//!
//! Each check appends to an [`IssueLog`] owned by the caller, which hands out
//! consecutive issue numbers across all checks run against it.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub number: usize,
    /// 1-based
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} line {}: {}", self.number, self.line, self.message)
    }
}

#[derive(Debug, Default)]
pub struct IssueLog {
    pub issues: Vec<Issue>,
}

impl IssueLog {
    pub fn new() -> Self {
        IssueLog { issues: Vec::new() }
    }

    fn report(&mut self, line: usize, message: String) {
        let number = self.issues.len() + 1;
        self.issues.push(Issue { number, line, message });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }
}

fn is_skipped(line: &str) -> bool {
    line.starts_with('>') || line.trim().is_empty()
}

/// Any character outside of 7-bit ASCII, anywhere in the file
pub fn non_ascii(content: &str, log: &mut IssueLog) {
    for (line_idx, line) in content.lines().enumerate() {
        for (idx, c) in line.chars().enumerate() {
            if !c.is_ascii() {
                log.report(
                    line_idx + 1,
                    format!("Invalid character '{}' at position {}", c, idx + 1),
                );
            }
        }
    }
}

/// Sequence lines may only hold A, C, G, T and N. Whitespace is left to [`gaps`].
pub fn valid_sequence(content: &str, log: &mut IssueLog) {
    for (line_idx, line) in content.lines().enumerate() {
        if is_skipped(line) {
            continue;
        }
        let sequence = line.chars().filter(|c| *c != ' ' && *c != '\t' && *c != '\r');
        for (idx, c) in sequence.enumerate() {
            if !"AaTtCcGgNn".contains(c) {
                log.report(
                    line_idx + 1,
                    format!("Invalid character in sequence: '{}' at position {}", c, idx + 1),
                );
            }
        }
    }
}

/// Spaces or tabs within sequence lines
pub fn gaps(content: &str, log: &mut IssueLog) {
    for (line_idx, line) in content.lines().enumerate() {
        if is_skipped(line) {
            continue;
        }
        if line.trim_end_matches('\r').contains(|c: char| c == ' ' || c == '\t') {
            log.report(line_idx + 1, String::from("Gap (space or tab) in sequence"));
        }
    }
}

pub fn blank_lines(content: &str, log: &mut IssueLog) {
    for (line_idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            log.report(line_idx + 1, String::from("Blank line found"));
        }
    }
}

/// Run all checks, in order, into a fresh log
pub fn check_fasta(content: &str) -> IssueLog {
    let mut log = IssueLog::new();
    non_ascii(content, &mut log);
    valid_sequence(content, &mut log);
    gaps(content, &mut log);
    blank_lines(content, &mut log);
    log
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_file_has_no_issues() {
        let log = check_fasta(">seq1 some description\nACGTN\nacgtn\n>seq2\nNNNN\n");
        assert!(log.is_empty());
    }

    #[test]
    fn non_ascii_positions() {
        let mut log = IssueLog::new();
        non_ascii(">h\u{e9}ader\nACGT\nAC\u{c4}T", &mut log);
        assert_eq!(log.len(), 2);
        assert_eq!(log.issues[0].line, 1);
        assert!(log.issues[0].message.contains("position 3"));
        assert_eq!(log.issues[1].line, 3);
    }

    #[test]
    fn invalid_nucleotides_ignore_headers_and_whitespace() {
        let mut log = IssueLog::new();
        valid_sequence(">X header is fine\nAC GX\n\nRRA", &mut log);
        let lines: Vec<usize> = log.issues.iter().map(|i| i.line).collect();
        assert_eq!(lines, vec![2, 4, 4]);
        assert!(log.issues[0].message.contains("'X' at position 4"));
    }

    #[test]
    fn gaps_and_blank_lines() {
        let mut log = IssueLog::new();
        gaps(">head er\nAC GT\nAC\tGT\nACGT", &mut log);
        assert_eq!(log.issues.iter().map(|i| i.line).collect::<Vec<_>>(), vec![2, 3]);

        let mut log = IssueLog::new();
        blank_lines("ACGT\n\n  \nACGT", &mut log);
        assert_eq!(log.issues.iter().map(|i| i.line).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn numbering_is_threaded_across_checks() {
        let log = check_fasta(">h\nAXGT\n\nA T");
        let numbers: Vec<usize> = log.issues.iter().map(|i| i.number).collect();
        assert_eq!(numbers, (1..=log.len()).collect::<Vec<_>>());
        // X, then the gap, then the blank line
        assert_eq!(log.len(), 3);
        assert_eq!(log.issues[2].to_string(), "#3 line 3: Blank line found");
    }
}
