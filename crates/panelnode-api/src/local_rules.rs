// Local rule file loader.
//
// One regular expression per line, blank lines skipped. An unreadable file
// means "no local rules"; a line that does not compile stops the node.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::error::Error;
use crate::report::{Reporter, Severity};
use crate::rule::DestinationRule;

/// Load the node's local rules from `path`, in file order.
///
/// - no path (or an empty one): `Ok` with no rules
/// - the file cannot be opened: reported as a warning, `Ok` with no rules
/// - a read fails part-way: reported as an error, `Ok` with the rules read so far
/// - a line is not a valid pattern: reported as fatal, `Err(Error::RulePattern)`
pub fn load_local_rules(
    path: Option<&Path>,
    reporter: &dyn Reporter,
) -> Result<Vec<DestinationRule>, Error> {
    let mut rules = Vec::new();

    let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(rules);
    };

    let file = match File::open(path) {
        Ok(file) => file,
        Err(source) => {
            let err = Error::RuleFileOpen {
                path: path.to_path_buf(),
                source,
            };
            reporter.report(Severity::Warn, &err.to_string());
            return Ok(rules);
        }
    };

    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line_no = idx + 1;
        let text = match line {
            Ok(text) => text,
            Err(source) => {
                let err = Error::RuleFileRead {
                    path: path.to_path_buf(),
                    line: line_no,
                    source,
                };
                reporter.report(Severity::Error, &err.to_string());
                break;
            }
        };

        if text.trim().is_empty() {
            continue;
        }

        match Regex::new(&text) {
            Ok(pattern) => rules.push(DestinationRule::local(pattern)),
            Err(source) => {
                let err = Error::RulePattern {
                    path: path.to_path_buf(),
                    line: line_no,
                    pattern: text,
                    source,
                };
                reporter.report(Severity::Fatal, &err.to_string());
                return Err(err);
            }
        }
    }

    debug!(path = %path.display(), count = rules.len(), "loaded local rules");
    Ok(rules)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::report::MemoryReporter;
    use crate::rule::RuleOrigin;

    fn rule_file(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    fn sources(rules: &[DestinationRule]) -> Vec<&str> {
        rules.iter().map(DestinationRule::as_str).collect()
    }

    #[test]
    fn no_path_yields_no_rules() {
        let reporter = MemoryReporter::new();
        assert!(load_local_rules(None, &reporter).unwrap().is_empty());
        assert!(load_local_rules(Some(Path::new("")), &reporter).unwrap().is_empty());
        assert!(reporter.is_empty());
    }

    #[test]
    fn loads_lines_in_order_skipping_blanks() {
        let file = rule_file(b"a\\.example\\.com\n\nb.*\n");
        let reporter = MemoryReporter::new();

        let rules = load_local_rules(Some(file.path()), &reporter).unwrap();

        assert_eq!(sources(&rules), vec!["a\\.example\\.com", "b.*"]);
        assert!(rules.iter().all(|r| r.origin() == RuleOrigin::Local && r.id() == -1));
        assert!(rules[0].is_match("a.example.com"));
        assert!(!rules[0].is_match("aXexample.com"));
        assert!(rules[1].is_match("b.*"));
        assert!(reporter.is_empty());
    }

    #[test]
    fn whitespace_only_lines_are_skipped() {
        let file = rule_file(b"  \t\r\nfoo\r\n   \n");
        let rules = load_local_rules(Some(file.path()), &MemoryReporter::new()).unwrap();
        assert_eq!(sources(&rules), vec!["foo"]);
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        let reporter = MemoryReporter::new();

        let rules = load_local_rules(Some(path.as_path()), &reporter).unwrap();

        assert!(rules.is_empty());
        let warnings = reporter.with_severity(Severity::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("absent.txt"), "{warnings:?}");
    }

    #[test]
    fn invalid_pattern_is_fatal() {
        let file = rule_file(b"good\\.com\n(unclosed\nnever\\.reached\n");
        let reporter = MemoryReporter::new();

        let err = load_local_rules(Some(file.path()), &reporter).unwrap_err();

        match err {
            Error::RulePattern { line, ref pattern, .. } => {
                assert_eq!(line, 2);
                assert_eq!(pattern, "(unclosed");
            }
            other => panic!("expected RulePattern, got {other:?}"),
        }
        assert_eq!(reporter.with_severity(Severity::Fatal).len(), 1);
    }

    #[test]
    fn read_error_keeps_rules_read_so_far() {
        let file = rule_file(b"first\nsecond\n\xff\xfe\nthird\n");
        let reporter = MemoryReporter::new();

        let rules = load_local_rules(Some(file.path()), &reporter).unwrap();

        assert_eq!(sources(&rules), vec!["first", "second"]);
        let errors = reporter.with_severity(Severity::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("line 3"), "{errors:?}");
    }

    #[test]
    fn loading_twice_gives_same_rules() {
        let file = rule_file(b"x\\d+\ny[a-z]\n\nz$\n");
        let reporter = MemoryReporter::new();

        let first = load_local_rules(Some(file.path()), &reporter).unwrap();
        let second = load_local_rules(Some(file.path()), &reporter).unwrap();

        assert_eq!(sources(&first), sources(&second));
        assert_eq!(first.len(), 3);
    }
}
