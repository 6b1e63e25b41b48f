// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::core::scanner::*;
use crate::core::types::{Finding, Severity};

// ============================================================================
// Comment handling
// ============================================================================

#[test]
fn test_line_comments_never_produce_findings() {
    let test_cases = vec![
        "# shutdown /r",
        "REM format C:",
        "rem net stop DNS",
        "@REM diskpart",
        "@rem: bcdedit /deletevalue safeboot",
        r":: rd /s /q C:\",
        "// Format-Volume -DriveLetter D",
        "' vssadmin delete shadows /all",
        "    # indented wevtutil cl System",
    ];

    for line in test_cases {
        assert!(scan(line).is_empty(), "Comment '{}' should produce no findings", line);
    }
}

#[test]
fn test_words_starting_with_rem_are_code() {
    let findings = scan(r"Remove-Item -Recurse -Force C:\");
    assert!(
        findings.iter().any(|f| f.severity == Severity::Blocked),
        "Remove-Item is a command, not a REM comment"
    );
}

#[test]
fn test_block_comments_never_produce_findings() {
    let powershell = "<#\nFormat-Volume -DriveLetter D\nshutdown /r\n#>";
    assert!(scan(powershell).is_empty(), "PowerShell block comment should be skipped");

    let c_style = "/*\ndiskpart\nbcdedit /set testsigning on\n*/";
    assert!(scan(c_style).is_empty(), "C-style block comment should be skipped");

    let nested_tokens = "<#\n/* shutdown /r */\n# net stop DNS\n#>";
    assert!(scan(nested_tokens).is_empty(), "Content inside a block is ignored entirely");
}

#[test]
fn test_code_after_block_close_is_scanned() {
    let findings = scan("<#\nnotes\n#> shutdown /r");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].line, 3);
    assert_eq!(findings[0].severity, Severity::Blocked);
}

#[test]
fn test_single_line_block_comment() {
    let findings = scan("<# reboot now #> shutdown /r\necho done");
    assert_eq!(findings.len(), 1, "Code after an inline block comment is scanned");
    assert_eq!(findings[0].line, 1);

    assert!(scan("/* shutdown /r */").is_empty());
}

#[test]
fn test_mid_line_open_token_does_not_hide_later_lines() {
    let findings = scan("Write-Host 'start' <# note\nshutdown /r");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].line, 2, "Line after a mid-line open token is still code");
}

#[test]
fn test_unterminated_block_hides_rest_of_script() {
    assert!(scan("<#\nshutdown /r\nformat C:").is_empty());
}

#[test]
fn test_executable_lines_numbering() {
    let script = "# header\n\necho one\n<#\nskip\n#>\necho two";
    let lines: Vec<(usize, &str)> = executable_lines(script).collect();
    assert_eq!(lines, vec![(3, "echo one"), (7, "echo two")]);
}

#[test]
fn test_comment_state_transitions() {
    let mut state = CommentState::default();
    assert_eq!(state.executable("/* open"), None);
    assert_eq!(state, CommentState::InBlock(BlockStyle::CStyle));
    assert_eq!(state.executable("still inside"), None);
    assert_eq!(state.executable("*/ echo after"), Some(" echo after"));
    assert_eq!(state, CommentState::Code);
}

// ============================================================================
// Ordering and de-duplication
// ============================================================================

#[test]
fn test_findings_ordered_by_severity_within_line() {
    let findings = scan_line(1, "ping 10.0.0.255");
    let tiers: Vec<Severity> = findings.iter().map(|f| f.severity).collect();
    assert_eq!(tiers, vec![Severity::Blocked, Severity::Warning]);
}

#[test]
fn test_findings_follow_line_order() {
    let findings = scan("ping PC01\nshutdown /r\nnet stop Spooler");
    let lines: Vec<usize> = findings.iter().map(|f| f.line).collect();
    assert_eq!(lines, vec![1, 2, 3]);
}

#[test]
fn test_danger_duplicate_of_blocked_is_suppressed() {
    let mut findings = vec![
        Finding::at_line(4, "a", Severity::Blocked, "Same risk", "Fix it"),
        Finding::at_line(4, "b", Severity::Danger, "Same risk", "Fix it"),
        Finding::at_line(4, "c", Severity::Danger, "Other risk", "Fix it"),
        Finding::at_line(4, "d", Severity::Warning, "Same risk", "Fix it"),
    ];

    suppress_shadowed_dangers(&mut findings);

    let kept: Vec<&str> = findings.iter().map(|f| f.matched_pattern.as_str()).collect();
    assert_eq!(kept, vec!["a", "c", "d"], "Only the DANGER duplicate is dropped");
}

#[test]
fn test_vetoed_generic_rule_leaves_single_finding() {
    let findings = scan("net stop DNS");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Blocked);

    let findings = scan("netsh advfirewall set allprofiles state off");
    assert_eq!(findings.len(), 1, "Firewall disable should not also count as a rule change");
}

#[test]
fn test_matched_pattern_is_the_matched_text() {
    let findings = scan("   shutdown /r   ");
    assert_eq!(findings[0].matched_pattern, "shutdown /r");
    assert_eq!(findings[0].description, "System shutdown or restart without a timeout");
}
