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

//! Rule catalog: the immutable pattern tables the line scanner evaluates
//!
//! Rules are partitioned into three tiers by consequence:
//!
//! | Tier    | Meaning                                                        |
//! |---------|----------------------------------------------------------------|
//! | BLOCKED | Irreversible, or reaches beyond the intended target set        |
//! | DANGER  | Legitimate but systemically risky, needs human sign-off        |
//! | WARNING | Worth surfacing, never gates deployment                        |
//!
//! Coverage is deliberately broad. A missed destructive command costs far more
//! than an unnecessary flag, so when in doubt a pattern goes in.
//!
//! # Pattern Engine
//!
//! Every pattern is compiled case-insensitive with the `regex` crate, whose
//! matching time is linear in the input length. There is no backtracking, so a
//! hostile script line cannot stall the analyzer. The engine has no lookaround;
//! a negative condition is expressed as an `unless` pattern that vetoes the
//! match. A [`Veto::Line`] veto looks at the whole line (generic service stops
//! defer to the critical-service rules). A [`Veto::Command`] veto only looks at
//! the matched command up to the next `&`, `|` or `;`, so a flag belonging to a
//! neighbouring command never cancels the match (see the shutdown-timeout rule).
//!
//! The tables are `static` slices of plain structs, compiled exactly once on
//! first use and never mutated afterwards.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

use crate::core::types::Severity;

/// Version of the rule tables, reported in audit records
pub const CATALOG_VERSION: &str = "2025.10.1";

/// Upper bound on the compiled size of any single pattern
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Where an `unless` pattern is evaluated
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Veto {
    /// Anywhere on the line
    Line,
    /// From the start of the match to the end of its command
    Command,
}

/// Characters that end one command and start the next on the same line
const COMMAND_SEPARATORS: [char; 3] = ['&', '|', ';'];

/// Static definition of one rule, before compilation
struct RuleSpec {
    pattern: &'static str,
    unless: Option<(&'static str, Veto)>,
    description: &'static str,
    recommendation: &'static str,
}

/// A compiled, immutable pattern rule
#[derive(Debug)]
pub struct PatternRule {
    pattern: Regex,
    unless: Option<(Regex, Veto)>,
    severity: Severity,
    description: &'static str,
    recommendation: &'static str,
}

impl PatternRule {
    /// Returns the matched text if the rule fires on this line
    ///
    /// Every match on the line is tried in order; the first one the `unless`
    /// pattern does not veto is returned.
    pub fn find<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.pattern
            .find_iter(line)
            .find(|found| !self.vetoed(line, found.start(), found.end()))
            .map(|found| found.as_str().trim())
    }

    fn vetoed(&self, line: &str, start: usize, end: usize) -> bool {
        match &self.unless {
            None => false,
            Some((veto, Veto::Line)) => veto.is_match(line),
            Some((veto, Veto::Command)) => {
                let command_end = line[end..]
                    .find(COMMAND_SEPARATORS)
                    .map_or(line.len(), |offset| end + offset);
                veto.is_match(&line[start..command_end])
            }
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn recommendation(&self) -> &'static str {
        self.recommendation
    }

    /// The pattern source, for catalog listings
    pub fn source(&self) -> &str {
        self.pattern.as_str()
    }

    /// The veto pattern source, if the rule has one
    pub fn unless_source(&self) -> Option<&str> {
        self.unless.as_ref().map(|(veto, _)| veto.as_str())
    }

    /// Where the veto pattern is evaluated, if the rule has one
    pub fn veto_scope(&self) -> Option<Veto> {
        self.unless.as_ref().map(|(_, scope)| *scope)
    }
}

/// Compiles a static pattern the way every catalog and detector pattern is compiled
///
/// # Panics
/// Panics if `source` is not a valid pattern. All sources are string literals
/// in this crate and are exercised by the catalog tests.
#[allow(clippy::panic)]
pub(crate) fn compile_pattern(source: &str) -> Regex {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .unwrap_or_else(|e| panic!("catalog pattern `{source}` should be valid regex: {e}"))
}

fn compile_tier(severity: Severity, specs: &[RuleSpec]) -> Vec<PatternRule> {
    specs
        .iter()
        .map(|spec| PatternRule {
            pattern: compile_pattern(spec.pattern),
            unless: spec.unless.map(|(source, scope)| (compile_pattern(source), scope)),
            severity,
            description: spec.description,
            recommendation: spec.recommendation,
        })
        .collect()
}

static BLOCKED_RULES: LazyLock<Vec<PatternRule>> =
    LazyLock::new(|| compile_tier(Severity::Blocked, BLOCKED_SPECS));
static DANGER_RULES: LazyLock<Vec<PatternRule>> =
    LazyLock::new(|| compile_tier(Severity::Danger, DANGER_SPECS));
static WARNING_RULES: LazyLock<Vec<PatternRule>> =
    LazyLock::new(|| compile_tier(Severity::Warning, WARNING_SPECS));

/// All rules of one tier, in evaluation order
///
/// The catalog has no INFO rules; `Severity::Info` yields an empty slice.
pub fn rules(tier: Severity) -> &'static [PatternRule] {
    match tier {
        Severity::Blocked => BLOCKED_RULES.as_slice(),
        Severity::Danger => DANGER_RULES.as_slice(),
        Severity::Warning => WARNING_RULES.as_slice(),
        Severity::Info => &[],
    }
}

// ============================================================================
// Shared fragments
// ============================================================================

/// Services whose loss takes down authentication, name resolution, time,
/// remote management or host protection for the whole fleet
macro_rules! critical_services {
    () => {
        r"(?:dns|dhcpserver|dhcp|ntds|netlogon|kdc|w32time|dfsr|ismserv|lanmanserver|lanmanworkstation|rpcss|rpceptmapper|samss|eventlog|mpssvc|bfe|windefend|sense|wuauserv|winrm|termservice|cryptsvc|dnscache|nlasvc|winmgmt|vss|certsvc|lsm)"
    };
}

/// `net stop`/`sc stop`-style control of a critical service
const CRITICAL_SERVICE_CONTROL: &str = concat!(
    r#"\b(?:net|net1|sc|sc\.exe)\s+(?:\\\\\S+\s+)?(?:stop|pause|delete|config)\s+["']?"#,
    critical_services!(),
    r#"["']?(?:\s|$)"#
);

macro_rules! stop_service_cmdlets {
    () => {
        r"(?:Stop-Service|spsv|Suspend-Service|Remove-Service)"
    };
}

/// `Set-Service` switches that leave a service stopped or unable to start
macro_rules! disabling_switch {
    () => {
        r#"(?:-(?:StartupType|StartMode)\s*[:=]?\s*["']?Disabled\b|-Status\s*[:=]?\s*["']?(?:Stopped|Paused)\b)"#
    };
}

/// PowerShell stop, suspend, removal or disabling of a critical service
///
/// The service may be named after the cmdlet or piped into it
/// (`Get-Service DNS | Stop-Service`).
const CRITICAL_SERVICE_CMDLET: &str = concat!(
    r"(?:\b",
    stop_service_cmdlets!(),
    r"\b.*\b",
    critical_services!(),
    r"\b|\b",
    critical_services!(),
    r"\b.*\|\s*",
    stop_service_cmdlets!(),
    r"\b|\bSet-Service\b.*\b",
    critical_services!(),
    r"\b.*",
    disabling_switch!(),
    r"|\bSet-Service\b.*",
    disabling_switch!(),
    r".*\b",
    critical_services!(),
    r"\b|\b",
    critical_services!(),
    r"\b.*\|\s*Set-Service\b.*",
    disabling_switch!(),
    r")"
);

/// Every form of turning the host firewall off
const FIREWALL_DISABLE: &str = r#"(?:\bnetsh(?:\.exe)?\s+(?:advfirewall|firewall)\b.*\bstate\s+off\b|\bnetsh(?:\.exe)?\s+firewall\s+set\s+opmode\s+(?:mode\s*=\s*)?disable\b|\bSet-NetFirewallProfile\b.*-Enabled\s+["']?(?:\$false|false|0)\b)"#;

// ============================================================================
// BLOCKED: never runs
// ============================================================================

const BLOCKED_SPECS: &[RuleSpec] = &[
    // Disk destruction
    RuleSpec {
        pattern: r#"(?:^|[^-\w.])format(?:\.com)?\s+["']?[a-z]:"#,
        unless: None,
        description: "Disk format command erases an entire volume",
        recommendation: "Never format volumes from a fleet script. Reimage machines through the imaging pipeline instead.",
    },
    RuleSpec {
        pattern: r"\b(?:Format-Volume|Clear-Disk|Initialize-Disk|Remove-Partition)\b",
        unless: None,
        description: "PowerShell disk format or partition wipe",
        recommendation: "Remove this command. Disk layout changes must be done per machine by an operator.",
    },
    RuleSpec {
        pattern: r"\bdiskpart(?:\.exe)?\b",
        unless: None,
        description: "Scripted disk partitioning with diskpart",
        recommendation: "Remove diskpart from fleet scripts. A wrong disk index destroys the partition table.",
    },
    RuleSpec {
        pattern: r"(?:\\\\\.\\PhysicalDrive\d+|\bdd\b.*\bof=/dev/(?:sd[a-z]|hd[a-z]|vd[a-z]|xvd[a-z]|nvme\d+n\d+|mmcblk\d+)|\bmkfs(?:\.\w+)?\b)",
        unless: None,
        description: "Raw write to a physical disk device",
        recommendation: "Remove this command immediately. It overwrites raw disk sectors and the partition table.",
    },
    // Full-drive and system-directory deletion
    RuleSpec {
        pattern: r#"\b(?:rd|rmdir)\b(?:.*\s/s\b.*\s["']?[a-z]:\\?["']?(?:\s|$)|\s+["']?[a-z]:\\?["']?\s.*/s\b)"#,
        unless: None,
        description: "Recursive delete of an entire drive",
        recommendation: "NEVER delete a drive root. Target the specific directory that needs cleaning.",
    },
    RuleSpec {
        pattern: r#"\b(?:del|erase)\b.*\s["']?[a-z]:\\\*(?:\.\*)?["']?(?:\s|$)"#,
        unless: None,
        description: "Wildcard delete of every file on a drive root",
        recommendation: "Restrict the delete to a specific directory and file pattern.",
    },
    RuleSpec {
        pattern: r#"\b(?:Remove-Item|ri|rm|del|erase|rd|rmdir)\b(?:.*\s-r(?:ecurse)?\b.*\s["']?[a-z]:\\\*?["']?(?:\s|$)|.*\s["']?[a-z]:\\\*?["']?\s.*-r(?:ecurse)?\b)"#,
        unless: None,
        description: "Recursive PowerShell delete of an entire drive",
        recommendation: "NEVER delete a drive root. Target the specific directory that needs cleaning.",
    },
    RuleSpec {
        pattern: r#"\brm\s+(?:-\S+\s+)*-[a-z]*r[a-z]*\s+(?:-\S+\s+)*["']?/\*?["']?(?:\s|$)"#,
        unless: None,
        description: "Recursive filesystem deletion from the root directory",
        recommendation: "NEVER execute this command. It destroys the entire system.",
    },
    RuleSpec {
        pattern: r#"\b(?:Remove-Item|ri|rm|del|erase|rd|rmdir)\b.*(?:\\Windows\\(?:System32|SysWOW64)|%(?:SystemRoot|windir)%\\(?:System32|SysWOW64)|\$env:(?:SystemRoot|windir)\\(?:System32|SysWOW64)|[a-z]:\\Windows\\?\*?["']?(?:\s|$))"#,
        unless: None,
        description: "Deletion inside the Windows system directory",
        recommendation: "Never delete operating system files. Use the vendor's uninstaller or servicing tools.",
    },
    RuleSpec {
        pattern: r#"\breg(?:\.exe)?\s+delete\s+["']?(?:HKLM|HKEY_LOCAL_MACHINE)(?:\\(?:SYSTEM|SOFTWARE|SAM|SECURITY))?\\?["']?(?:\s|$)"#,
        unless: None,
        description: "Deletes an entire machine registry hive",
        recommendation: "Delete only the specific key that must go, and export it first.",
    },
    // Boot and recovery
    RuleSpec {
        pattern: r"\b(?:bcdedit|bootcfg|bcdboot|bootsect)(?:\.exe)?\b",
        unless: None,
        description: "Boot configuration modification",
        recommendation: "Boot configuration must never be changed fleet-wide. A bad entry leaves machines unbootable.",
    },
    RuleSpec {
        pattern: r"(?:\bvssadmin(?:\.exe)?\s+(?:delete\s+shadows|resize\s+shadowstorage)\b|\bwbadmin(?:\.exe)?\s+delete\s+(?:catalog|systemstatebackup|backup)\b|\bwmic(?:\.exe)?\b.*\bshadowcopy\s+delete\b)",
        unless: None,
        description: "Deletes backups or volume shadow copies",
        recommendation: "Remove this command. Deleting recovery points is irreversible and a common ransomware step.",
    },
    RuleSpec {
        pattern: r"(?:\bwevtutil(?:\.exe)?\s+(?:cl|clear-log)\b|\b(?:Clear-EventLog|Remove-EventLog)\b)",
        unless: None,
        description: "Clears Windows event logs and destroys the audit trail",
        recommendation: "Never clear event logs from automation. Archive them with wevtutil epl if space is the concern.",
    },
    // Host protection
    RuleSpec {
        pattern: FIREWALL_DISABLE,
        unless: None,
        description: "Disables the host firewall on every profile",
        recommendation: "Open only the specific port needed with a scoped firewall rule.",
    },
    RuleSpec {
        pattern: r#"\bSet-MpPreference\b.*-Disable(?:RealtimeMonitoring|BehaviorMonitoring|IOAVProtection|ScriptScanning|IntrusionPreventionSystem|BlockAtFirstSeen)\s+["']?(?:\$true|true|1)\b"#,
        unless: None,
        description: "Disables antivirus real-time protection",
        recommendation: "Add a narrow exclusion instead of disabling protection.",
    },
    RuleSpec {
        pattern: r"\bSet-ExecutionPolicy\b.*\b(?:Unrestricted|Bypass)\b",
        unless: None,
        description: "Forces an unrestricted PowerShell execution policy",
        recommendation: "Sign the script or use RemoteSigned scoped to the process.",
    },
    // Shutdown
    RuleSpec {
        pattern: r"\bshutdown(?:\.exe)?\s+(?:[^&|;]*\s)?[/-](?:sg|[rspg])\b",
        unless: Some((r"\s[/-]t\s*[:=]?\s*\d+", Veto::Command)),
        description: "System shutdown or restart without a timeout",
        recommendation: "Add /t <seconds> and a /c message so users can save their work, or schedule it in a maintenance window.",
    },
    RuleSpec {
        pattern: r#"(?:\bshutdown(?:\.exe)?\b.*\s[/-]m\s+["']?\\\\\*|\b(?:Restart-Computer|Stop-Computer|psshutdown|psshutdown64)(?:\.exe)?\b.*(?:-ComputerName\s+["']?\*|\\\\\*))"#,
        unless: None,
        description: "Shutdown or restart targeting a wildcard set of machines",
        recommendation: "Name each approved machine explicitly instead of using a wildcard.",
    },
    // Critical services
    RuleSpec {
        pattern: CRITICAL_SERVICE_CONTROL,
        unless: None,
        description: "Stops or reconfigures a critical infrastructure service",
        recommendation: "Critical services (DNS, DHCP, AD, time, remote management, security) must never be stopped by automation.",
    },
    RuleSpec {
        pattern: CRITICAL_SERVICE_CMDLET,
        unless: None,
        description: "Stops or disables a critical infrastructure service (PowerShell)",
        recommendation: "Critical services (DNS, DHCP, AD, time, remote management, security) must never be stopped by automation.",
    },
    // Wildcard and broadcast targeting
    RuleSpec {
        pattern: r#"(?:\b(?:psexec|psexec64|paexec)(?:\.exe)?\b.*\\\\\*|\b(?:Invoke-Command|icm)\b.*-ComputerName\s+["']?\*|\bwmic(?:\.exe)?\b.*/node:\s*["']?\*|\bwinrs(?:\.exe)?\b.*-r(?:emote)?:\s*["']?\*)"#,
        unless: None,
        description: "Remote execution against a wildcard target",
        recommendation: "Replace the wildcard with the explicit list of approved machines.",
    },
    RuleSpec {
        pattern: r"\bnet(?:1)?\s+send\s+(?:\*|/domain\b|/users\b)",
        unless: None,
        description: "Broadcast message to every machine or user",
        recommendation: "Notify the specific machines in scope instead of broadcasting.",
    },
    RuleSpec {
        pattern: r"\b(?:wolcmd|wakeonlan|wol|mc-wol|Send-WOL|Send-MagicPacket|Invoke-WakeOnLan)(?:\.exe)?\b.*(?:\b255\.255\.255\.255\b|\.255\b)",
        unless: None,
        description: "Wake-on-LAN magic packet sent to a broadcast address",
        recommendation: "Send wake packets to each approved MAC address through its unicast address.",
    },
    RuleSpec {
        pattern: r"(?:\[(?:System\.)?Net\.IPAddress\]::Broadcast|\bEnableBroadcast\b)",
        unless: None,
        description: "Raw broadcast socket from script code",
        recommendation: "Do not open broadcast sockets from fleet scripts.",
    },
    // Resource exhaustion
    RuleSpec {
        pattern: r":\(\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:|%0\s*\|\s*%0",
        unless: None,
        description: "Fork bomb detected: exponential process spawning",
        recommendation: "This will crash or hang every target machine. Remove immediately.",
    },
];

// ============================================================================
// DANGER: requires explicit human override
// ============================================================================

const DANGER_SPECS: &[RuleSpec] = &[
    // Registry
    RuleSpec {
        pattern: r#"\breg(?:\.exe)?\s+(?:add|delete|copy)\s+["']?(?:\\\\[^\\\s]+\\)?(?:HKLM|HKEY_LOCAL_MACHINE)\b"#,
        unless: None,
        description: "Registry write under HKEY_LOCAL_MACHINE",
        recommendation: "Export the key first (reg export) and confirm the exact value path before deploying.",
    },
    RuleSpec {
        pattern: r"\b(?:Set-ItemProperty|New-ItemProperty|Remove-ItemProperty|Rename-ItemProperty|New-Item|Remove-Item|Set-Item|sp)\b.*(?:HKLM:|Registry::HKEY_LOCAL_MACHINE|Registry::HKLM)",
        unless: None,
        description: "PowerShell registry write under HKLM:",
        recommendation: "Export the key first and confirm the exact value path before deploying.",
    },
    RuleSpec {
        pattern: r"(?:\breg(?:\.exe)?\s+(?:import|restore|load)\b|\bregedit(?:\.exe)?\s+/s\b)",
        unless: None,
        description: "Bulk registry import",
        recommendation: "Review every key in the imported file. Prefer individual, reviewed reg add commands.",
    },
    // Services
    RuleSpec {
        pattern: r#"\b(?:net|net1|sc|sc\.exe)\s+(?:\\\\\S+\s+)?(?:stop|pause)\s+["']?[\w.$-]+"#,
        unless: Some((CRITICAL_SERVICE_CONTROL, Veto::Line)),
        description: "Stops a Windows service",
        recommendation: "Confirm the service is not a dependency of other workloads and plan how it is restarted.",
    },
    RuleSpec {
        pattern: r#"\bsc(?:\.exe)?\s+(?:\\\\\S+\s+)?(?:config|delete|create|failure)\s+["']?[\w.$-]+"#,
        unless: Some((CRITICAL_SERVICE_CONTROL, Veto::Line)),
        description: "Service creation or reconfiguration",
        recommendation: "Record the current configuration (sc qc) so the change can be reverted.",
    },
    RuleSpec {
        pattern: r"\b(?:Stop-Service|spsv|Suspend-Service|Restart-Service)\b",
        unless: Some((CRITICAL_SERVICE_CMDLET, Veto::Line)),
        description: "Stops or restarts a Windows service (PowerShell)",
        recommendation: "Confirm the service is not a dependency of other workloads and plan how it is restarted.",
    },
    RuleSpec {
        pattern: r"\b(?:New-Service|Remove-Service|Set-Service)\b",
        unless: Some((CRITICAL_SERVICE_CMDLET, Veto::Line)),
        description: "Service creation or reconfiguration (PowerShell)",
        recommendation: "Record the current configuration (Get-Service | Select *) so the change can be reverted.",
    },
    RuleSpec {
        pattern: r"\bsystemctl\s+(?:stop|disable|mask|kill)\b",
        unless: None,
        description: "Stops or disables a systemd unit",
        recommendation: "Confirm the unit is not a dependency of other workloads and plan how it is restarted.",
    },
    // Scheduled tasks and persistence
    RuleSpec {
        pattern: r"(?:\bschtasks(?:\.exe)?\b.*\s/(?:create|change)\b|\b(?:Register-ScheduledTask|New-ScheduledTask|New-ScheduledTaskAction|New-ScheduledTaskTrigger|Set-ScheduledTask)\b|\bat(?:\.exe)?\s+(?:\\\\\S+\s+)?\d{1,2}:\d{2}\b)",
        unless: None,
        description: "Scheduled task creation or modification",
        recommendation: "Scheduled tasks persist after the deployment. Document the owner and removal date.",
    },
    // Remote management
    RuleSpec {
        pattern: r"\b(?:psexec|psexec64|paexec)(?:\.exe)?\b",
        unless: None,
        description: "Remote command execution via PsExec",
        recommendation: "Verify every target machine is in the approved inventory before running.",
    },
    RuleSpec {
        pattern: r"\b(?:Invoke-Command|icm|Enter-PSSession|etsn|New-PSSession|nsn|Enable-PSRemoting)\b",
        unless: None,
        description: "PowerShell remoting session or remote command",
        recommendation: "Verify every target machine is in the approved inventory before running.",
    },
    RuleSpec {
        pattern: r"(?:\bwinrs(?:\.exe)?\b|\bwmic(?:\.exe)?\b.*/node:)",
        unless: None,
        description: "Remote shell or WMI command against other machines",
        recommendation: "Verify every target machine is in the approved inventory before running.",
    },
    RuleSpec {
        pattern: r"\b(?:Invoke-WmiMethod|Invoke-CimMethod|Set-WmiInstance|Set-CimInstance)\b",
        unless: None,
        description: "WMI/CIM method invocation",
        recommendation: "WMI methods can act on remote machines. Confirm the namespace, class and target.",
    },
    RuleSpec {
        pattern: r"(?:\b(?:Restart-Computer|Stop-Computer|psshutdown|psshutdown64)(?:\.exe)?\b|\bshutdown(?:\.exe)?\b.*\s[/-]m\s+\\\\)",
        unless: None,
        description: "Restarts or shuts down machines",
        recommendation: "Coordinate the restart window with the machine owners and include a delay.",
    },
    // Network configuration
    RuleSpec {
        pattern: r"\broute(?:\.exe)?\s+(?:-[fp]\s+)*(?:add|delete|change|-f)\b",
        unless: None,
        description: "Routing table modification",
        recommendation: "A bad route cuts the machine off from management. Test on one machine with console access first.",
    },
    RuleSpec {
        pattern: r"(?:\bnetsh(?:\.exe)?\s+(?:interface|int)\s+(?:ip|ipv4|ipv6|portproxy)\s+(?:set|add|delete|reset)\b|\bnetsh(?:\.exe)?\s+winsock\s+reset\b|\bipconfig(?:\.exe)?\s+/(?:release|renew)\b)",
        unless: None,
        description: "Network interface or TCP/IP configuration change",
        recommendation: "Network changes can strand remote machines. Test on one machine with console access first.",
    },
    RuleSpec {
        pattern: r"\b(?:New-NetRoute|Remove-NetRoute|Set-NetRoute|New-NetIPAddress|Remove-NetIPAddress|Set-NetIPAddress|Set-NetIPInterface|Set-DnsClientServerAddress|Disable-NetAdapter|Set-NetAdapter|Remove-NetAdapter|Restart-NetAdapter)\b",
        unless: None,
        description: "Network adapter or address change (PowerShell)",
        recommendation: "Network changes can strand remote machines. Test on one machine with console access first.",
    },
    RuleSpec {
        pattern: r"(?:\bnetsh(?:\.exe)?\s+(?:advfirewall|firewall)\s+(?:add|delete|set|reset)\b|\b(?:New-NetFirewallRule|Remove-NetFirewallRule|Set-NetFirewallRule|Disable-NetFirewallRule|Set-NetFirewallProfile)\b|\biptables\b.*\s-[FXD]\b)",
        unless: Some((FIREWALL_DISABLE, Veto::Line)),
        description: "Firewall rule change",
        recommendation: "Scope the rule to the specific port, program and remote address required.",
    },
    // Policy, ownership and accounts
    RuleSpec {
        pattern: r"(?:\bgpupdate(?:\.exe)?\b.*/force\b|\bInvoke-GPUpdate\b)",
        unless: None,
        description: "Forced Group Policy refresh",
        recommendation: "A forced refresh across the fleet loads domain controllers. Let policy apply on its normal cycle.",
    },
    RuleSpec {
        pattern: r"(?:\btakeown(?:\.exe)?\b|\bicacls(?:\.exe)?\b.*\s/(?:grant|deny|remove|reset|setowner|setintegritylevel|inheritance|restore)|\bx?cacls(?:\.exe)?\b|\bSet-Acl\b|\bchmod\b.*\b777\b|\bchown\s+-R\b)",
        unless: None,
        description: "Ownership or ACL change",
        recommendation: "Save the current ACL (icacls /save) so permissions can be restored.",
    },
    RuleSpec {
        pattern: r"(?:\bnet(?:1)?\s+(?:user|localgroup|group)\b.*\s/(?:add|delete|active:no)\b|\b(?:New-LocalUser|Remove-LocalUser|Disable-LocalUser|Set-LocalUser|Add-LocalGroupMember|Remove-LocalGroupMember)\b)",
        unless: None,
        description: "Local account or group membership change",
        recommendation: "Account changes should go through the identity management process, not a fleet script.",
    },
    // Code execution
    RuleSpec {
        pattern: r"\b(?:powershell|pwsh)(?:\.exe)?\b.*\s-(?:ExecutionPolicy|ep|exec)\s+(?:Bypass|Unrestricted)\b",
        unless: None,
        description: "Script launched with the execution policy bypassed",
        recommendation: "Sign the script instead of bypassing execution policy.",
    },
    RuleSpec {
        pattern: r"\b(?:powershell|pwsh)(?:\.exe)?\b.*\s-(?:e|ec|en|enc|encodedcommand)\s+[a-z0-9+/=]{16,}",
        unless: None,
        description: "Encoded PowerShell command hides its payload",
        recommendation: "Decode and inspect the payload, then deploy it as plain script text.",
    },
    RuleSpec {
        pattern: r"(?:\b(?:iex|Invoke-Expression)\b.*\b(?:DownloadString|Invoke-WebRequest|iwr|Invoke-RestMethod|irm|Net\.WebClient)\b|\b(?:DownloadString|Invoke-WebRequest|iwr|Invoke-RestMethod|irm)\b.*\|\s*(?:iex|Invoke-Expression)\b|\b(?:curl|wget)\b.*\|\s*(?:ba|z|da)?sh\b)",
        unless: None,
        description: "Downloads and executes remote code",
        recommendation: "Download first, inspect the script, then deploy the reviewed copy.",
    },
    RuleSpec {
        pattern: r"(?:\bwmic(?:\.exe)?\b.*\bproduct\b.*\bcall\s+uninstall\b|\bmsiexec(?:\.exe)?\b.*\s/x\b|\bUninstall-Package\b)",
        unless: None,
        description: "Software uninstall",
        recommendation: "Confirm the product code and that no other workload depends on the software.",
    },
];

// ============================================================================
// WARNING: surfaced, never gating
// ============================================================================

const WARNING_SPECS: &[RuleSpec] = &[
    RuleSpec {
        pattern: r"\b(?:copy|xcopy|robocopy|Copy-Item|cpi|move|Move-Item|mi)\b.*(?:\\Windows\\(?:System32|SysWOW64)|%(?:SystemRoot|windir)%|\$env:(?:SystemRoot|windir))",
        unless: None,
        description: "File copy into a system directory",
        recommendation: "Install into Program Files or a dedicated directory instead of the system directory.",
    },
    RuleSpec {
        pattern: r#"(?:\bmsiexec(?:\.exe)?\b.*\s/q[nbr]?\+?(?:\s|$)|\.(?:exe|msi)["']?\s.*\s?(?:/S|/silent|/verysilent|/quiet|/qn|--silent|--quiet)(?:\s|$))"#,
        unless: None,
        description: "Silent software installation",
        recommendation: "Verify the installer's source and checksum before deploying silently.",
    },
    RuleSpec {
        pattern: r"\b(?:Install-Package|Install-Module|choco\s+install|winget\s+install)\b",
        unless: None,
        description: "Package manager installation",
        recommendation: "Pin the package version and source repository.",
    },
    RuleSpec {
        pattern: r"\b(?:ping|tracert|traceroute|pathping|nslookup|nbtstat|arp\s+-a|netstat\s+-an|Test-Connection|Test-NetConnection|tnc|Resolve-DnsName|nmap)\b",
        unless: None,
        description: "Network reconnaissance command",
        recommendation: "Reconnaissance across the fleet can trip intrusion detection. Limit it to approved targets.",
    },
    RuleSpec {
        pattern: r"(?:\bnet(?:1)?\s+view\b|\b(?:Get-ADComputer|Get-ADUser|Get-ADGroupMember|dsquery|nltest)\b)",
        unless: None,
        description: "Directory or network enumeration",
        recommendation: "Make sure enumeration results are filtered to approved machines before acting on them.",
    },
    RuleSpec {
        pattern: r"(?:\b(?:taskkill|tskill|Stop-Process|spps|pkill|killall)\b|\bkill\s+-9\b)",
        unless: None,
        description: "Process termination",
        recommendation: "Terminating processes can lose user data. Prefer a graceful shutdown of the application.",
    },
    RuleSpec {
        pattern: r"(?:\bnet(?:1)?\s+use\b|\b(?:New-PSDrive|ndr|New-SmbMapping)\b|\bsubst\s+[a-z]:)",
        unless: None,
        description: "Network drive mapping",
        recommendation: "Remove the mapping when the script finishes and avoid embedding credentials.",
    },
    RuleSpec {
        pattern: r"(?:\b(?:Invoke-WebRequest|iwr|Invoke-RestMethod|irm|Start-BitsTransfer|bitsadmin|curl|wget)\b|\bcertutil(?:\.exe)?\b.*-urlcache\b|\bNet\.WebClient\b|\bDownload(?:File|String)\b)",
        unless: None,
        description: "Remote file download",
        recommendation: "Download only from trusted internal sources and verify the file hash.",
    },
    RuleSpec {
        pattern: r#"(?:\breg(?:\.exe)?\s+(?:add|delete)\s+["']?(?:HKCU|HKEY_CURRENT_USER)\b|\b(?:Set-ItemProperty|New-ItemProperty|Remove-ItemProperty)\b.*HKCU:)"#,
        unless: None,
        description: "Per-user registry change",
        recommendation: "Per-user changes only affect the account running the script. Confirm that is intended.",
    },
    RuleSpec {
        pattern: r"(?:\b(?:rd|rmdir)\s+.*/s\b|\b(?:del|erase)\b.*\s/s\b|\bRemove-Item\b.*-Recurse\b|\brm\s+-[a-z]*r)",
        unless: None,
        description: "Recursive file deletion",
        recommendation: "Double-check the path. A typo or empty variable can widen the delete.",
    },
    RuleSpec {
        pattern: r"\bStart-Process\b.*-Verb\s+RunAs\b",
        unless: None,
        description: "Elevated process launch",
        recommendation: "Confirm the elevated program is trusted and signed.",
    },
    RuleSpec {
        pattern: r"\b(?:wolcmd|wakeonlan|wol|mc-wol|Send-WOL|Send-MagicPacket|Invoke-WakeOnLan)(?:\.exe)?\b",
        unless: None,
        description: "Wake-on-LAN packet",
        recommendation: "Wake only the machines in the approved inventory.",
    },
];
