//! Compatibility checker - validates a set of parts against physical and electrical constraints.
//!
//! [`check_compatibility`] is pure and total: incomplete data never fails the check, it only
//! produces "cannot be verified" warnings. Hard failures go to `issues` and flip
//! `is_compatible`; everything else is informational and lands in `warnings`.
//!
//! Rules run in a fixed order (socket, chipset, form factor, RAM, power, storage, presence),
//! which fixes the order of messages in the verdict.

use crate::core::part::Part;
use regex::Regex;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Category name of processors
pub const CPU: &str = "CPU";
/// Category name of graphics cards
pub const GPU: &str = "GPU";
/// Category name of mainboards
pub const MOTHERBOARD: &str = "MOTHERBOARD";
/// Category name of power supplies
pub const PSU: &str = "PSU";
/// Category name of memory kits
pub const RAM: &str = "RAM";
/// Category name of drives
pub const STORAGE: &str = "STORAGE";
/// Category name of chassis
pub const CASE: &str = "CASE";

/// Assumed CPU draw when the part carries no power figure
pub const DEFAULT_CPU_WATTS: u32 = 150;
/// Assumed GPU draw when the part carries no power figure
pub const DEFAULT_GPU_WATTS: u32 = 200;
/// Allowance for everything that is not CPU or GPU
pub const BASELINE_WATTS: u32 = 100;

const SUMMARY_OK: &str = "Build is compatible";
const SUMMARY_ISSUES: &str = "Compatibility issues found";

/// Motherboard chipset -> CPU chipsets it accepts. Advisory only.
const CHIPSET_FAMILIES: &[(&str, &[&str])] = &[
    ("Z690", &["Z690", "B660", "H670"]),
    ("B660", &["Z690", "B660", "H670"]),
    ("Z790", &["Z790", "B760", "H770"]),
    ("B550", &["B550", "X570"]),
    ("X570", &["B550", "X570"]),
    ("B650", &["B650", "X670"]),
    ("X670", &["B650", "X670"]),
];

/// Relative board sizes; a case fits any board of equal or smaller size.
const FORM_FACTOR_SIZES: &[(&str, u8)] = &[
    ("ITX", 1),
    ("M-ATX", 2),
    ("MATX", 2),
    ("MICRO-ATX", 2),
    ("ATX", 3),
    ("E-ATX", 4),
    ("EXTENDED-ATX", 4),
];

const KNOWN_STORAGE_INTERFACES: &[&str] = &["SATA", "NVME", "NVME M.2", "M.2"];

// Patterns are constants; a failure here is a programming error caught by the tests below.
#[allow(clippy::expect_used)]
static SOCKET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)LGA\s*\d+",
        r"(?i)AM\d+",
        r"(?i)Socket\s*\w+",
        r"(?i)[A-Z]{2,3}\s*\d+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("socket pattern"))
    .collect()
});

#[allow(clippy::expect_used)]
static WATTAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*W").expect("wattage pattern"));

/// Result of checking a set of parts
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityVerdict {
    /// `true` when `issues` is empty
    pub is_compatible: bool,
    /// Hard failures
    pub issues: Vec<String>,
    /// Confirmations and advisory notices
    pub warnings: Vec<String>,
    /// One-line summary
    pub summary: String,
}

#[derive(Default)]
struct Findings {
    issues: Vec<String>,
    warnings: Vec<String>,
}

impl Findings {
    fn issue(&mut self, message: String) {
        self.issues.push(message);
    }

    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    fn into_verdict(self) -> CompatibilityVerdict {
        let is_compatible = self.issues.is_empty();
        CompatibilityVerdict {
            is_compatible,
            issues: self.issues,
            warnings: self.warnings,
            summary: if is_compatible { SUMMARY_OK } else { SUMMARY_ISSUES }.to_string(),
        }
    }
}

/// The parts a check looks at, one per category
struct Slots<'a> {
    cpu: Option<&'a Part>,
    motherboard: Option<&'a Part>,
    psu: Option<&'a Part>,
    gpu: Option<&'a Part>,
    ram: Option<&'a Part>,
    storage: Option<&'a Part>,
    case: Option<&'a Part>,
}

impl<'a> Slots<'a> {
    /// Takes the first part of each category, in input order.
    fn from_parts(parts: &'a [Part]) -> Self {
        let first = |category: &str| parts.iter().find(|p| p.category == category);
        Self {
            cpu: first(CPU),
            motherboard: first(MOTHERBOARD),
            psu: first(PSU),
            gpu: first(GPU),
            ram: first(RAM),
            storage: first(STORAGE),
            case: first(CASE),
        }
    }
}

/// Checks a set of parts for compatibility.
///
/// Each category is expected at most once; when it repeats, the first occurrence in `parts`
/// is the one checked. Never fails: missing data degrades to warnings.
#[must_use]
pub fn check_compatibility(parts: &[Part]) -> CompatibilityVerdict {
    let slots = Slots::from_parts(parts);
    let mut findings = Findings::default();

    check_socket(&slots, &mut findings);
    check_chipset(&slots, &mut findings);
    check_form_factor(&slots, &mut findings);
    check_ram_type(&slots, &mut findings);
    check_power(&slots, &mut findings);
    check_storage(&slots, &mut findings);
    check_presence(&slots, &mut findings);

    findings.into_verdict()
}

fn check_socket(slots: &Slots<'_>, findings: &mut Findings) {
    let (Some(cpu), Some(board)) = (slots.cpu, slots.motherboard) else {
        return;
    };

    match (resolve_socket(cpu), resolve_socket(board)) {
        (Some(cpu_socket), Some(board_socket)) if cpu_socket != board_socket => {
            findings.issue(format!(
                "CPU socket ({cpu_socket}) does not match Motherboard socket ({board_socket})"
            ));
        }
        (Some(socket), Some(_)) => {
            findings.warn(format!(
                "✓ CPU and Motherboard socket compatibility verified ({socket})"
            ));
        }
        _ => findings.warn(
            "⚠ Socket information missing - compatibility cannot be verified".to_string(),
        ),
    }
}

fn check_chipset(slots: &Slots<'_>, findings: &mut Findings) {
    let (Some(cpu), Some(board)) = (slots.cpu, slots.motherboard) else {
        return;
    };
    let (Some(cpu_chipset), Some(board_chipset)) = (&cpu.chipset, &board.chipset) else {
        return;
    };

    let accepted: Vec<&str> = CHIPSET_FAMILIES
        .iter()
        .find(|(family, _)| *family == board_chipset.as_str())
        .map_or_else(|| vec![board_chipset.as_str()], |(_, members)| members.to_vec());
    let cpu_base = cpu_chipset.split_whitespace().next().unwrap_or_default();

    if !accepted.contains(&cpu_base) && !accepted.contains(&cpu_chipset.as_str()) {
        findings.warn(format!(
            "⚠ CPU chipset ({cpu_chipset}) may not be fully compatible with Motherboard chipset ({board_chipset})"
        ));
    }
}

fn check_form_factor(slots: &Slots<'_>, findings: &mut Findings) {
    let (Some(case), Some(board)) = (slots.case, slots.motherboard) else {
        return;
    };
    let (Some(case_factor), Some(board_factor)) = (&case.form_factor, &board.form_factor) else {
        return;
    };
    // Unknown factors contribute nothing either way.
    let (Some(case_size), Some(board_size)) =
        (form_factor_size(case_factor), form_factor_size(board_factor))
    else {
        return;
    };

    if case_size < board_size {
        findings.issue(format!(
            "Case form factor ({case_factor}) is too small for Motherboard form factor ({board_factor})"
        ));
    } else {
        findings.warn(format!(
            "✓ Case form factor ({case_factor}) is compatible with Motherboard ({board_factor})"
        ));
    }
}

fn check_ram_type(slots: &Slots<'_>, findings: &mut Findings) {
    let (Some(ram), Some(board)) = (slots.ram, slots.motherboard) else {
        return;
    };
    let (Some(ram_type), Some(board_type)) = (&ram.ram_type, &board.ram_type) else {
        return;
    };

    if ram_type == board_type {
        findings.warn(format!("✓ RAM type ({ram_type}) is compatible with Motherboard"));
    } else {
        findings.issue(format!(
            "RAM type ({ram_type}) does not match Motherboard RAM type ({board_type})"
        ));
    }
}

fn check_power(slots: &Slots<'_>, findings: &mut Findings) {
    let Some(psu) = slots.psu else {
        return;
    };
    let Some(psu_watts) = resolve_wattage(psu) else {
        findings.warn("⚠ PSU wattage unknown - power budget cannot be verified".to_string());
        return;
    };

    let required = estimated_power_need(slots.cpu, slots.gpu);
    if psu_watts < required {
        findings.issue(format!(
            "PSU wattage ({psu_watts}W) is insufficient for this build (estimated need: ~{required}W)"
        ));
    } else {
        findings.warn(format!(
            "✓ PSU wattage ({psu_watts}W) is sufficient (estimated need: ~{required}W)"
        ));
    }
}

fn check_storage(slots: &Slots<'_>, findings: &mut Findings) {
    let (Some(storage), Some(_)) = (slots.storage, slots.motherboard) else {
        return;
    };
    if let Some(interface) = &storage.storage_interface {
        if KNOWN_STORAGE_INTERFACES.contains(&interface.as_str()) {
            findings.warn(format!(
                "✓ Storage interface ({interface}) is typically supported"
            ));
        }
    }
}

fn check_presence(slots: &Slots<'_>, findings: &mut Findings) {
    if slots.cpu.is_none() {
        findings.warn("⚠ No CPU selected".to_string());
    }
    if slots.motherboard.is_none() {
        findings.warn("⚠ No Motherboard selected".to_string());
    }
    if slots.psu.is_none() {
        findings.warn("⚠ No PSU selected".to_string());
    }
}

/// Estimated draw of a build: CPU and GPU (defaults when their figure is unknown) plus the
/// baseline for everything else. Absent parts add nothing.
#[must_use]
pub fn estimated_power_need(cpu: Option<&Part>, gpu: Option<&Part>) -> u32 {
    let cpu_watts = cpu.map_or(0, |c| c.power_requirement.unwrap_or(DEFAULT_CPU_WATTS));
    let gpu_watts = gpu.map_or(0, |g| g.power_requirement.unwrap_or(DEFAULT_GPU_WATTS));
    cpu_watts
        .saturating_add(gpu_watts)
        .saturating_add(BASELINE_WATTS)
}

fn form_factor_size(factor: &str) -> Option<u8> {
    FORM_FACTOR_SIZES
        .iter()
        .find(|(name, _)| *name == factor)
        .map(|(_, size)| *size)
}

fn resolve_socket(part: &Part) -> Option<String> {
    part.socket.clone().or_else(|| {
        extract_socket(&part.compatibility).or_else(|| extract_socket(&part.specifications))
    })
}

fn resolve_wattage(part: &Part) -> Option<u32> {
    part.wattage.or_else(|| {
        extract_wattage(&part.specifications).or_else(|| extract_wattage(&part.name))
    })
}

/// Pulls a socket token ("LGA 1700", "AM5", ...) out of free text, whitespace removed.
#[must_use]
pub fn extract_socket(text: &str) -> Option<String> {
    SOCKET_PATTERNS.iter().find_map(|pattern| {
        pattern.find(text).map(|m| {
            m.as_str()
                .split_whitespace()
                .collect::<String>()
                .to_uppercase()
        })
    })
}

/// Pulls the first "<number> W" figure out of free text.
#[must_use]
pub fn extract_wattage(text: &str) -> Option<u32> {
    WATTAGE_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
