//! Label-then-number parameter extraction from free text.
//!
//! Each parameter has one or more accepted spellings. A spelling matches when
//! it is followed by `=` or `:` and a decimal number. Extraction for a tool is
//! all-or-nothing: either every required parameter is found or nothing is
//! returned.

use geoqa_tools::{BearingCapacityInputs, SettlementInputs};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Accepted spellings of one parameter, tried in order.
struct Label {
    name: &'static str,
    patterns: Vec<Regex>,
}

impl Label {
    fn new(name: &'static str, spellings: &[&str]) -> Self {
        let patterns = spellings
            .iter()
            .map(|spelling| {
                let pattern = format!(r"{}\s*[=:]\s*([0-9.]+)", spelling);
                // Spellings are compile-time constants below.
                Regex::new(&pattern).expect("invalid label pattern")
            })
            .collect();
        Self { name, patterns }
    }

    /// Value after the first spelling that occurs in the text.
    ///
    /// Once a spelling matches, later spellings are not consulted: a number
    /// that does not parse to a finite value (a lone ".", or a digit run that
    /// overflows `f64`) makes the parameter absent.
    fn find(&self, text: &str) -> Option<f64> {
        let captured = self
            .patterns
            .iter()
            .find_map(|pattern| pattern.captures(text))?
            .get(1)?
            .as_str();

        match captured.parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => {
                debug!(label = self.name, value = captured, "Ignoring malformed number");
                None
            }
        }
    }
}

static LOAD: LazyLock<Label> = LazyLock::new(|| Label::new("load", &[r"loads?"]));

static MODULUS: LazyLock<Label> = LazyLock::new(|| {
    Label::new(
        "modulus",
        &[r"young['s\s]*modulus(?:es|s)?", r"modulus(?:es|s)?", r"\be"],
    )
});

static WIDTH: LazyLock<Label> = LazyLock::new(|| Label::new("B", &[r"\bb"]));
static GAMMA: LazyLock<Label> = LazyLock::new(|| Label::new("gamma", &[r"gamma"]));
static DEPTH: LazyLock<Label> = LazyLock::new(|| Label::new("Df", &[r"df"]));
static FRICTION_ANGLE: LazyLock<Label> =
    LazyLock::new(|| Label::new("friction_angle", &[r"friction[_\s]*angle"]));

fn normalize(question: &str, context: &str) -> String {
    format!("{} {}", question, context).to_lowercase()
}

/// Extracts `load` and Young's modulus. Both must be present.
pub fn settlement_params(question: &str, context: &str) -> Option<SettlementInputs> {
    let text = normalize(question, context);

    let load = LOAD.find(&text)?;
    let youngs_modulus = MODULUS.find(&text)?;

    Some(SettlementInputs {
        load,
        youngs_modulus,
    })
}

/// Extracts B, gamma, Df and friction angle. All four must be present.
pub fn bearing_capacity_params(question: &str, context: &str) -> Option<BearingCapacityInputs> {
    let text = normalize(question, context);

    Some(BearingCapacityInputs {
        b: WIDTH.find(&text)?,
        gamma: GAMMA.find(&text)?,
        df: DEPTH.find(&text)?,
        friction_angle: FRICTION_ANGLE.find(&text)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settlement_requires_both_parameters() {
        assert!(settlement_params("What settlement for load = 100?", "").is_none());
        assert!(settlement_params("modulus = 25000 only", "").is_none());
    }

    #[test]
    fn settlement_is_case_insensitive_and_order_independent() {
        let params =
            settlement_params("Young's Modulus = 25000 with a LOAD = 100", "").unwrap();
        assert_eq!(params.load, 100.0);
        assert_eq!(params.youngs_modulus, 25000.0);
    }

    #[test]
    fn settlement_reads_context() {
        let params = settlement_params("Calculate settlement for load = 100", "E: 5000").unwrap();
        assert_eq!(params.youngs_modulus, 5000.0);
    }

    #[test]
    fn modulus_spellings() {
        for text in [
            "load = 1 and youngs modulus = 2",
            "load = 1 and young's modulus: 2",
            "load = 1 and modulus=2",
            "load = 1 and e = 2",
        ] {
            let params = settlement_params(text, "").unwrap();
            assert_eq!(params.youngs_modulus, 2.0, "failed on {text}");
        }
    }

    #[test]
    fn single_letter_label_needs_word_boundary() {
        // "the = 5" must not be read as a modulus.
        assert!(settlement_params("load = 10, take the = 5", "").is_none());
    }

    #[test]
    fn malformed_number_counts_as_absent() {
        assert!(settlement_params("load = . and modulus = 100", "").is_none());
    }

    #[test]
    fn malformed_number_does_not_fall_through_to_next_spelling() {
        assert!(settlement_params("load = 10, young's modulus = . and e = 5", "").is_none());
    }

    #[test]
    fn overflowing_number_counts_as_absent() {
        let text = format!("load = 100 and modulus = {}", "9".repeat(400));
        assert!(settlement_params(&text, "").is_none());

        let text = format!("b = 2, gamma = {}, df = 1, friction angle = 30", "9".repeat(400));
        assert!(bearing_capacity_params(&text, "").is_none());
    }

    #[test]
    fn bearing_capacity_all_four() {
        let params = bearing_capacity_params(
            "Calculate bearing capacity for B = 2, gamma = 18, Df = 1.5, friction angle = 30",
            "",
        )
        .unwrap();
        assert_eq!(params.b, 2.0);
        assert_eq!(params.gamma, 18.0);
        assert_eq!(params.df, 1.5);
        assert_eq!(params.friction_angle, 30.0);
    }

    #[test]
    fn bearing_capacity_partial_is_no_match() {
        assert!(bearing_capacity_params("B = 2, gamma = 18, Df = 1.5", "").is_none());
    }

    #[test]
    fn friction_angle_with_underscore() {
        let params =
            bearing_capacity_params("b: 1 gamma: 20 df: 1", "friction_angle: 32.5").unwrap();
        assert_eq!(params.friction_angle, 32.5);
    }
}
